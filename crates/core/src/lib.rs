//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the 2048 rules: sliding, merging, spawning, and
//! win/loss detection. It has **zero dependencies** on UI, networking, or I/O:
//!
//! - **Deterministic**: the same seed produces the same sequence of spawns
//! - **Value semantics**: [`Board`] moves return a new board, the input is
//!   never mutated
//! - **Portable**: the same engine backs a renderer, a bot, or the adapter
//!
//! # Module Structure
//!
//! - [`board`]: 4x4 board, moves, and status queries
//! - [`slide`]: line traversal order and per-line merge resolution
//! - [`rng`]: seeded spawn randomness
//! - [`game_state`]: the current board of a running game plus episode bookkeeping
//! - [`snapshot`]: copy-out view for observers
//! - [`error`]: engine error type
//!
//! # Game Rules
//!
//! - A move slides every tile toward one edge; equal neighbours merge once
//!   per move, the pair closest to the edge first
//! - Each merge adds the new tile's value to the score
//! - A move that changes the board spawns one tile (2 at 90%, 4 at 10%) on a
//!   uniformly chosen empty cell; a move that changes nothing spawns nothing
//! - The game is won when a tile reaches 2048 and lost when no direction
//!   changes the board
//!
//! # Example
//!
//! ```
//! use tiles2048_core::{Board, TileRng};
//! use tiles2048_types::Direction;
//!
//! let mut rng = TileRng::new(12345);
//! let board = Board::from_rows([
//!     [2, 2, 0, 0],
//!     [0, 0, 0, 0],
//!     [0, 0, 0, 0],
//!     [0, 0, 0, 0],
//! ])
//! .unwrap();
//!
//! let result = board.apply_move(Direction::Left, &mut rng);
//! assert!(result.event.changed);
//! assert_eq!(result.board.value_at(0, 0), 4);
//! assert_eq!(result.board.score(), 4);
//! assert_eq!(result.board.tile_count(), 2); // merged tile + spawn
//!
//! // The original board is untouched
//! assert_eq!(board.value_at(0, 1), 2);
//! ```

pub mod board;
pub mod error;
pub mod game_state;
pub mod rng;
pub mod slide;
pub mod snapshot;

pub use tiles2048_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Motions, MoveResult, Shift};
pub use error::EngineError;
pub use game_state::GameState;
pub use rng::{pick_index, spawn_value, TileRng};
pub use slide::{line_positions, TileMotion};
pub use snapshot::{grid_hash, GameSnapshot};
