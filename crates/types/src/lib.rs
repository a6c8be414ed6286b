//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine logic, adapter protocol, tests).
//!
//! # Board Dimensions
//!
//! The classic 2048 board:
//!
//! - **Size**: 4x4 cells, indexed `(row, col)` from the top-left corner
//! - **Start**: 2 tiles are spawned on an empty board
//! - **Win**: any tile reaching 2048
//!
//! # Spawn Distribution
//!
//! | Value | Probability |
//! |-------|-------------|
//! | 2 | 0.9 |
//! | 4 | 0.1 |
//!
//! # Direction Codes
//!
//! Directions keep the numbering of the arrow key codes they come from
//! (`key_code - 37`):
//!
//! | Direction | Index | Key code |
//! |-----------|-------|----------|
//! | Left | 0 | 37 |
//! | Up | 1 | 38 |
//! | Right | 2 | 39 |
//! | Down | 3 | 40 |
//!
//! # Examples
//!
//! ```
//! use tiles2048_types::{Direction, GameAction, BOARD_SIZE, WIN_VALUE};
//!
//! // Parse from string (case-insensitive)
//! let dir = Direction::from_str("LEFT").unwrap();
//! assert_eq!(dir, Direction::Left);
//!
//! // Arrow key codes
//! assert_eq!(Direction::from_key_code(40), Some(Direction::Down));
//!
//! // Parse a controller action
//! let action = GameAction::from_str("restart").unwrap();
//! assert_eq!(action, GameAction::Restart);
//!
//! assert_eq!(BOARD_SIZE, 4);
//! assert_eq!(WIN_VALUE, 2048);
//! ```

/// Board width and height in cells (4x4)
pub const BOARD_SIZE: u8 = 4;

/// Total number of cells on the board
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Tile value that wins the game
pub const WIN_VALUE: u32 = 2048;

/// Number of tiles spawned on a fresh board
pub const START_TILES: usize = 2;

/// Probability that a spawned tile is a 4 instead of a 2
pub const SPAWN_FOUR_PROBABILITY: f64 = 0.1;

/// First arrow key code (Left); the four arrows are contiguous
pub const ARROW_KEY_FIRST: u32 = 37;

/// Move direction
///
/// The discriminants are the wire/index values used by front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Left = 0,
    Up = 1,
    Right = 2,
    Down = 3,
}

impl Direction {
    /// All directions in index order
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Numeric index (0..=3)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Convert an index into a direction, `None` if out of range
    ///
    /// # Examples
    ///
    /// ```
    /// use tiles2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_index(2), Some(Direction::Right));
    /// assert_eq!(Direction::from_index(4), None);
    /// ```
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Direction::Left),
            1 => Some(Direction::Up),
            2 => Some(Direction::Right),
            3 => Some(Direction::Down),
            _ => None,
        }
    }

    /// Convert a direction code that the caller guarantees is valid.
    ///
    /// # Panics
    ///
    /// Panics if `code > 3`. An out-of-range code is a caller bug.
    pub fn from_code(code: u8) -> Self {
        match Self::from_index(code) {
            Some(d) => d,
            None => panic!("direction code {} out of range 0..=3", code),
        }
    }

    /// Map a DOM arrow key code (37..=40) to a direction
    pub fn from_key_code(key_code: u32) -> Option<Self> {
        key_code
            .checked_sub(ARROW_KEY_FIRST)
            .and_then(|i| u8::try_from(i).ok())
            .and_then(Self::from_index)
    }

    /// Map a drag movement vector to a direction by its dominant axis.
    ///
    /// Screen coordinates: positive `dy` points down. Equal magnitudes
    /// resolve to the vertical axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiles2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_drag(30.0, -5.0), Direction::Right);
    /// assert_eq!(Direction::from_drag(-2.0, -40.0), Direction::Up);
    /// assert_eq!(Direction::from_drag(10.0, 10.0), Direction::Down);
    /// ```
    pub fn from_drag(dx: f32, dy: f32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Parse direction from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Direction::Left),
            "up" => Some(Direction::Up),
            "right" => Some(Direction::Right),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
        }
    }
}

/// Stable identity of a tile within one game.
///
/// Ids are allocated monotonically per game and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u32);

/// A numbered tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub row: u8,
    pub col: u8,
    pub value: u32,
    /// Ids of the two tiles absorbed to create this one (target first).
    ///
    /// Only set on tiles produced by a merge in the most recent move that
    /// changed the board. A no-op move leaves it in place.
    pub merged_from: Option<[TileId; 2]>,
}

impl Tile {
    pub fn new(id: TileId, row: u8, col: u8, value: u32) -> Self {
        Self {
            id,
            row,
            col,
            value,
            merged_from: None,
        }
    }

    pub fn position(&self) -> (u8, u8) {
        (self.row, self.col)
    }
}

/// Lifecycle status of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Playing,
    /// A tile reached [`WIN_VALUE`]
    Won,
    /// No direction changes the board
    Lost,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a controller can apply to a running game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide all tiles toward one edge
    Move(Direction),
    /// Start a new game
    Restart,
}

impl GameAction {
    /// Parse action from string (for the adapter protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use tiles2048_types::{Direction, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("up"), Some(GameAction::Move(Direction::Up)));
    /// assert_eq!(GameAction::from_str("Restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("restart") {
            return Some(GameAction::Restart);
        }
        Direction::from_str(s).map(GameAction::Move)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Move(d) => d.as_str(),
            GameAction::Restart => "restart",
        }
    }
}

/// Engine-side summary of the most recently applied move.
///
/// Mapped to the adapter's `last_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveEvent {
    pub direction: Direction,
    pub changed: bool,
    pub score_gained: u32,
    pub merges: u32,
    pub spawned: Option<Tile>,
    pub status: GameStatus,
}
