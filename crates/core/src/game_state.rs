//! Game state module - owns the current board of one running game
//!
//! Boards are immutable values; `GameState` is the single place where the
//! "current board" is replaced, so moves against one game are serialized
//! through `&mut self`. It also tracks episode bookkeeping (seed, episode id,
//! move count) and the last move event for observers.

use crate::board::{Board, MoveResult};
use crate::error::EngineError;
use crate::rng::TileRng;
use crate::snapshot::{grid_hash, GameSnapshot};
use crate::types::{Direction, GameAction, GameStatus, MoveEvent};

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    rng: TileRng,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Board-changing moves in this episode.
    move_count: u32,
    /// Last board-changing move (consumed by observers).
    last_event: Option<MoveEvent>,
}

impl GameState {
    /// Create a new game with the given RNG seed
    pub fn new(seed: u64) -> Self {
        let mut rng = TileRng::new(seed);
        let board = Board::new(&mut rng);

        Self {
            board,
            rng,
            episode_id: 0,
            move_count: 0,
            last_event: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.board.score()
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    fn commit(&mut self, result: MoveResult) -> bool {
        let changed = result.event.changed;
        if changed {
            self.last_event = Some(result.event);
            self.board = result.board;
            self.move_count = self.move_count.wrapping_add(1);
        }
        changed
    }

    /// Apply a move; returns whether the board changed.
    ///
    /// Moves on a finished game are ignored.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        let result = self.board.apply_move(direction, &mut self.rng);
        self.commit(result)
    }

    /// Apply a move, reporting a finished game as an error
    pub fn try_apply_move(&mut self, direction: Direction) -> Result<bool, EngineError> {
        let result = self.board.try_move(direction, &mut self.rng)?;
        Ok(self.commit(result))
    }

    /// Start a new episode seeded from the current RNG stream
    pub fn restart(&mut self) {
        let seed = self.rng.next_episode_seed();
        let next_episode = self.episode_id.wrapping_add(1);
        *self = Self::new(seed);
        self.episode_id = next_episode;
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Move(direction) => self.apply_move(direction),
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Take and clear the event of the last move that changed the board.
    ///
    /// No-op moves leave a pending event untouched.
    pub fn take_last_event(&mut self) -> Option<MoveEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_grid(&mut out.grid);
        out.board_hash = grid_hash(&out.grid);
        out.tiles.clear();
        out.tiles.extend(self.board.tiles().copied());
        out.score = self.board.score();
        out.status = self.board.status();
        out.episode_id = self.episode_id;
        out.seed = self.rng.seed();
        out.move_count = self.move_count;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
