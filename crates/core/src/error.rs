//! Engine error type

use thiserror::Error;

use crate::types::GameStatus;

/// Errors reported by the board engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A tile value that is neither empty (0) nor a power of two >= 2
    #[error("invalid tile value {0}: expected 0 or a power of two >= 2")]
    InvalidTileValue(u32),
    /// A move was requested on a board that is already won or lost
    #[error("game is over ({0})")]
    Terminal(GameStatus),
}
