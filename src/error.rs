//! Error types for the board engine
//!
//! Most invalid requests are not errors: transitions that cannot apply
//! return `None` and leave the board untouched. The variants below are the
//! failures a caller has to stop for.

use crate::core::{CardId, Player};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Shuffle order for {player} deck does not match its cards (recorded {expected}, deck has {actual})")]
    ShuffleMismatch {
        player: Player,
        expected: usize,
        actual: usize,
    },

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Replay index {index} out of range (replay has {len} operations)")]
    ReplayOutOfRange { index: usize, len: usize },

    #[error("No replay is loaded")]
    NoActiveReplay,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BoardError {
    fn from(e: serde_json::Error) -> Self {
        BoardError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
