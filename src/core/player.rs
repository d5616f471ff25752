//! Player sides of the board

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of the table
///
/// Serialized as `"self"` / `"opponent"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Player {
    #[default]
    #[serde(rename = "self")]
    Myself,
    Opponent,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Myself, Player::Opponent];

    /// The other side of the table
    pub fn other(self) -> Player {
        match self {
            Player::Myself => Player::Opponent,
            Player::Opponent => Player::Myself,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Myself => write!(f, "self"),
            Player::Opponent => write!(f, "opponent"),
        }
    }
}
