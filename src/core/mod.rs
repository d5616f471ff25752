//! Core board types: identities, players and cards

pub mod card;
pub mod player;
pub mod types;

pub use card::{Card, ROTATION_DEFENSE, ROTATION_UPRIGHT};
pub use player::Player;
pub use types::{CardId, CardName, OperationId};
