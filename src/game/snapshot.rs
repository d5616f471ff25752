//! Replay files
//!
//! The persisted form of a recorded duel: the board the log starts from,
//! the operations, and the identity of the deck that was loaded. Stored as
//! pretty-printed JSON so files can be shared and diffed.

use crate::core::{CardId, Player};
use crate::error::{BoardError, Result};
use crate::game::replay::Replay;
use crate::game::state::GameState;
use crate::operation::GameOperation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recorded duel as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFile {
    /// Board right after the deck was loaded
    pub initial_state: GameState,

    pub operations: Vec<GameOperation>,

    /// Hash of the deck list image the deck was recognized from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_image_hash: Option<String>,

    /// Main and extra deck card ids as loaded
    #[serde(default)]
    pub deck_card_ids: Vec<CardId>,
}

impl ReplayFile {
    /// Create a replay file; deck card ids are taken from `initial_state`
    pub fn new(initial_state: GameState, operations: Vec<GameOperation>) -> Self {
        let deck_card_ids = Player::ALL
            .iter()
            .flat_map(|&player| {
                let board = initial_state.board(player);
                board.deck.iter().chain(board.extra_deck.iter())
            })
            .map(|card| card.id.clone())
            .collect();

        ReplayFile {
            initial_state,
            operations,
            deck_image_hash: None,
            deck_card_ids,
        }
    }

    pub fn from_replay(replay: &Replay) -> Self {
        Self::new(replay.start.clone(), replay.operations.clone())
    }

    pub fn with_deck_image_hash(mut self, hash: impl Into<String>) -> Self {
        self.deck_image_hash = Some(hash.into());
        self
    }

    pub fn into_replay(self) -> Replay {
        Replay::new(self.initial_state, self.operations)
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Check that every listed deck card is present on the initial board
    pub fn validate(&self) -> Result<()> {
        match self
            .deck_card_ids
            .iter()
            .find(|id| !self.initial_state.contains_card(id))
        {
            Some(missing) => Err(BoardError::CardNotFound(missing.clone())),
            None => Ok(()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a replay file
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ReplayFile = serde_json::from_str(json)?;
        file.validate()?;
        Ok(file)
    }

    /// Save this replay to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    /// Load a replay from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}
