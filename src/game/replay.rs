//! Replay reconstruction
//!
//! A replay is a starting board plus the operations recorded against it.
//! The board after any prefix of the operations is re-derived by folding
//! `apply_operation` over that prefix; nothing cached is trusted.

use crate::error::{BoardError, Result};
use crate::game::actions::apply_operation;
use crate::game::GameState;
use crate::operation::GameOperation;
use serde::{Deserialize, Serialize};

/// Apply `operations` in order to `start`
///
/// Operations that no longer apply are skipped. A shuffle whose recorded
/// order does not match the deck aborts the reconstruction.
pub fn reconstruct(start: &GameState, operations: &[GameOperation]) -> Result<GameState> {
    operations.iter().try_fold(start.clone(), |state, operation| {
        Ok(apply_operation(&state, operation)?.unwrap_or(state))
    })
}

/// A starting board and the operations recorded from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    pub start: GameState,
    pub operations: Vec<GameOperation>,
}

impl Replay {
    pub fn new(start: GameState, operations: Vec<GameOperation>) -> Self {
        Replay { start, operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Board after exactly `k` operations
    pub fn state_at(&self, k: usize) -> Result<GameState> {
        let prefix = self.operations.get(..k).ok_or(BoardError::ReplayOutOfRange {
            index: k,
            len: self.operations.len(),
        })?;
        reconstruct(&self.start, prefix)
    }

    pub fn final_state(&self) -> Result<GameState> {
        reconstruct(&self.start, &self.operations)
    }

    /// Every intermediate board, from the start (index 0) to the final one
    pub fn states(&self) -> Result<Vec<GameState>> {
        let mut states = Vec::with_capacity(self.operations.len() + 1);
        let mut state = self.start.clone();
        for operation in &self.operations {
            let next = apply_operation(&state, operation)?.unwrap_or_else(|| state.clone());
            states.push(std::mem::replace(&mut state, next));
        }
        states.push(state);
        Ok(states)
    }
}

/// Playback status of a replay session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Completed,
    Stopped,
}

impl PlaybackState {
    /// Whether undo/redo navigate the replay rather than detach it
    pub fn is_navigable(&self) -> bool {
        matches!(self, PlaybackState::Paused | PlaybackState::Stopped)
    }
}

/// A replay being played back, with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySession {
    pub replay: Replay,
    pub status: PlaybackState,

    /// Number of operations applied so far
    pub index: usize,
}

impl ReplaySession {
    pub fn new(replay: Replay) -> Self {
        ReplaySession {
            replay,
            status: PlaybackState::Idle,
            index: 0,
        }
    }

    /// The operation the next step would apply
    pub fn next_operation(&self) -> Option<&GameOperation> {
        self.replay.operations.get(self.index)
    }

    pub fn remaining(&self) -> usize {
        self.replay.len().saturating_sub(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.replay.len()
    }
}
