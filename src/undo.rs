//! History stack for undo/redo
//!
//! A linear sequence of full board snapshots with a cursor. Each entry also
//! carries the operation log as it stood at that point, so moving the
//! cursor restores both the board and the log. Pushing after an undo
//! discards the redo future.

use crate::game::GameState;
use crate::operation::GameOperation;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of retained history entries
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// One point in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub game_state: GameState,

    /// Number of operations performed up to this point
    pub operation_count: usize,

    /// The operation log up to this point (shared with the engine's copy)
    pub operations: Arc<[GameOperation]>,
}

impl HistoryEntry {
    pub fn new(game_state: GameState, operations: &[GameOperation]) -> Self {
        HistoryEntry {
            game_state,
            operation_count: operations.len(),
            operations: Arc::from(operations),
        }
    }

    /// The operation that produced this entry, if any
    pub fn last_operation(&self) -> Option<&GameOperation> {
        self.operations.last()
    }
}

/// Bounded undo/redo history
///
/// The first retained entry is the floor: `new` and `reset` install the
/// deck-load checkpoint there and the cursor never moves below it. When
/// more than `max_entries` are held the oldest entry is evicted, so undo
/// cannot reach past that point either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    max_entries: usize,
}

impl HistoryStack {
    /// Create a history whose only (and floor) entry is `initial`
    pub fn new(initial: HistoryEntry, max_entries: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        HistoryStack {
            entries,
            cursor: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new entry after the cursor, discarding any redo future
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(entry);
        self.cursor = self.entries.len() - 1;

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    /// Step back one entry; `None` at the floor
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry; `None` when there is no future
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Drop everything and start over from `initial` (which becomes the floor)
    pub fn reset(&mut self, initial: HistoryEntry) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Entry that `redo` would restore
    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor + 1)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
