//! Game engine
//!
//! `GameEngine` owns the board, the operation log, the history stack and
//! the replay session. Every mutating method runs a transition, and only
//! if the board changed records an operation, commits the new board and
//! pushes a history entry. The host must serialize calls.

use crate::core::{Card, CardId, Player};
use crate::error::{BoardError, Result};
use crate::game::actions::{
    apply_operation, apply_shuffle, perform_card_flip, perform_card_highlight_toggle,
    perform_card_move, perform_card_rotation, perform_change_phase, perform_draw,
    perform_life_points, perform_summon_token, perform_update_counter, shuffle_order, Position,
};
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::game::replay::{PlaybackState, Replay, ReplaySession};
use crate::game::state::{GameState, PlayerBoard, DEFAULT_LIFE_POINTS};
use crate::game::Phase;
use crate::operation::{GameOperation, MoveOptions, OperationKind, OperationLog};
use crate::undo::{HistoryEntry, HistoryStack, DEFAULT_MAX_HISTORY};
use crate::zones::{ZoneId, ZoneType};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of retained history entries
    pub max_history: usize,

    /// Life points each player starts with
    pub starting_life: i32,

    pub verbosity: VerbosityLevel,

    /// Seed for deck shuffles; `None` seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_history: DEFAULT_MAX_HISTORY,
            starting_life: DEFAULT_LIFE_POINTS,
            verbosity: VerbosityLevel::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_starting_life(mut self, starting_life: i32) -> Self {
        self.starting_life = starting_life;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// Visual annotations that are recorded but never change the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Activate,
    Target,
    Negate,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Board, operation log, history and replay playback in one place
#[derive(Debug)]
pub struct GameEngine {
    config: EngineConfig,
    state: GameState,

    /// Board the current log was recorded from
    initial_state: GameState,

    log: OperationLog,
    history: HistoryStack,
    logger: GameLogger,
    rng: ChaCha12Rng,
    session: Option<ReplaySession>,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        let state = GameState::new(config.starting_life);
        let rng = match config.rng_seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_entropy(),
        };
        GameEngine {
            history: HistoryStack::new(HistoryEntry::new(state.clone(), &[]), config.max_history),
            logger: GameLogger::with_verbosity(config.verbosity),
            initial_state: state.clone(),
            state,
            log: OperationLog::new(),
            rng,
            session: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Board the current operation log starts from
    pub fn initial_state(&self) -> &GameState {
        &self.initial_state
    }

    pub fn operations(&self) -> &[GameOperation] {
        self.log.operations()
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut GameLogger {
        &mut self.logger
    }

    /// Back to an empty board with no history
    pub fn reset(&mut self) {
        self.load_state(GameState::new(self.config.starting_life));
    }

    /// Install a seeded board as the new starting point
    ///
    /// Clears the log and the history; undo cannot go back past this board.
    pub fn load_state(&mut self, initial: GameState) {
        self.session = None;
        self.log.clear();
        self.history.reset(HistoryEntry::new(initial.clone(), &[]));
        self.initial_state = initial.clone();
        self.state = initial;
    }

    /// Replace one player's board with a freshly loaded deck
    pub fn load_deck(&mut self, player: Player, deck: Vec<Card>, extra_deck: Vec<Card>) {
        let mut next = self.state.clone();
        *next.board_mut(player) = PlayerBoard::new(self.config.starting_life);
        let next = next.with_deck(player, deck, extra_deck);
        self.logger.normal(&format!(
            "Loaded {} deck: {} cards, {} extra",
            player,
            next.board(player).deck.len(),
            next.board(player).extra_deck.len()
        ));
        self.load_state(next);
    }

    /// Record an operation for a board that already changed
    fn record(&mut self, next: GameState, player: Player, card_id: Option<CardId>, kind: OperationKind) {
        if self.session.take().is_some() {
            self.logger.normal("Replay detached; recording live");
        }

        let operation = self.log.record(now_millis(), player, card_id, kind);
        #[cfg(feature = "verbose-logging")]
        self.logger
            .categorized(VerbosityLevel::Verbose, "operation", &operation.describe(&next));
        #[cfg(not(feature = "verbose-logging"))]
        let _ = operation;

        self.state = next;
        self.history
            .push(HistoryEntry::new(self.state.clone(), self.log.operations()));
    }

    fn commit(
        &mut self,
        next: Option<GameState>,
        player: Player,
        card_id: Option<CardId>,
        kind: OperationKind,
    ) -> bool {
        match next {
            Some(next) => {
                self.record(next, player, card_id, kind);
                true
            }
            None => false,
        }
    }

    pub fn move_card(&mut self, from: &Position, to: &Position, options: MoveOptions) -> bool {
        let next = perform_card_move(&self.state, from, to, &options);
        self.commit(
            next,
            from.zone.player,
            Some(from.card_id.clone()),
            OperationKind::Move {
                from: from.zone,
                to: to.zone,
                options,
            },
        )
    }

    pub fn rotate_card(&mut self, position: &Position, angle: i32) -> bool {
        let next = perform_card_rotation(&self.state, position, angle);
        self.commit(
            next,
            position.zone.player,
            Some(position.card_id.clone()),
            OperationKind::Rotate {
                from: position.zone,
                angle,
            },
        )
    }

    pub fn flip_card(&mut self, position: &Position) -> bool {
        let next = perform_card_flip(&self.state, position);
        self.commit(
            next,
            position.zone.player,
            Some(position.card_id.clone()),
            OperationKind::ChangePosition {
                from: position.zone,
            },
        )
    }

    pub fn toggle_highlight(&mut self, position: &Position) -> bool {
        let next = perform_card_highlight_toggle(&self.state, position);
        self.commit(
            next,
            position.zone.player,
            Some(position.card_id.clone()),
            OperationKind::ToggleHighlight {
                from: position.zone,
            },
        )
    }

    pub fn update_counter(&mut self, position: &Position, value: i32) -> bool {
        let next = perform_update_counter(&self.state, position, value);
        self.commit(
            next,
            position.zone.player,
            Some(position.card_id.clone()),
            OperationKind::UpdateCounter {
                from: position.zone,
                value,
            },
        )
    }

    /// Draw the top card of `player`'s deck; returns its id
    pub fn draw_card(&mut self, player: Player) -> Option<CardId> {
        let (next, card_id) = perform_draw(&self.state, player)?;
        self.record(
            next,
            player,
            Some(card_id.clone()),
            OperationKind::Draw {
                from: ZoneId::new(player, ZoneType::Deck),
                to: ZoneId::new(player, ZoneType::Hand),
            },
        );
        Some(card_id)
    }

    pub fn summon_token(&mut self, zone: ZoneId, token: Card) -> bool {
        let next = perform_summon_token(&self.state, &zone, token.clone());
        self.commit(
            next,
            zone.player,
            Some(token.id.clone()),
            OperationKind::Summon { to: zone, token },
        )
    }

    /// Shuffle `player`'s deck with the engine RNG
    ///
    /// Returns `Ok(false)` when the shuffle left the order unchanged (empty
    /// or single-card deck).
    pub fn shuffle_deck(&mut self, player: Player) -> Result<bool> {
        let new_order = shuffle_order(&self.state, player, &mut self.rng);
        let next = apply_shuffle(&self.state, player, &new_order)?;
        Ok(self.commit(next, player, None, OperationKind::Shuffle { new_order }))
    }

    pub fn set_life_points(&mut self, player: Player, value: i32) -> bool {
        let next = perform_life_points(&self.state, player, value);
        self.commit(next, player, None, OperationKind::LifePoints { value })
    }

    pub fn change_phase(&mut self, phase: Phase, turn: u32, current_player: Player) -> bool {
        let next = perform_change_phase(&self.state, phase, turn, current_player);
        self.commit(
            next,
            current_player,
            None,
            OperationKind::ChangePhase {
                phase,
                turn,
                current_player,
            },
        )
    }

    /// Move to the next phase; after the End Phase the turn passes
    pub fn advance_phase(&mut self) -> bool {
        let (phase, turn, player) = match self.state.phase.next() {
            Some(phase) => (phase, self.state.turn, self.state.current_player),
            None => (
                Phase::Draw,
                self.state.turn.saturating_add(1),
                self.state.current_player.other(),
            ),
        };
        self.change_phase(phase, turn, player)
    }

    /// Record a visual annotation on a card
    ///
    /// Always recorded (and undoable) even though the board is unchanged.
    pub fn annotate(&mut self, position: &Position, annotation: Annotation) {
        let from = position.zone;
        let kind = match annotation {
            Annotation::Activate => OperationKind::Activate { from },
            Annotation::Target => OperationKind::Target { from },
            Annotation::Negate => OperationKind::Negate { from },
        };
        let next = self.state.clone();
        self.record(next, from.player, Some(position.card_id.clone()), kind);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo() || self.next_replay_operation().is_some()
    }

    /// Description of the operation `undo` would revert
    pub fn undo_description(&self) -> Option<String> {
        if !self.history.can_undo() {
            return None;
        }
        let operation = self.history.current()?.last_operation()?;
        Some(operation.describe(&self.state))
    }

    /// Description of the operation `redo` would reapply
    pub fn redo_description(&self) -> Option<String> {
        match self.history.peek_redo() {
            Some(entry) => {
                let operation = entry.last_operation()?;
                Some(operation.describe(&entry.game_state))
            }
            None => self
                .next_replay_operation()
                .map(|operation| operation.describe(&self.state)),
        }
    }

    /// Step back one entry in the history
    ///
    /// Restores the board and truncates the log to that entry. An active
    /// replay is stopped at the restored position.
    pub fn undo(&mut self) -> bool {
        let description = self.undo_description();
        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&entry);
        if let Some(description) = description {
            self.logger.normal(&format!("Undo: {description}"));
        }
        true
    }

    /// Step forward one entry in the history
    ///
    /// With no recorded future, a paused or stopped replay continues by one
    /// operation instead. Errors only when that replay step fails.
    pub fn redo(&mut self) -> Result<bool> {
        let description = self.redo_description();
        if let Some(entry) = self.history.redo().cloned() {
            self.restore(&entry);
            if let Some(description) = description {
                self.logger.normal(&format!("Redo: {description}"));
            }
            return Ok(true);
        }

        if self.next_replay_operation().is_none() {
            return Ok(false);
        }
        self.with_session(|engine, session| engine.advance_replay(session))
    }

    fn restore(&mut self, entry: &HistoryEntry) {
        self.state = entry.game_state.clone();
        self.log.restore(&entry.operations);

        if let Some(session) = self.session.as_mut() {
            if matches!(session.status, PlaybackState::Playing | PlaybackState::Completed) {
                session.status = PlaybackState::Stopped;
            }
            session.index = entry.operation_count.min(session.replay.len());
        }
    }

    /// Next operation of a paused or stopped replay
    fn next_replay_operation(&self) -> Option<&GameOperation> {
        self.session
            .as_ref()
            .filter(|session| session.status.is_navigable())
            .and_then(|session| session.next_operation())
    }

    pub fn replay_session(&self) -> Option<&ReplaySession> {
        self.session.as_ref()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map_or(PlaybackState::Idle, |session| session.status)
    }

    /// Operations applied so far by the active replay
    pub fn replay_index(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.index)
    }

    /// Begin playing `replay` from its start board
    pub fn start_replay(&mut self, replay: Replay) {
        self.logger
            .normal(&format!("Replay started: {} operations", replay.len()));
        self.load_state(replay.start.clone());

        let mut session = ReplaySession::new(replay);
        session.status = if session.is_finished() {
            PlaybackState::Completed
        } else {
            PlaybackState::Playing
        };
        self.session = Some(session);
    }

    /// Apply the next operation of a playing replay
    ///
    /// Returns `Ok(false)` when the replay is not playing. A failed step
    /// (shuffle mismatch) discards the session.
    pub fn step_replay(&mut self) -> Result<bool> {
        match self.session.as_ref() {
            None => Err(BoardError::NoActiveReplay),
            Some(session) if session.status != PlaybackState::Playing => Ok(false),
            Some(_) => self.with_session(|engine, session| engine.advance_replay(session)),
        }
    }

    /// Step until the replay completes; returns the number of steps applied
    pub fn play_to_end(&mut self) -> Result<usize> {
        let mut steps = 0;
        while self.step_replay()? {
            steps += 1;
        }
        Ok(steps)
    }

    pub fn pause_replay(&mut self) -> Result<bool> {
        let session = self.session.as_mut().ok_or(BoardError::NoActiveReplay)?;
        if session.status != PlaybackState::Playing {
            return Ok(false);
        }
        session.status = PlaybackState::Paused;
        self.logger
            .normal(&format!("Replay paused at {}/{}", session.index, session.replay.len()));
        Ok(true)
    }

    /// Continue a paused or stopped replay
    ///
    /// The board is rebuilt from the start board and the operations before
    /// the session index; whatever undo/redo did meanwhile is discarded.
    pub fn resume_replay(&mut self) -> Result<bool> {
        let session = self.session.as_ref().ok_or(BoardError::NoActiveReplay)?;
        if !session.status.is_navigable() {
            return Ok(false);
        }
        self.with_session(|engine, session| {
            let index = session.index;
            engine.load_state(session.replay.start.clone());
            session.index = 0;
            while session.index < index {
                engine.advance_replay(session)?;
            }
            session.status = if session.is_finished() {
                PlaybackState::Completed
            } else {
                PlaybackState::Playing
            };
            engine
                .logger
                .normal(&format!("Replay resumed at {}/{}", session.index, session.replay.len()));
            Ok(true)
        })
    }

    pub fn stop_replay(&mut self) -> Result<bool> {
        let session = self.session.as_mut().ok_or(BoardError::NoActiveReplay)?;
        if !matches!(session.status, PlaybackState::Playing | PlaybackState::Paused) {
            return Ok(false);
        }
        session.status = PlaybackState::Stopped;
        self.logger
            .normal(&format!("Replay stopped at {}/{}", session.index, session.replay.len()));
        Ok(true)
    }

    /// Run `f` with the session taken out of the engine
    ///
    /// The session is put back only if `f` succeeds.
    fn with_session<T>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut ReplaySession) -> Result<T>,
    ) -> Result<T> {
        let mut session = self.session.take().ok_or(BoardError::NoActiveReplay)?;
        match f(self, &mut session) {
            Ok(value) => {
                self.session = Some(session);
                Ok(value)
            }
            Err(e) => {
                self.logger.categorized(
                    VerbosityLevel::Minimal,
                    "replay_desync",
                    &format!("Replay aborted at step {}: {}", session.index + 1, e),
                );
                Err(e)
            }
        }
    }

    /// Apply `session`'s next operation to the board
    ///
    /// The recorded operation is appended and a history entry pushed even
    /// when it no longer applies, so the log stays equal to the replayed
    /// prefix.
    fn advance_replay(&mut self, session: &mut ReplaySession) -> Result<bool> {
        let Some(operation) = session.next_operation().cloned() else {
            session.status = PlaybackState::Completed;
            return Ok(false);
        };

        let applied = apply_operation(&self.state, &operation)?;
        match applied {
            Some(next) => self.state = next,
            None if !operation.kind.is_annotation() => self.logger.categorized(
                VerbosityLevel::Normal,
                "replay_desync",
                &format!(
                    "Step {} had no effect: {}",
                    session.index + 1,
                    operation.describe(&self.state)
                ),
            ),
            None => {}
        }

        #[cfg(feature = "verbose-logging")]
        self.logger.categorized(
            VerbosityLevel::Verbose,
            "operation",
            &operation.describe(&self.state),
        );

        self.log.append(operation);
        self.history
            .push(HistoryEntry::new(self.state.clone(), self.log.operations()));
        session.index += 1;

        if session.is_finished() && session.status == PlaybackState::Playing {
            session.status = PlaybackState::Completed;
            self.logger
                .minimal(&format!("Replay completed: {} operations", session.replay.len()));
        }
        Ok(true)
    }

    /// The current log as a replay from the board it was recorded on
    pub fn export_replay(&self) -> Replay {
        Replay::new(self.initial_state.clone(), self.log.operations().to_vec())
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
