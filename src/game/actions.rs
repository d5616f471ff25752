//! Board transition functions
//!
//! Higher-level mutators built on the zone store. Each one locates the card
//! by identity, works out its new presentation state and returns
//! `Some(new_state)` if the board changed. `apply_operation` dispatches a
//! recorded operation to the matching transition and is what history
//! restore and replay use.

use crate::core::{Card, CardId, Player, ROTATION_DEFENSE, ROTATION_UPRIGHT};
use crate::error::{BoardError, Result};
use crate::game::{GameState, Phase};
use crate::operation::{GameOperation, MoveOptions, OperationKind};
use crate::zones::{
    add_card_to_zone, find_card, find_card_in_board, place_card, take_card, update_card_in_zone,
    StackPosition, ZoneId, ZoneType,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};

/// A card as the caller sees it: the zone it was picked up from and its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub zone: ZoneId,
    pub card_id: CardId,
}

impl Position {
    pub fn new(zone: ZoneId, card_id: impl Into<CardId>) -> Self {
        Position {
            zone,
            card_id: card_id.into(),
        }
    }
}

/// Move a card to another zone (or reorder it within its zone)
///
/// The card is located by `from.card_id`; `from.zone` is informational
/// only. `to.zone` names the destination; its `card_index` is honored for
/// same-zone reorders and slotted placements and ignored otherwise.
pub fn perform_card_move(
    state: &GameState,
    from: &Position,
    to: &Position,
    options: &MoveOptions,
) -> Option<GameState> {
    let (source, card) = find_card(state, &from.card_id)?;
    let dest = to.zone;
    let same_zone = source.same_zone(&dest);

    if same_zone && options.prevent_same_zone_reorder {
        return None;
    }

    if dest.zone_type == ZoneType::FieldZone {
        let occupied = state
            .board(dest.player)
            .field_zone
            .as_ref()
            .is_some_and(|occupant| occupant.id != card.id);
        if occupied {
            return None;
        }
    }

    let mut moved = card.clone();
    apply_arrival_orientation(&mut moved, dest.zone_type, options);

    let mut target = dest;
    if dest.zone_type.is_slotted() {
        target.card_index = match options.stack_position {
            Some(StackPosition::Top) => Some(0),
            // Pre-move count: when source and target share the slot this
            // still clamps to the bottom after removal
            Some(StackPosition::Bottom) => dest.index.and_then(|slot| {
                state
                    .board(dest.player)
                    .slots(dest.zone_type)
                    .and_then(|slots| slots.get(slot))
                    .map(|stack| stack.len())
            }),
            None => dest.card_index,
        };
    } else if !same_zone {
        target.card_index = None;
    }

    let mut next = state.clone();
    take_card(next.board_mut(source.player), &source, &card.id, source.card_index)?;
    if !place_card(next.board_mut(target.player), &target, moved) {
        return None;
    }

    (next != *state).then_some(next)
}

/// Presentation state a card takes on when it lands in `zone`
fn apply_arrival_orientation(card: &mut Card, zone: ZoneType, options: &MoveOptions) {
    match zone {
        ZoneType::MonsterZone | ZoneType::ExtraMonsterZone => {
            if options.face_down_mode {
                card.rotation = ROTATION_DEFENSE;
                card.face_down = true;
            } else if options.shift_key || options.defense_mode {
                card.rotation = ROTATION_DEFENSE;
                card.face_down = false;
            }
        }
        // Never rotated here, so `defense_mode` has nothing to set
        ZoneType::SpellTrapZone | ZoneType::FieldZone => {
            card.rotation = ROTATION_UPRIGHT;
            card.face_down = options.shift_key || options.face_down_mode;
        }
        _ => {
            card.rotation = ROTATION_UPRIGHT;
            card.face_down = false;
        }
    }
}

/// Update a card's presentation state in place within its zone
fn update_presentation(
    state: &GameState,
    position: &Position,
    update: impl FnOnce(&mut Card),
) -> Option<GameState> {
    let player = position.zone.player;
    let (zone, card) = find_card_in_board(state.board(player), player, &position.card_id)?;
    let mut updated = card.clone();
    update(&mut updated);
    update_card_in_zone(state, &zone, updated)
}

/// Set a card's rotation in degrees
pub fn perform_card_rotation(state: &GameState, position: &Position, angle: i32) -> Option<GameState> {
    update_presentation(state, position, |card| card.rotation = angle)
}

/// Toggle a card face-down / face-up
pub fn perform_card_flip(state: &GameState, position: &Position) -> Option<GameState> {
    update_presentation(state, position, |card| card.face_down = !card.face_down)
}

pub fn perform_card_highlight_toggle(state: &GameState, position: &Position) -> Option<GameState> {
    update_presentation(state, position, |card| card.highlighted = !card.highlighted)
}

/// Set a card's counter; `value <= 0` clears it
pub fn perform_update_counter(state: &GameState, position: &Position, value: i32) -> Option<GameState> {
    update_presentation(state, position, |card| card.set_counter(value))
}

/// Draw the top card of a player's deck into their hand
///
/// Returns the new state and the drawn card's id.
pub fn perform_draw(state: &GameState, player: Player) -> Option<(GameState, CardId)> {
    let top = state.board(player).deck.first()?.id.clone();
    let from = Position::new(ZoneId::new(player, ZoneType::Deck), top.clone());
    let to = Position::new(ZoneId::new(player, ZoneType::Hand), top.clone());
    let next = perform_card_move(state, &from, &to, &MoveOptions::default())?;
    Some((next, top))
}

/// Place a fabricated token card
///
/// A token whose id already exists anywhere on the board is rejected.
pub fn perform_summon_token(state: &GameState, zone: &ZoneId, token: Card) -> Option<GameState> {
    if state.contains_card(&token.id) {
        return None;
    }
    add_card_to_zone(state, zone, token)
}

/// Set a player's life points (never below zero)
pub fn perform_life_points(state: &GameState, player: Player, value: i32) -> Option<GameState> {
    let value = value.max(0);
    if state.board(player).life_points == value {
        return None;
    }
    let mut next = state.clone();
    next.board_mut(player).life_points = value;
    Some(next)
}

pub fn perform_change_phase(
    state: &GameState,
    phase: Phase,
    turn: u32,
    current_player: Player,
) -> Option<GameState> {
    if state.phase == phase && state.turn == turn && state.current_player == current_player {
        return None;
    }
    let mut next = state.clone();
    next.phase = phase;
    next.turn = turn;
    next.current_player = current_player;
    Some(next)
}

/// Draw a random permutation of a player's deck
pub fn shuffle_order<R: Rng + ?Sized>(state: &GameState, player: Player, rng: &mut R) -> Vec<CardId> {
    let mut order: Vec<CardId> = state.board(player).deck.iter().map(|c| c.id.clone()).collect();
    order.shuffle(rng);
    order
}

/// Reorder a player's deck to exactly `new_order`
///
/// Fails with `ShuffleMismatch` unless `new_order` holds exactly the ids in
/// the deck. A silently desynchronized deck order could not be detected
/// later, so this is the one transition that refuses instead of no-oping.
pub fn apply_shuffle(
    state: &GameState,
    player: Player,
    new_order: &[CardId],
) -> Result<Option<GameState>> {
    let deck = &state.board(player).deck;
    let current: FxHashSet<&CardId> = deck.iter().map(|c| &c.id).collect();
    let recorded: FxHashSet<&CardId> = new_order.iter().collect();

    if deck.len() != new_order.len() || recorded.len() != new_order.len() || current != recorded {
        return Err(BoardError::ShuffleMismatch {
            player,
            expected: new_order.len(),
            actual: deck.len(),
        });
    }

    let by_id: FxHashMap<&CardId, &Card> = deck.iter().map(|c| (&c.id, c)).collect();
    let reordered: Vec<Card> = new_order
        .iter()
        .filter_map(|id| by_id.get(id).map(|&card| card.clone()))
        .collect();

    if reordered == *deck {
        return Ok(None);
    }

    let mut next = state.clone();
    next.board_mut(player).deck = reordered;
    Ok(Some(next))
}

/// Re-apply a recorded operation
///
/// Returns `Ok(None)` when the operation no longer applies (missing card,
/// occupied zone, annotation, unknown type). Only a shuffle whose recorded
/// order does not match the deck is an error.
pub fn apply_operation(state: &GameState, operation: &GameOperation) -> Result<Option<GameState>> {
    let card_position = |zone: &ZoneId| {
        operation
            .card_id
            .as_ref()
            .map(|id| Position::new(*zone, id.clone()))
    };

    let next = match &operation.kind {
        OperationKind::Move { from, to, options } => card_position(from)
            .zip(card_position(to))
            .and_then(|(from, to)| perform_card_move(state, &from, &to, options)),
        OperationKind::Draw { from, to } => card_position(from)
            .zip(card_position(to))
            .and_then(|(from, to)| perform_card_move(state, &from, &to, &MoveOptions::default())),
        OperationKind::Rotate { from, angle } => {
            card_position(from).and_then(|p| perform_card_rotation(state, &p, *angle))
        }
        OperationKind::ChangePosition { from } => {
            card_position(from).and_then(|p| perform_card_flip(state, &p))
        }
        OperationKind::ToggleHighlight { from } => {
            card_position(from).and_then(|p| perform_card_highlight_toggle(state, &p))
        }
        OperationKind::UpdateCounter { from, value } => {
            card_position(from).and_then(|p| perform_update_counter(state, &p, *value))
        }
        OperationKind::Summon { to, token } => perform_summon_token(state, to, token.clone()),
        OperationKind::Shuffle { new_order } => {
            return apply_shuffle(state, operation.player, new_order)
        }
        OperationKind::LifePoints { value } => perform_life_points(state, operation.player, *value),
        OperationKind::ChangePhase {
            phase,
            turn,
            current_player,
        } => perform_change_phase(state, *phase, *turn, *current_player),
        OperationKind::Activate { .. }
        | OperationKind::Target { .. }
        | OperationKind::Negate { .. }
        | OperationKind::Unknown => None,
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OperationId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn card(id: &str) -> Card {
        Card::new(id, format!("Card {id}"))
    }

    fn zone(zone_type: ZoneType) -> ZoneId {
        ZoneId::new(Player::Myself, zone_type)
    }

    fn slot(zone_type: ZoneType, index: usize) -> ZoneId {
        ZoneId::slot(Player::Myself, zone_type, index)
    }

    fn with_hand(ids: &[&str]) -> GameState {
        let mut state = GameState::default();
        state.players.myself.hand = ids.iter().map(|id| card(id)).collect();
        state
    }

    fn op(card_id: Option<&str>, kind: OperationKind) -> GameOperation {
        GameOperation {
            id: OperationId::new("op-test"),
            timestamp: 0,
            player: Player::Myself,
            card_id: card_id.map(CardId::new),
            kind,
        }
    }

    #[test]
    fn test_hand_to_monster_zone() {
        let state = add_card_to_zone(&GameState::default(), &zone(ZoneType::Hand), card("A")).unwrap();
        assert_eq!(state.players.myself.hand, vec![card("A")]);

        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "A"),
            &Position::new(slot(ZoneType::MonsterZone, 0), "A"),
            &MoveOptions::default(),
        )
        .unwrap();

        let board = &next.players.myself;
        assert!(board.hand.is_empty());
        assert_eq!(board.monster_zones[0].len(), 1);
        assert_eq!(board.monster_zones[0][0].id, CardId::new("A"));
        assert_eq!(board.monster_zones[0][0].rotation, 0);
        assert!(!board.monster_zones[0][0].face_down);
    }

    #[test]
    fn test_card_located_by_id_not_stated_zone() {
        let state = with_hand(&["A"]);
        // Caller claims the card is in the graveyard
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Graveyard), "A"),
            &Position::new(zone(ZoneType::Banished), "A"),
            &MoveOptions::default(),
        )
        .unwrap();

        assert!(next.players.myself.hand.is_empty());
        assert_eq!(next.players.myself.banished[0].id, CardId::new("A"));
    }

    #[test]
    fn test_missing_card_is_noop() {
        let state = with_hand(&["A"]);
        let moved = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "Z"),
            &Position::new(zone(ZoneType::Graveyard), "Z"),
            &MoveOptions::default(),
        );
        assert!(moved.is_none());
        assert!(perform_card_flip(&state, &Position::new(zone(ZoneType::Hand), "Z")).is_none());
    }

    #[test]
    fn test_shift_to_monster_zone_is_defense() {
        let state = with_hand(&["A"]);
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "A"),
            &Position::new(slot(ZoneType::MonsterZone, 2), "A"),
            &MoveOptions::shift(),
        )
        .unwrap();

        let placed = &next.players.myself.monster_zones[2][0];
        assert_eq!(placed.rotation, ROTATION_DEFENSE);
        assert!(!placed.face_down);
    }

    #[test]
    fn test_face_down_mode_sets_monster() {
        let state = with_hand(&["A"]);
        let options = MoveOptions {
            face_down_mode: true,
            ..Default::default()
        };
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "A"),
            &Position::new(slot(ZoneType::ExtraMonsterZone, 0), "A"),
            &options,
        )
        .unwrap();

        let placed = &next.players.myself.extra_monster_zones[0][0];
        assert_eq!(placed.rotation, ROTATION_DEFENSE);
        assert!(placed.face_down);
    }

    #[test]
    fn test_shift_to_spell_trap_is_face_down() {
        let state = with_hand(&["S"]);
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "S"),
            &Position::new(slot(ZoneType::SpellTrapZone, 0), "S"),
            &MoveOptions::shift(),
        )
        .unwrap();

        let placed = &next.players.myself.spell_trap_zones[0][0];
        assert_eq!(placed.rotation, 0);
        assert!(placed.face_down);
    }

    #[test]
    fn test_spell_trap_defaults_face_up() {
        let mut state = with_hand(&[]);
        let mut set = card("S");
        set.face_down = true;
        set.rotation = -90;
        state.players.myself.monster_zones[0].push(set);

        let next = perform_card_move(
            &state,
            &Position::new(slot(ZoneType::MonsterZone, 0), "S"),
            &Position::new(slot(ZoneType::SpellTrapZone, 4), "S"),
            &MoveOptions::default(),
        )
        .unwrap();

        let placed = &next.players.myself.spell_trap_zones[4][0];
        assert_eq!(placed.rotation, 0);
        assert!(!placed.face_down);
    }

    #[test]
    fn test_defense_mode_ignored_for_spell_trap() {
        let state = with_hand(&["S"]);
        let options = MoveOptions {
            defense_mode: true,
            ..Default::default()
        };
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "S"),
            &Position::new(slot(ZoneType::SpellTrapZone, 1), "S"),
            &options,
        )
        .unwrap();

        let placed = &next.players.myself.spell_trap_zones[1][0];
        assert_eq!(placed.rotation, 0);
        assert!(!placed.face_down);
    }

    #[test]
    fn test_monster_keeps_orientation_without_options() {
        let mut state = GameState::default();
        let mut defender = card("A");
        defender.rotation = ROTATION_DEFENSE;
        defender.face_down = true;
        state.players.myself.monster_zones[0].push(defender);

        let next = perform_card_move(
            &state,
            &Position::new(slot(ZoneType::MonsterZone, 0), "A"),
            &Position::new(slot(ZoneType::MonsterZone, 3), "A"),
            &MoveOptions::default(),
        )
        .unwrap();

        let placed = &next.players.myself.monster_zones[3][0];
        assert_eq!(placed.rotation, ROTATION_DEFENSE);
        assert!(placed.face_down);
    }

    #[test]
    fn test_field_zone_face_down_and_occupancy() {
        let state = with_hand(&["F1", "F2"]);
        let field = zone(ZoneType::FieldZone);
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "F1"),
            &Position::new(field, "F1"),
            &MoveOptions::shift(),
        )
        .unwrap();
        let placed = next.players.myself.field_zone.as_ref().unwrap();
        assert!(placed.face_down);
        assert_eq!(placed.rotation, 0);

        let blocked = perform_card_move(
            &next,
            &Position::new(zone(ZoneType::Hand), "F2"),
            &Position::new(field, "F2"),
            &MoveOptions::default(),
        );
        assert!(blocked.is_none());
    }

    #[test]
    fn test_zone_resets_on_arrival() {
        for dest in [
            ZoneType::Hand,
            ZoneType::Deck,
            ZoneType::Graveyard,
            ZoneType::Banished,
            ZoneType::ExtraDeck,
            ZoneType::FreeZone,
            ZoneType::SideFreeZone,
        ] {
            let mut state = GameState::default();
            let mut c = card("A");
            c.rotation = ROTATION_DEFENSE;
            c.face_down = true;
            c.counter = Some(5);
            state.players.myself.monster_zones[1].push(c);

            let next = perform_card_move(
                &state,
                &Position::new(slot(ZoneType::MonsterZone, 1), "A"),
                &Position::new(zone(dest), "A"),
                &MoveOptions::default(),
            )
            .unwrap();

            let (_, moved) = find_card(&next, &CardId::new("A")).unwrap();
            assert_eq!(moved.counter, None, "counter survived move to {dest}");
            assert_eq!(moved.rotation, 0, "rotation survived move to {dest}");
            assert!(!moved.face_down, "face-down survived move to {dest}");
        }
    }

    #[test]
    fn test_cross_zone_ignores_destination_index() {
        let mut state = with_hand(&["A"]);
        state.players.myself.graveyard = vec![card("G1"), card("G2")];

        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "A"),
            &Position::new(zone(ZoneType::Graveyard).at(0), "A"),
            &MoveOptions::default(),
        )
        .unwrap();

        let ids: Vec<_> = next.players.myself.graveyard.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "G2", "A"]);
    }

    #[test]
    fn test_same_zone_reorder() {
        let state = with_hand(&["A", "B", "C"]);
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "C"),
            &Position::new(zone(ZoneType::Hand).at(0), "C"),
            &MoveOptions::default(),
        )
        .unwrap();

        let ids: Vec<_> = next.players.myself.hand.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_prevent_same_zone_reorder() {
        let state = with_hand(&["A", "B"]);
        let options = MoveOptions {
            prevent_same_zone_reorder: true,
            ..Default::default()
        };
        let moved = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "B"),
            &Position::new(zone(ZoneType::Hand).at(0), "B"),
            &options,
        );
        assert!(moved.is_none());
    }

    #[test]
    fn test_stack_position_bottom() {
        let mut state = with_hand(&["B"]);
        let mut under = card("A");
        under.rotation = ROTATION_DEFENSE;
        state.players.myself.monster_zones[0].push(under);

        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "B"),
            &Position::new(slot(ZoneType::MonsterZone, 0), "B"),
            &MoveOptions::default().with_stack_position(StackPosition::Bottom),
        )
        .unwrap();

        let stack = &next.players.myself.monster_zones[0];
        assert_eq!(stack[0].id, CardId::new("A"));
        assert_eq!(stack[0].rotation, ROTATION_DEFENSE);
        assert_eq!(stack[1].id, CardId::new("B"));
    }

    #[test]
    fn test_top_card_to_bottom_of_same_slot() {
        let mut state = GameState::default();
        state.players.myself.monster_zones[0].push(card("A"));
        state.players.myself.monster_zones[0].push(card("B"));

        let next = perform_card_move(
            &state,
            &Position::new(slot(ZoneType::MonsterZone, 0), "A"),
            &Position::new(slot(ZoneType::MonsterZone, 0), "A"),
            &MoveOptions::default().with_stack_position(StackPosition::Bottom),
        )
        .unwrap();

        let ids: Vec<_> = next.players.myself.monster_zones[0].iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_full_slot_target_is_noop() {
        let mut state = with_hand(&["A"]);
        for (i, stack) in state.players.myself.monster_zones.iter_mut().enumerate() {
            stack.push(card(&format!("M{i}")));
        }
        let moved = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "A"),
            &Position::new(zone(ZoneType::MonsterZone), "A"),
            &MoveOptions::default(),
        );
        assert!(moved.is_none());
    }

    #[test]
    fn test_move_to_opponent_side() {
        let state = with_hand(&["A"]);
        let next = perform_card_move(
            &state,
            &Position::new(zone(ZoneType::Hand), "A"),
            &Position::new(ZoneId::slot(Player::Opponent, ZoneType::MonsterZone, 4), "A"),
            &MoveOptions::default(),
        )
        .unwrap();
        assert_eq!(next.players.opponent.monster_zones[4][0].id, CardId::new("A"));
        assert_eq!(next.card_count(), 1);
    }

    #[test]
    fn test_rotation_flip_highlight_counter() {
        let mut state = GameState::default();
        state.players.myself.monster_zones[0].push(card("A"));
        let pos = Position::new(slot(ZoneType::MonsterZone, 0), "A");

        let state = perform_card_rotation(&state, &pos, ROTATION_DEFENSE).unwrap();
        assert!(perform_card_rotation(&state, &pos, ROTATION_DEFENSE).is_none());
        let state = perform_card_flip(&state, &pos).unwrap();
        let state = perform_card_highlight_toggle(&state, &pos).unwrap();
        let state = perform_update_counter(&state, &pos, 2).unwrap();

        let c = &state.players.myself.monster_zones[0][0];
        assert_eq!(c.rotation, ROTATION_DEFENSE);
        assert!(c.face_down);
        assert!(c.highlighted);
        assert_eq!(c.counter, Some(2));

        let state = perform_update_counter(&state, &pos, 0).unwrap();
        assert_eq!(state.players.myself.monster_zones[0][0].counter, None);
    }

    #[test]
    fn test_presentation_update_looks_at_stated_player() {
        let mut state = GameState::default();
        state.players.opponent.hand.push(card("A"));
        let wrong_side = Position::new(zone(ZoneType::Hand), "A");
        assert!(perform_card_flip(&state, &wrong_side).is_none());

        let right_side = Position::new(ZoneId::new(Player::Opponent, ZoneType::Hand), "A");
        assert!(perform_card_flip(&state, &right_side).is_some());
    }

    #[test]
    fn test_draw() {
        let mut state = GameState::default();
        state.players.myself.deck = vec![card("top"), card("next")];
        state.players.myself.hand = vec![card("H")];

        let (next, drawn) = perform_draw(&state, Player::Myself).unwrap();
        assert_eq!(drawn, CardId::new("top"));
        assert_eq!(next.players.myself.hand[1].id, drawn);
        assert_eq!(next.players.myself.deck.len(), 1);

        assert!(perform_draw(&GameState::default(), Player::Myself).is_none());
    }

    #[test]
    fn test_summon_token() {
        let state = with_hand(&["A"]);
        let dest = slot(ZoneType::MonsterZone, 0);
        let next = perform_summon_token(&state, &dest, card("token-1")).unwrap();
        assert_eq!(next.players.myself.monster_zones[0][0].id, CardId::new("token-1"));

        // Duplicate identity is rejected
        assert!(perform_summon_token(&next, &slot(ZoneType::MonsterZone, 1), card("A")).is_none());
    }

    #[test]
    fn test_life_points_and_phase() {
        let state = GameState::default();
        let next = perform_life_points(&state, Player::Opponent, -500).unwrap();
        assert_eq!(next.players.opponent.life_points, 0);
        assert!(perform_life_points(&next, Player::Opponent, 0).is_none());

        let next = perform_change_phase(&state, Phase::Battle, 3, Player::Opponent).unwrap();
        assert_eq!(next.phase, Phase::Battle);
        assert_eq!(next.turn, 3);
        assert!(perform_change_phase(&next, Phase::Battle, 3, Player::Opponent).is_none());
    }

    #[test]
    fn test_shuffle_matches_recorded_order() {
        let mut state = GameState::default();
        state.players.myself.deck = vec![card("A"), card("B"), card("C")];
        let order = vec![CardId::new("C"), CardId::new("A"), CardId::new("B")];

        let next = apply_shuffle(&state, Player::Myself, &order).unwrap().unwrap();
        let ids: Vec<_> = next.players.myself.deck.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, order);
    }

    #[test]
    fn test_shuffle_mismatch_is_error() {
        let mut state = GameState::default();
        state.players.myself.deck = vec![card("A"), card("B")];

        let wrong = vec![CardId::new("A"), CardId::new("Z")];
        assert!(matches!(
            apply_shuffle(&state, Player::Myself, &wrong),
            Err(BoardError::ShuffleMismatch { .. })
        ));

        let short = vec![CardId::new("A")];
        assert!(apply_shuffle(&state, Player::Myself, &short).is_err());

        let duplicated = vec![CardId::new("A"), CardId::new("A")];
        assert!(apply_shuffle(&state, Player::Myself, &duplicated).is_err());
    }

    #[test]
    fn test_shuffle_order_is_permutation() {
        let mut state = GameState::default();
        state.players.myself.deck = (0..20).map(|i| card(&format!("D{i}"))).collect();
        let mut rng = ChaCha12Rng::seed_from_u64(7);

        let order = shuffle_order(&state, Player::Myself, &mut rng);
        assert_eq!(order.len(), 20);
        assert!(apply_shuffle(&state, Player::Myself, &order).is_ok());
    }

    #[test]
    fn test_apply_operation_dispatch() {
        let state = with_hand(&["A"]);
        let moved = op(
            Some("A"),
            OperationKind::Move {
                from: zone(ZoneType::Hand),
                to: slot(ZoneType::MonsterZone, 0),
                options: MoveOptions::shift(),
            },
        );
        let next = apply_operation(&state, &moved).unwrap().unwrap();
        assert_eq!(next.players.myself.monster_zones[0][0].rotation, ROTATION_DEFENSE);

        // Same operation again: card is no longer in hand but is still found
        // by id; moving it onto its own slot changes nothing
        assert!(apply_operation(&next, &moved).unwrap().is_none());
    }

    #[test]
    fn test_apply_annotation_and_unknown_are_noops() {
        let state = with_hand(&["A"]);
        let activate = op(Some("A"), OperationKind::Activate { from: zone(ZoneType::Hand) });
        assert!(apply_operation(&state, &activate).unwrap().is_none());
        assert!(apply_operation(&state, &op(Some("A"), OperationKind::Unknown)).unwrap().is_none());
    }

    #[test]
    fn test_apply_without_card_id_is_noop() {
        let state = with_hand(&["A"]);
        let flip = op(None, OperationKind::ChangePosition { from: zone(ZoneType::Hand) });
        assert!(apply_operation(&state, &flip).unwrap().is_none());
    }
}
