//! Property tests for replay reconstruction and undo/redo
//!
//! Random sequences of host actions are played on a live engine; the
//! recorded log must then reconstruct the same boards however it is split
//! or navigated.

use duel_board::{
    core::{Card, Player},
    game::{reconstruct, EngineConfig, GameEngine, Position, VerbosityLevel},
    operation::MoveOptions,
    zones::{find_card, StackPosition, ZoneId, ZoneType},
};
use proptest::prelude::*;

const CARD_COUNT: usize = 8;

#[derive(Debug, Clone)]
enum Action {
    Draw(Player),
    Move {
        card: usize,
        player: Player,
        zone: ZoneType,
        slot: Option<usize>,
        shift: bool,
        face_down: bool,
        bottom: bool,
    },
    Rotate(usize, i32),
    Flip(usize),
    Highlight(usize),
    Counter(usize, i32),
    Shuffle(Player),
    LifePoints(Player, i32),
    AdvancePhase,
}

fn player() -> impl Strategy<Value = Player> {
    prop_oneof![Just(Player::Myself), Just(Player::Opponent)]
}

fn zone() -> impl Strategy<Value = ZoneType> {
    proptest::sample::select(ZoneType::ALL.to_vec())
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        player().prop_map(Action::Draw),
        (
            0..CARD_COUNT,
            player(),
            zone(),
            proptest::option::of(0usize..6),
            any::<bool>(),
            any::<bool>(),
            any::<bool>()
        )
            .prop_map(|(card, player, zone, slot, shift, face_down, bottom)| Action::Move {
                card,
                player,
                zone,
                slot,
                shift,
                face_down,
                bottom,
            }),
        (0..CARD_COUNT, prop_oneof![Just(0), Just(-90), Just(90), Just(180)])
            .prop_map(|(card, angle)| Action::Rotate(card, angle)),
        (0..CARD_COUNT).prop_map(Action::Flip),
        (0..CARD_COUNT).prop_map(Action::Highlight),
        (0..CARD_COUNT, -2i32..6).prop_map(|(card, value)| Action::Counter(card, value)),
        player().prop_map(Action::Shuffle),
        (player(), 0i32..9000).prop_map(|(player, value)| Action::LifePoints(player, value)),
        Just(Action::AdvancePhase),
    ]
}

fn card_id(card: usize) -> String {
    format!("c{card}")
}

/// Where the host currently sees the card
fn position(engine: &GameEngine, card: usize) -> Option<Position> {
    let id = card_id(card).into();
    let (zone, _) = find_card(engine.state(), &id)?;
    Some(Position::new(zone, id))
}

fn seeded_engine() -> GameEngine {
    let config = EngineConfig::default()
        .with_rng_seed(11)
        .with_verbosity(VerbosityLevel::Silent);
    let mut engine = GameEngine::new(config);
    engine.logger_mut().enable_capture();

    let deck: Vec<Card> = (0..CARD_COUNT)
        .map(|i| Card::new(card_id(i), format!("Card {i}")))
        .collect();
    let (mine, theirs) = deck.split_at(CARD_COUNT / 2);
    engine.load_deck(Player::Myself, mine.to_vec(), vec![]);
    engine.load_deck(Player::Opponent, theirs.to_vec(), vec![]);
    engine
}

fn play(engine: &mut GameEngine, actions: &[Action]) {
    for action in actions {
        match action {
            Action::Draw(player) => {
                engine.draw_card(*player);
            }
            Action::Move {
                card,
                player,
                zone,
                slot,
                shift,
                face_down,
                bottom,
            } => {
                let Some(from) = position(engine, *card) else { continue };
                let mut to_zone = ZoneId::new(*player, *zone);
                to_zone.index = *slot;
                let mut options = MoveOptions {
                    shift_key: *shift,
                    face_down_mode: *face_down,
                    ..Default::default()
                };
                if *bottom {
                    options = options.with_stack_position(StackPosition::Bottom);
                }
                let to = Position::new(to_zone, from.card_id.clone());
                engine.move_card(&from, &to, options);
            }
            Action::Rotate(card, angle) => {
                if let Some(p) = position(engine, *card) {
                    engine.rotate_card(&p, *angle);
                }
            }
            Action::Flip(card) => {
                if let Some(p) = position(engine, *card) {
                    engine.flip_card(&p);
                }
            }
            Action::Highlight(card) => {
                if let Some(p) = position(engine, *card) {
                    engine.toggle_highlight(&p);
                }
            }
            Action::Counter(card, value) => {
                if let Some(p) = position(engine, *card) {
                    engine.update_counter(&p, *value);
                }
            }
            Action::Shuffle(player) => {
                engine.shuffle_deck(*player).unwrap();
            }
            Action::LifePoints(player, value) => {
                engine.set_life_points(*player, *value);
            }
            Action::AdvancePhase => {
                engine.advance_phase();
            }
        }
    }
}

proptest! {
    /// Reconstructing the recorded log yields the live board, every time
    #[test]
    fn replay_is_deterministic(actions in prop::collection::vec(action(), 0..40)) {
        let mut engine = seeded_engine();
        play(&mut engine, &actions);

        let replay = engine.export_replay();
        let first = replay.final_state().unwrap();
        let second = replay.final_state().unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, engine.state());
    }

    /// Replaying [0..j] equals replaying [0..i] then [i..j]
    #[test]
    fn prefix_consistency(
        actions in prop::collection::vec(action(), 0..40),
        a in 0usize..=40,
        b in 0usize..=40,
    ) {
        let mut engine = seeded_engine();
        play(&mut engine, &actions);
        let replay = engine.export_replay();

        let len = replay.len();
        let (i, j) = (a.min(b).min(len), a.max(b).min(len));
        let middle = reconstruct(&replay.start, &replay.operations[..i]).unwrap();
        let split = reconstruct(&middle, &replay.operations[i..j]).unwrap();
        prop_assert_eq!(split, replay.state_at(j).unwrap());
    }

    /// N undos return to the loaded board, N redos back to the final one
    #[test]
    fn undo_redo_round_trip(actions in prop::collection::vec(action(), 0..40)) {
        let mut engine = seeded_engine();
        let initial = engine.state().clone();
        play(&mut engine, &actions);
        let final_state = engine.state().clone();
        let n = engine.operations().len();

        for _ in 0..n {
            prop_assert!(engine.undo());
        }
        prop_assert!(!engine.undo());
        prop_assert_eq!(engine.state(), &initial);

        for _ in 0..n {
            prop_assert!(engine.redo().unwrap());
        }
        prop_assert_eq!(engine.state(), &final_state);
    }

    /// Card identity: no card is ever duplicated or lost
    #[test]
    fn cards_are_conserved(actions in prop::collection::vec(action(), 0..40)) {
        let mut engine = seeded_engine();
        play(&mut engine, &actions);

        let mut ids: Vec<String> = engine.state().cards().map(|c| c.id.to_string()).collect();
        ids.sort();
        let mut expected: Vec<String> = (0..CARD_COUNT).map(card_id).collect();
        expected.sort();
        prop_assert_eq!(ids, expected);
    }
}
