//! Duel board - replay tool
//!
//! Loads recorded duels, rebuilds boards from them and checks that the
//! reconstruction is deterministic.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use duel_board::{
    core::Player,
    game::{
        compute_state_hash, format_hash, EngineConfig, GameEngine, GameState, OutputFormat,
        OutputMode, PlaybackState, Replay, ReplayFile, VerbosityLevel,
    },
    zones::ZoneType,
};
use std::path::PathBuf;

/// Verbosity level for output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Duel board - replay and verify recorded duels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a recorded duel and print the resulting board
    Replay {
        /// Replay file (.json)
        #[arg(value_name = "REPLAY_FILE")]
        file: PathBuf,

        /// Stop after this many operations (default: all)
        #[arg(long, value_name = "N")]
        until: Option<usize>,

        /// Verbosity level (silent/0, minimal/1, normal/2, verbose/3)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityArg,

        /// Print log lines as JSON objects
        #[arg(long)]
        json_log: bool,

        /// Hold log lines until the end and print only the last N
        #[arg(long, value_name = "N")]
        tail: Option<usize>,
    },

    /// Check that a recorded duel reconstructs deterministically
    Verify {
        /// Replay file (.json)
        #[arg(value_name = "REPLAY_FILE")]
        file: PathBuf,

        /// Print the board hash after every operation
        #[arg(long)]
        show_hashes: bool,
    },

    /// Print a readable description of every operation
    Describe {
        /// Replay file (.json)
        #[arg(value_name = "REPLAY_FILE")]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            file,
            until,
            verbosity,
            json_log,
            tail,
        } => run_replay(file, until, verbosity.into(), json_log, tail)?,
        Commands::Verify { file, show_hashes } => run_verify(file, show_hashes)?,
        Commands::Describe { file } => run_describe(file)?,
    }

    Ok(())
}

fn load_replay(file: &PathBuf) -> anyhow::Result<Replay> {
    let replay_file = ReplayFile::load_from_file(file)
        .with_context(|| format!("failed to load replay file {}", file.display()))?;
    Ok(replay_file.into_replay())
}

fn run_replay(
    file: PathBuf,
    until: Option<usize>,
    verbosity: VerbosityLevel,
    json_log: bool,
    tail: Option<usize>,
) -> anyhow::Result<()> {
    let replay = load_replay(&file)?;
    let total = replay.len();
    let until = until.unwrap_or(total);
    if until > total {
        bail!("--until {until} is past the end of the replay ({total} operations)");
    }

    let mut engine = GameEngine::new(EngineConfig::default().with_verbosity(verbosity));
    let logger = engine.logger_mut();
    // Captured either way so skipped steps can be counted
    logger.set_output_mode(match tail {
        Some(_) => OutputMode::Memory,
        None => OutputMode::Both,
    });
    if json_log {
        logger.set_output_format(OutputFormat::Json);
    }

    engine.start_replay(replay);
    while engine.replay_index().unwrap_or(total) < until {
        if !engine.step_replay()? {
            break;
        }
    }
    if engine.playback_state() == PlaybackState::Playing {
        engine.stop_replay()?;
    }

    let skipped = engine.logger().count_category("replay_desync");
    if let Some(lines) = tail {
        engine.logger_mut().flush_tail(lines);
    }

    if verbosity > VerbosityLevel::Silent {
        println!("After {until}/{total} operations:");
        print_board(engine.state());
        println!("State hash: {}", format_hash(compute_state_hash(engine.state())));
        if skipped > 0 {
            println!("Skipped steps: {skipped} (card missing when replayed)");
        }
    }
    Ok(())
}

fn run_verify(file: PathBuf, show_hashes: bool) -> anyhow::Result<()> {
    let replay = load_replay(&file)?;

    let states = replay.states().context("replay aborted")?;
    let again = replay.states().context("replay aborted")?;
    if states != again {
        bail!("reconstruction is not deterministic");
    }

    for (k, state) in states.iter().enumerate() {
        let prefix = replay.state_at(k)?;
        if prefix != *state {
            bail!("prefix mismatch after {k} operations");
        }
        if show_hashes {
            println!("{:>5}  {}", k, format_hash(compute_state_hash(state)));
        }
    }

    println!(
        "OK: {} operations, final hash {}",
        replay.len(),
        states
            .last()
            .map(|s| format_hash(compute_state_hash(s)))
            .unwrap_or_default()
    );
    Ok(())
}

fn run_describe(file: PathBuf) -> anyhow::Result<()> {
    let replay = load_replay(&file)?;
    let states = replay.states().context("replay aborted")?;

    // Names resolve against the board after the step, where the card still is
    for (k, operation) in replay.operations.iter().enumerate() {
        println!("{:>5}  {}", k + 1, operation.describe(&states[k + 1]));
    }
    Ok(())
}

fn print_board(state: &GameState) {
    println!(
        "Turn {} ({}): {}",
        state.turn, state.current_player, state.phase
    );
    for player in Player::ALL {
        let board = state.board(player);
        println!("  {player}: {} LP", board.life_points);

        for zone in [ZoneType::MonsterZone, ZoneType::ExtraMonsterZone, ZoneType::SpellTrapZone] {
            let slots = board.slots(zone).unwrap_or_default();
            let occupied: Vec<String> = slots
                .iter()
                .enumerate()
                .filter_map(|(i, stack)| {
                    stack.first().map(|top| {
                        let mut text = format!("{}:{}", i + 1, top.name);
                        if top.face_down {
                            text.push_str(" (set)");
                        } else if top.is_defense() {
                            text.push_str(" (def)");
                        }
                        if stack.len() > 1 {
                            text.push_str(&format!(" +{}", stack.len() - 1));
                        }
                        text
                    })
                })
                .collect();
            if !occupied.is_empty() {
                println!("    {}: {}", zone, occupied.join(", "));
            }
        }
        if let Some(card) = &board.field_zone {
            println!("    {}: {}", ZoneType::FieldZone, card.name);
        }
        for zone in ZoneType::ALL.iter().filter(|z| !z.is_slotted()) {
            if let Some(cards) = board.list(*zone) {
                if !cards.is_empty() {
                    println!("    {}: {} cards", zone, cards.len());
                }
            }
        }
    }
}
