//! Ring Duel headless runner
//!
//! Plays autopilot-vs-AI matches at the nominal tick rate without a window,
//! advancing levels while the autopilot keeps winning. Useful for balance
//! passes and soak testing.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use ring_duel::Tuning;
use ring_duel::consts::TICK_MS;
use ring_duel::sim::{GamePhase, GameState, MatchOutcome, Snapshot, TickInput, tick};

/// Headless ring duel simulator
#[derive(Parser, Debug)]
#[command(name = "ring-duel")]
#[command(about = "Run headless ring duel matches (autopilot vs AI)")]
#[command(version)]
struct Args {
    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Starting level
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Stop after this many ticks in total
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,

    /// JSON tuning file (missing fields use defaults)
    #[arg(long, value_name = "TUNING_FILE")]
    tuning: Option<PathBuf>,

    /// Print the active tuning as JSON and exit
    #[arg(long)]
    print_tuning: bool,

    /// Emit a JSON snapshot line to stdout every N ticks (0 = never)
    #[arg(long, default_value_t = 0, value_name = "N")]
    snapshot_every: u64,
}

fn load_tuning(path: Option<&Path>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match Tuning::load(path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::warn!("{e}; using default tuning");
            Tuning::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let tuning = load_tuning(args.tuning.as_deref());

    if args.print_tuning {
        return match tuning.to_json_pretty() {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    log::info!("Ring Duel (headless) starting, seed {}", args.seed);
    let mut state = match GameState::new(args.seed, tuning) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for _ in 1..args.level.max(1) {
        state.advance_level();
    }

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut total_ticks = 0u64;
    let mut wins = 0u32;

    while total_ticks < args.max_ticks {
        let wall_ms = total_ticks as f64 * TICK_MS;
        tick(&mut state, &input, wall_ms);
        total_ticks += 1;
        state.drain_events();

        if args.snapshot_every > 0 && total_ticks % args.snapshot_every == 0 {
            match serde_json::to_string(&Snapshot::capture(&state)) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("snapshot failed: {e}"),
            }
        }

        if state.phase == GamePhase::MatchOver {
            match state.outcome {
                Some(MatchOutcome::LevelComplete { .. }) => {
                    wins += 1;
                    state.advance_level();
                }
                _ => break,
            }
        }
    }

    let result = state
        .outcome_message()
        .unwrap_or_else(|| "still fighting".to_string());
    log::info!(
        "Finished after {} ticks: {} level(s) cleared, reached level {} ({})",
        total_ticks,
        wins,
        state.level,
        result
    );
    ExitCode::SUCCESS
}
