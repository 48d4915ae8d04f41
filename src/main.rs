//! Headless runner
//!
//! `battle-city [stages-dir] [seed] [seconds]` plays a seeded session at a
//! fixed 60 Hz step with a scripted autopilot and prints a JSON summary.

use std::collections::BTreeMap;
use std::process::ExitCode;

use battle_city::consts::SIM_DT;
use battle_city::sim::{Direction, GameOverReason, GamePhase, GameState, Side, Snapshot, TickInput, tick};
use battle_city::{DirStages, GameError, Tuning};
use serde::Serialize;

const DEFAULT_STAGES_DIR: &str = "stages";
const DEFAULT_SECONDS: f32 = 120.0;
/// Horizontal slack before the autopilot lines up under a target
const AIM_TOLERANCE: f32 = 16.0;

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    stage: u32,
    phase: GamePhase,
    lives: u8,
    level: u8,
    bots_destroyed: usize,
    game_over: Option<GameOverReason>,
    events: BTreeMap<&'static str, usize>,
}

/// Drives toward the nearest bot's column and taps fire every other tick
fn autopilot(snapshot: &Snapshot<'_>, tick_index: u64) -> TickInput {
    let mut input = TickInput {
        fire: tick_index % 2 == 0,
        ..Default::default()
    };
    let Some(player) = snapshot.tanks.first() else {
        return input;
    };
    let target = snapshot
        .tanks
        .iter()
        .filter(|t| t.side == Side::Opponent)
        .min_by(|a, b| {
            let da = a.pos.distance_squared(player.pos);
            let db = b.pos.distance_squared(player.pos);
            da.total_cmp(&db)
        });

    let heading = match target {
        Some(bot) if bot.pos.x > player.pos.x + AIM_TOLERANCE => Direction::East,
        Some(bot) if bot.pos.x < player.pos.x - AIM_TOLERANCE => Direction::West,
        Some(_) => Direction::North,
        // Patrol while the field is empty
        None if (tick_index / 90) % 2 == 0 => Direction::East,
        None => Direction::West,
    };
    match heading {
        Direction::North => input.up = true,
        Direction::East => input.right = true,
        Direction::South => input.down = true,
        Direction::West => input.left = true,
    }
    input
}

fn run() -> Result<Summary, GameError> {
    let mut args = std::env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| DEFAULT_STAGES_DIR.to_string());
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SECONDS);

    let stages = DirStages::new(dir);
    log::info!("Reading stages from {}", stages.dir().display());
    let mut state = GameState::new(seed, Tuning::default(), &stages)?;
    log::info!("Game initialized with seed: {seed}");

    let total_ticks = (seconds / SIM_DT).ceil() as u64;
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for tick_index in 0..total_ticks {
        let input = autopilot(&state.snapshot(), tick_index);
        tick(&mut state, &input, SIM_DT, &stages)?;
        for event in state.drain_events() {
            log::debug!("{event:?}");
            *counts.entry(event.name()).or_default() += 1;
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let snapshot = state.snapshot();
    Ok(Summary {
        seed,
        ticks: state.time_ticks,
        stage: snapshot.stage,
        phase: snapshot.phase,
        lives: snapshot.lives,
        level: snapshot.level,
        bots_destroyed: snapshot.bots_destroyed,
        game_over: snapshot.game_over,
        events: counts,
    })
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Battle City (headless) starting...");

    match run() {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("Failed to encode summary: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
