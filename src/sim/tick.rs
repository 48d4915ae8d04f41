//! Fixed timestep simulation tick
//!
//! Drives the phase machine and, while a stage is live, advances it by one step.

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::state::{GameEvent, GamePhase, GameState};
use crate::error::GameError;
use crate::stages::StageSource;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
    /// Fire key held; a shot goes off only on the tick it is pressed
    pub fire: bool,
    /// Pause toggle (edge, not held)
    pub pause: bool,
}

impl TickInput {
    /// Single heading from the held keys; up beats right beats down beats left
    pub fn held_direction(&self) -> Option<Direction> {
        [
            (self.up, Direction::North),
            (self.right, Direction::East),
            (self.down, Direction::South),
            (self.left, Direction::West),
        ]
        .into_iter()
        .find_map(|(held, direction)| held.then_some(direction))
    }
}

/// Advance the game state by one fixed timestep.
///
/// `stages` is consulted only when a cleared stage hands over to the next one.
pub fn tick<S: StageSource + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    dt: f32,
    stages: &S,
) -> Result<(), GameError> {
    state.time_ticks += 1;

    // Firing is edge-triggered: holding the key yields one shot
    let pressed = input.fire && !state.fire_held;
    state.fire_held = input.fire;
    let input = &TickInput {
        fire: pressed,
        ..*input
    };

    match state.phase {
        GamePhase::GameOver => return Ok(()),
        GamePhase::StageTitle => {
            state.phase_elapsed += dt;
            if state.phase_elapsed >= state.tuning.stage_title_duration {
                state.phase = GamePhase::Playing;
                state.phase_elapsed = 0.0;
            }
            return Ok(());
        }
        GamePhase::Paused => {
            if input.pause {
                state.phase = GamePhase::Playing;
                state.stage.events.push(GameEvent::PauseToggled { paused: false });
            }
            return Ok(());
        }
        GamePhase::Playing if input.pause => {
            state.phase = GamePhase::Paused;
            state.stage.events.push(GameEvent::PauseToggled { paused: true });
            return Ok(());
        }
        GamePhase::StageCleared => {
            if state.phase_elapsed >= state.tuning.stage_clear_delay {
                return state.advance_stage(stages);
            }
            state.phase_elapsed += dt;
        }
        GamePhase::Playing => {}
    }

    state.stage.step(input, &mut state.rng, &state.tuning, dt);

    if let Some(reason) = state.stage.outcome() {
        log::info!("Game over on stage {}: {reason:?}", state.stage.number);
        state.phase = GamePhase::GameOver;
        state.game_over = Some(reason);
        state.stage.events.push(GameEvent::GameOver { reason });
    } else if state.phase == GamePhase::Playing && state.stage.is_cleared() {
        log::info!("Stage {} cleared", state.stage.number);
        state.phase = GamePhase::StageCleared;
        state.phase_elapsed = 0.0;
        state.stage.events.push(GameEvent::StageCleared {
            stage: state.stage.number,
        });
    }
    Ok(())
}
