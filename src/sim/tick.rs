//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One fixed step
//! runs, in order: progression, spawning, forces, the physics step, boundary
//! drain, selection purge, game-over check.

use std::f32::consts::TAU;

use rand::Rng;

use super::actor::ActorId;
use super::physics::PhysicsWorld;
use super::progression::Transition;
use super::state::{GameEvent, GamePhase, GameState};
use crate::polar_to_cartesian;

/// Feed one frame delta and run every fixed step that fits. Returns the
/// number of steps executed.
pub fn advance<P: PhysicsWorld>(state: &mut GameState<P>, frame_dt: f64) -> u32 {
    if state.phase == GamePhase::GameOver {
        return 0;
    }
    state.clock.accumulate(frame_dt);

    let mut steps = 0;
    while let Some(world_time) = state.clock.next_step() {
        fixed_step(state, world_time);
        steps += 1;
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    steps
}

/// Run one fixed step ending at `world_time`
pub fn fixed_step<P: PhysicsWorld>(state: &mut GameState<P>, world_time: f64) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    match state.progression.evaluate(world_time) {
        Transition::TimeUp => {
            if state.phase == GamePhase::Playing {
                state.phase = GamePhase::Closing;
            }
            state.table.tombstone_all();
        }
        Transition::LevelAdvanced { level } => {
            let cleared = state.table.tombstone_all();
            log::debug!("Level {} clears {} letters", level, cleared);
            state.emit(GameEvent::LevelAdvanced { level });
        }
        Transition::None => {}
    }

    spawn_due(state, world_time);

    state.progression.force_field().apply(&mut state.table);

    let violators = state.table.step_physics(
        state.config.time_step as f32,
        state.config.velocity_iterations,
        state.config.position_iterations,
    );
    let destroyed = state.table.drain_boundary_violations(&violators);
    if destroyed > 0 {
        log::trace!("{} actors left the world", destroyed);
    }

    if state.selection.purge_stale(&state.table) > 0 {
        state.selection_changed();
    }

    if state.phase == GamePhase::Closing && state.table.is_empty() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over: score {}, level {}, {} words",
            state.score,
            state.progression.level(),
            state.words_accepted
        );
        let score = state.score;
        state.emit(GameEvent::GameOver { score });
    }
}

/// Attempt every spawn scheduled up to `world_time`
fn spawn_due<P: PhysicsWorld>(state: &mut GameState<P>, world_time: f64) {
    if state.phase != GamePhase::Playing {
        return;
    }
    while state.next_spawn_at <= world_time {
        state.next_spawn_at += state.config.creation_interval;
        let cap = state.progression.letter_cap();
        if state.table.live_count(None) >= cap {
            continue;
        }
        spawn_letter(state);
    }
}

/// Spawn one weighted-random letter on the creation ring
pub fn spawn_letter<P: PhysicsWorld>(state: &mut GameState<P>) -> Option<ActorId> {
    let letter = match state.lexicon.weighted_random_symbol(&mut state.rng) {
        Ok(letter) => letter,
        Err(err) => {
            log::debug!("Spawn skipped: {}", err);
            return None;
        }
    };
    let theta = state.rng.random_range(0.0..TAU);
    let position = polar_to_cartesian(state.config.creation_distance, theta);
    let angle = state.rng.random_range(0.0..TAU);
    let (min, max) = (state.config.min_radius, state.config.max_radius);
    let radius = if min < max {
        state.rng.random_range(min..max)
    } else {
        min
    };
    Some(state.table.spawn(letter, position, angle, radius))
}
