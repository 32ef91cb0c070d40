//! Fixed timestep simulation tick
//!
//! Advances the whole run by one step. Same seed, same tuning and same input
//! sequence always produce the same state.

use glam::Vec2;

use super::combat;
use super::enemy::SteeringContext;
use super::events::GameEvent;
use super::player::PlayerInput;
use super::spawner::SpawnerState;
use super::state::{GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction; normalized by the player
    pub move_intent: Vec2,
    /// World-space aim point (mouse cursor)
    pub aim: Option<Vec2>,
    pub attack: bool,
    pub dash: bool,
    /// Pause toggle
    pub pause: bool,
    /// Debug overlay toggle
    pub toggle_debug: bool,
    /// Start a fresh run
    pub restart: bool,
    /// Pick one of the offered upgrades while in `UpgradeSelect`
    pub upgrade_choice: Option<usize>,
}

impl TickInput {
    fn player_input(&self) -> PlayerInput {
        PlayerInput {
            move_intent: self.move_intent,
            aim_target: self.aim,
            attack: self.attack,
            dash: self.dash,
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.toggle_debug {
        state.debug = !state.debug;
    }

    if input.restart && matches!(state.phase, GamePhase::Victory | GamePhase::GameOver) {
        let debug = state.debug;
        state.restart();
        state.debug = debug;
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if state.phase == GamePhase::UpgradeSelect {
        if let Some(choice) = input.upgrade_choice {
            if state.progression.select(choice, &mut state.player) {
                state.phase = GamePhase::Playing;
            } else {
                log::warn!("Ignoring upgrade choice {choice}");
            }
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let first_event = state.events.len();

    state.rebuild_spatial_hash();

    {
        let GameState {
            tuning,
            rng,
            bounds,
            obstacles,
            player,
            spawner,
            hash,
            events,
            ..
        } = state;
        let ctx = SteeringContext {
            player_pos: player.body.pos,
            player_vel: player.body.vel,
            hash,
            obstacles,
            bounds,
            ranger: &tuning.ranger_attack,
        };
        spawner.update(&ctx, dt, rng, events);
    }

    state.player.update(&input.player_input(), dt);
    state.player.contain(&state.bounds, &state.obstacles);

    combat::resolve(state, first_event);

    if !state.player.body.alive {
        state.phase = GamePhase::GameOver;
        state.spawner.game_over();
        state.events.push(GameEvent::GameOver);
        log::info!(
            "Game over on wave {} at level {}",
            state.spawner.wave,
            state.player.level
        );
    } else if state.spawner.state == SpawnerState::Victory {
        state.phase = GamePhase::Victory;
    } else if state.progression.pending() {
        state.phase = GamePhase::UpgradeSelect;
    }
}
