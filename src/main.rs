//! Survivor Core - headless runner
//!
//! Plays a full run with a simple autopilot and reports the outcome. Pass a
//! JSON tuning file as the first argument to override the defaults.

use glam::Vec2;
use survivor_core::sim::{Archetype, FixedTimestep, GameEvent, GamePhase, GameState, TickInput, tick};
use survivor_core::{ConfigError, Tuning};

/// Simulated wall time per presentation frame (a 50 Hz display)
const FRAME_SECONDS: f32 = 1.0 / 50.0;
/// Give up after this much simulated time
const MAX_RUN_SECONDS: f32 = 900.0;
/// Enemies closer than this make the autopilot back away
const DANGER_RADIUS: f32 = 120.0;
/// Enemies closer than this trigger a dash
const PANIC_RADIUS: f32 = 45.0;

fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let tuning = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading tuning from {path}");
            Tuning::load(path)?
        }
        None => Tuning::default(),
    };
    log::info!("Survivor Core (headless) starting...");

    let mut state = GameState::new(tuning.clone());
    let mut clock = FixedTimestep::new(tuning.timing.dt, tuning.timing.max_frame_time);
    let mut kills = 0u32;
    let mut elapsed = 0.0;

    while elapsed < MAX_RUN_SECONDS && !is_finished(state.phase) {
        clock.advance(
            FRAME_SECONDS,
            |dt| {
                let input = autopilot(&state);
                tick(&mut state, &input, dt);
            },
            |_alpha| {},
        );
        for event in state.drain_events() {
            if let GameEvent::EnemyDied { archetype, .. } = event {
                kills += 1;
                if archetype == Archetype::Boss {
                    log::info!("Boss down after {elapsed:.1}s");
                }
            }
        }
        elapsed += FRAME_SECONDS;
    }

    println!(
        "{:?} after {:.1}s: wave {}, level {}, {} kills, {} coins, {:.0}/{:.0} hp",
        state.phase,
        elapsed,
        state.spawner.wave,
        state.player.level,
        kills,
        state.player.coins,
        state.player.body.hp,
        state.player.body.max_hp,
    );
    Ok(())
}

fn is_finished(phase: GamePhase) -> bool {
    matches!(phase, GamePhase::Victory | GamePhase::GameOver)
}

/// Kite: aim and swing at the nearest threat, back away when crowded
fn autopilot(state: &GameState) -> TickInput {
    let pos = state.player.body.pos;
    let nearest = state
        .entity_views()
        .into_iter()
        .filter(|v| v.archetype != Archetype::Player && v.alive)
        .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)));

    let Some(target) = nearest else {
        // Drift back toward the arena centre between waves
        let home = state.bounds.center() - pos;
        return TickInput {
            move_intent: if home.length() > 50.0 { home.normalize() } else { Vec2::ZERO },
            upgrade_choice: Some(0),
            ..Default::default()
        };
    };

    let offset = target.pos - pos;
    let gap = offset.length() - target.radius - state.player.body.radius;
    let move_intent = if gap < DANGER_RADIUS {
        -offset.normalize_or_zero()
    } else {
        Vec2::ZERO
    };

    TickInput {
        move_intent,
        aim: Some(target.pos),
        attack: true,
        dash: gap < PANIC_RADIUS,
        upgrade_choice: Some(0),
        ..Default::default()
    }
}
