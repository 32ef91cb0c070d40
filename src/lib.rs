//! Survivor Core - simulation core of a top-down survival action game
//!
//! Core modules:
//! - `sim`: Deterministic fixed-timestep simulation (steering, combat, waves)
//! - `math`: Vector helpers layered on `glam::Vec2`
//! - `config`: Data-driven game balance
//! - `error`: Errors for the few fallible entry points (tuning data)

pub mod config;
pub mod error;
pub mod math;
pub mod sim;

pub use config::Tuning;
pub use error::ConfigError;
pub use math::Vec2Ext;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest frame the loop will try to catch up on (spiral of death guard)
    pub const MAX_FRAME_TIME: f32 = 0.25;

    /// Arena dimensions
    pub const WORLD_WIDTH: f32 = 2400.0;
    pub const WORLD_HEIGHT: f32 = 2400.0;
    /// Seed for obstacle layout and gameplay RNG
    pub const WORLD_SEED: u64 = 42;

    /// Spatial hash bucket size (world units)
    pub const CELL_SIZE: f32 = 150.0;

    /// Duration of the white hit flash after taking damage
    pub const HIT_FLASH_DURATION: f32 = 0.1;
    /// Minimum interval between contact hits from the same enemy
    pub const CONTACT_COOLDOWN: f32 = 0.5;
}

/// Normalized angle to [-π, π]. Non-finite input yields 0.
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    // Stepping by 2π stalls once the angle dwarfs it
    if angle.abs() > 8.0 * TAU {
        angle = angle.rem_euclid(TAU);
    }
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
