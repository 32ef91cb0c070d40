//! Force combination and semi-implicit Euler integration
//!
//! Mass is 1 for every body, so force and acceleration are interchangeable.
//! The accumulator is cleared after every step: forces are per-tick impulses.

use glam::Vec2;

use super::entity::Body;
use crate::math::Vec2Ext;

/// Weighted sum of steering forces. A missing weight counts as 1; zero
/// forces are skipped. Summation runs in slice order so results are
/// reproducible bit-for-bit.
pub fn combine(forces: &[Vec2], weights: &[f32]) -> Vec2 {
    forces
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_zero())
        .fold(Vec2::ZERO, |acc, (i, f)| {
            acc + *f * weights.get(i).copied().unwrap_or(1.0)
        })
}

/// Rescale `force` to exactly `max_force` when it is longer
#[inline]
pub fn clamp(force: Vec2, max_force: f32) -> Vec2 {
    force.limit(max_force)
}

/// Add a force to the body's accumulator
#[inline]
pub fn apply_force(body: &mut Body, force: Vec2) {
    body.acc += force;
}

/// Advance one step: velocity from acceleration, speed clamp, position from
/// velocity, then reset the accumulator.
pub fn integrate(body: &mut Body, dt: f32) {
    body.vel += body.acc * dt;
    body.vel.limit_mut(body.max_speed);
    body.pos += body.vel * dt;
    body.acc = Vec2::ZERO;
}

/// Clamp a steering force to the body's `max_force`, apply it, integrate
pub fn steer(body: &mut Body, force: Vec2, dt: f32) {
    let clamped = clamp(force, body.max_force);
    apply_force(body, clamped);
    integrate(body, dt);
}
