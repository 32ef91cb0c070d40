//! Reynolds-style steering behaviors
//!
//! Every behavior is a pure function of plain kinematics and returns a
//! steering force (desired velocity minus current velocity). Callers extract
//! positions/velocities from their entities; nothing here touches an entity.
//! `wander` is the one exception that carries state, and that state lives in
//! a caller-owned [`Wander`] so its angle survives between ticks.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::world::{Bounds, Obstacle};
use crate::math::Vec2Ext;

/// Speeds below this are treated as "stationary" when picking a heading
const MIN_HEADING_SPEED: f32 = 0.01;

/// Kinematic snapshot of the steering agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub max_speed: f32,
}

impl Agent {
    /// Current heading, or +X when stationary
    fn heading_or_default(&self) -> f32 {
        if self.vel.length() > MIN_HEADING_SPEED {
            self.vel.heading()
        } else {
            0.0
        }
    }
}

/// Steer toward `target` at full speed
pub fn seek(agent: &Agent, target: Vec2) -> Vec2 {
    let desired = target - agent.pos;
    if desired.length_squared() == 0.0 {
        return Vec2::ZERO;
    }
    desired.with_magnitude(agent.max_speed) - agent.vel
}

/// Steer directly away from `target` while it is within `panic_radius`.
/// Pass `f32::INFINITY` for an unbounded panic range.
pub fn flee(agent: &Agent, target: Vec2, panic_radius: f32) -> Vec2 {
    if agent.pos.distance(target) > panic_radius {
        return Vec2::ZERO;
    }
    let away = agent.pos - target;
    if away.is_zero() {
        return Vec2::ZERO;
    }
    away.with_magnitude(agent.max_speed) - agent.vel
}

/// Seek that ramps desired speed down linearly inside `slow_radius`
pub fn arrive(agent: &Agent, target: Vec2, slow_radius: f32) -> Vec2 {
    let to_target = target - agent.pos;
    let dist = to_target.length();
    if dist == 0.0 {
        return Vec2::ZERO;
    }

    let speed = if dist < slow_radius {
        agent.max_speed * (dist / slow_radius)
    } else {
        agent.max_speed
    };
    to_target.with_magnitude(speed) - agent.vel
}

/// Where a moving target will be, with the look-ahead capped by how long the
/// agent needs to cover the current gap
fn predict(agent: &Agent, target_pos: Vec2, target_vel: Vec2, prediction_time: f32) -> Vec2 {
    let dist = agent.pos.distance(target_pos);
    let t = if agent.max_speed > 0.0 {
        prediction_time.min(dist / agent.max_speed)
    } else {
        0.0
    };
    target_pos + target_vel * t
}

/// Seek the predicted future position of a moving target
pub fn pursue(agent: &Agent, target_pos: Vec2, target_vel: Vec2, prediction_time: f32) -> Vec2 {
    seek(agent, predict(agent, target_pos, target_vel, prediction_time))
}

/// Flee the predicted future position of a moving target
pub fn evade(
    agent: &Agent,
    target_pos: Vec2,
    target_vel: Vec2,
    panic_radius: f32,
    prediction_time: f32,
) -> Vec2 {
    if agent.pos.distance(target_pos) > panic_radius {
        return Vec2::ZERO;
    }
    flee(agent, predict(agent, target_pos, target_vel, prediction_time), f32::INFINITY)
}

/// Persistent wander state; the offset angle drifts instead of resetting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wander {
    pub angle: f32,
    /// Radius of the circle the target point rides on
    pub radius: f32,
    /// How far ahead of the agent the circle sits
    pub distance: f32,
    /// Max change per call, as a fraction of π
    pub jitter: f32,
}

impl Wander {
    pub fn new(angle: f32) -> Self {
        Self {
            angle,
            radius: 50.0,
            distance: 80.0,
            jitter: 0.3,
        }
    }

    /// Start at a random offset angle
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.random::<f32>() * std::f32::consts::TAU)
    }
}

/// Smooth random steering: nudge the wander angle, then seek a point on a
/// circle projected ahead of the current heading
pub fn wander(agent: &Agent, state: &mut Wander, rng: &mut impl Rng) -> Vec2 {
    state.angle += (rng.random::<f32>() - 0.5) * state.jitter * std::f32::consts::PI;

    let circle_center = agent.pos + Vec2::from_angle(agent.heading_or_default()) * state.distance;
    let target = circle_center + Vec2::from_angle(state.angle) * state.radius;
    seek(agent, target)
}

/// Push away from neighbours inside `desired_separation`, closer ones harder
pub fn separation(
    agent: &Agent,
    neighbors: impl IntoIterator<Item = Vec2>,
    desired_separation: f32,
) -> Vec2 {
    let mut steer = Vec2::ZERO;
    let mut count = 0u32;

    for other in neighbors {
        let d = agent.pos.distance(other);
        if d > 0.0 && d < desired_separation {
            steer += (agent.pos - other).normalize_or_zero() / d;
            count += 1;
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }
    steer /= count as f32;
    if steer.length_squared() == 0.0 {
        return Vec2::ZERO;
    }
    steer.with_magnitude(agent.max_speed) - agent.vel
}

/// Seek the centroid of the neighbours
pub fn cohesion(agent: &Agent, neighbors: impl IntoIterator<Item = Vec2>) -> Vec2 {
    let mut center = Vec2::ZERO;
    let mut count = 0u32;
    for pos in neighbors {
        center += pos;
        count += 1;
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    seek(agent, center / count as f32)
}

/// Match the neighbours' average velocity, at full speed
pub fn alignment(agent: &Agent, neighbor_velocities: impl IntoIterator<Item = Vec2>) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for vel in neighbor_velocities {
        sum += vel;
        count += 1;
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    let avg = sum / count as f32;
    if avg.is_zero() {
        return Vec2::ZERO;
    }
    avg.with_magnitude(agent.max_speed) - agent.vel
}

/// Steer away from the nearest obstacle in the path.
///
/// Two feeler points are projected along the heading (full and half
/// `look_ahead`). Any obstacle containing a feeler, or already touching the
/// agent, is a threat; only the one whose centre is closest matters.
pub fn avoid_obstacles(agent: &Agent, obstacles: &[Obstacle], look_ahead: f32) -> Vec2 {
    if obstacles.is_empty() {
        return Vec2::ZERO;
    }

    let ahead = Vec2::from_angle(agent.heading_or_default()) * look_ahead;
    let ahead_full = agent.pos + ahead;
    let ahead_half = agent.pos + ahead * 0.5;
    let radius_sq = agent.radius * agent.radius;

    let threat = obstacles
        .iter()
        .filter(|obs| {
            obs.contains_point(ahead_full)
                || obs.contains_point(ahead_half)
                || agent.pos.distance_squared(obs.closest_point(agent.pos)) < radius_sq
        })
        .map(|obs| (obs, agent.pos.distance_squared(obs.center())))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    match threat {
        Some((obs, _)) => (agent.pos - obs.center()).normalize_or_zero() * agent.max_speed,
        None => Vec2::ZERO,
    }
}

/// Turn back toward the interior when within `margin` of an edge.
/// Each axis is handled independently.
pub fn contain_within_bounds(agent: &Agent, bounds: &Bounds, margin: f32) -> Vec2 {
    let mut desired = Vec2::ZERO;

    if agent.pos.x < bounds.left + margin {
        desired.x = agent.max_speed;
    } else if agent.pos.x > bounds.right - margin {
        desired.x = -agent.max_speed;
    }

    if agent.pos.y < bounds.top + margin {
        desired.y = agent.max_speed;
    } else if agent.pos.y > bounds.bottom - margin {
        desired.y = -agent.max_speed;
    }

    if desired.is_zero() {
        return Vec2::ZERO;
    }
    desired - agent.vel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn agent_at(pos: Vec2, vel: Vec2) -> Agent {
        Agent {
            pos,
            vel,
            radius: 10.0,
            max_speed: 100.0,
        }
    }

    #[test]
    fn test_seek_from_rest() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        let f = seek(&a, Vec2::new(0.0, 50.0));
        assert!(f.approx_eq(Vec2::new(0.0, 100.0), 1e-4));
        assert_eq!(seek(&a, Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_flee_respects_panic_radius() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(flee(&a, Vec2::new(200.0, 0.0), 150.0), Vec2::ZERO);
        let f = flee(&a, Vec2::new(100.0, 0.0), 150.0);
        assert!(f.approx_eq(Vec2::new(-100.0, 0.0), 1e-4));
        assert!(flee(&a, Vec2::new(1000.0, 0.0), f32::INFINITY).x < 0.0);
    }

    #[test]
    fn test_arrive_slows_inside_radius() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(arrive(&a, Vec2::ZERO, 100.0), Vec2::ZERO);

        // From rest the force equals the desired velocity
        let f = arrive(&a, Vec2::new(50.0, 0.0), 100.0);
        assert!((f.length() - 50.0).abs() < 1e-3);
        assert!(f.length() < a.max_speed);

        let far = arrive(&a, Vec2::new(500.0, 0.0), 100.0);
        assert!((far.length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_pursue_leads_moving_target() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        let f = pursue(&a, Vec2::new(100.0, 0.0), Vec2::new(0.0, 100.0), 0.5);
        // Prediction capped at 0.5s (distance/max_speed = 1s): aims at (100, 50)
        assert!(f.approx_eq(Vec2::new(100.0, 50.0).with_magnitude(100.0), 1e-3));

        // Close targets get a short look-ahead
        let near = pursue(&a, Vec2::new(10.0, 0.0), Vec2::new(0.0, 100.0), 0.5);
        assert!(near.approx_eq(Vec2::new(10.0, 10.0).with_magnitude(100.0), 1e-3));
    }

    #[test]
    fn test_evade_mirrors_pursue() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        let f = evade(&a, Vec2::new(100.0, 0.0), Vec2::new(0.0, 100.0), f32::INFINITY, 0.5);
        assert!(f.approx_eq(Vec2::new(-100.0, -50.0).with_magnitude(100.0), 1e-3));
        assert_eq!(evade(&a, Vec2::new(100.0, 0.0), Vec2::ZERO, 50.0, 0.5), Vec2::ZERO);
    }

    #[test]
    fn test_wander_angle_persists() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = agent_at(Vec2::ZERO, Vec2::new(50.0, 0.0));
        let mut state = Wander::new(1.0);
        let first = wander(&a, &mut state, &mut rng);
        let after_one = state.angle;
        assert!((after_one - 1.0).abs() <= 0.15 * std::f32::consts::PI + 1e-6);
        wander(&a, &mut state, &mut rng);
        // Second call continues from the first call's angle
        assert!((state.angle - after_one).abs() <= 0.15 * std::f32::consts::PI + 1e-6);
        assert!(first.length() > 0.0);
    }

    #[test]
    fn test_separation_weights_closer_neighbours() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(separation(&a, std::iter::empty(), 40.0), Vec2::ZERO);
        // Out-of-range and coincident neighbours are ignored
        assert_eq!(
            separation(&a, [Vec2::new(100.0, 0.0), Vec2::ZERO], 40.0),
            Vec2::ZERO
        );

        // Close neighbour on the right outweighs a farther one on the left
        let f = separation(&a, [Vec2::new(5.0, 0.0), Vec2::new(-30.0, 0.0)], 40.0);
        assert!(f.x < 0.0);
        assert!((f.length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_cohesion_and_alignment() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        let c = cohesion(&a, [Vec2::new(10.0, 10.0), Vec2::new(10.0, -10.0)]);
        assert!(c.approx_eq(Vec2::new(100.0, 0.0), 1e-3));
        assert_eq!(cohesion(&a, std::iter::empty()), Vec2::ZERO);

        let al = alignment(&a, [Vec2::new(0.0, 20.0), Vec2::new(0.0, 40.0)]);
        assert!(al.approx_eq(Vec2::new(0.0, 100.0), 1e-3));
        assert_eq!(alignment(&a, std::iter::empty()), Vec2::ZERO);
    }

    #[test]
    fn test_avoid_picks_nearest_threat() {
        let a = agent_at(Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0));
        let near = Obstacle::new(40.0, -5.0, 20.0, 30.0); // centre (50, 10)
        let far = Obstacle::new(90.0, -20.0, 20.0, 30.0); // centre (100, -5)
        let f = avoid_obstacles(&a, &[far, near], 100.0);
        let expected = (Vec2::ZERO - near.center()).normalize() * 100.0;
        assert!(f.approx_eq(expected, 1e-3));

        // Nothing ahead
        let behind = Obstacle::new(-80.0, -10.0, 20.0, 20.0);
        assert_eq!(avoid_obstacles(&a, &[behind], 100.0), Vec2::ZERO);
        assert_eq!(avoid_obstacles(&a, &[], 100.0), Vec2::ZERO);
    }

    #[test]
    fn test_avoid_uses_default_heading_when_stationary() {
        let a = agent_at(Vec2::ZERO, Vec2::ZERO);
        let obs = Obstacle::new(90.0, -10.0, 20.0, 20.0);
        assert!(avoid_obstacles(&a, &[obs], 100.0).x < 0.0);
    }

    #[test]
    fn test_contain_within_bounds() {
        let bounds = Bounds::from_size(1000.0, 1000.0);
        let inside = agent_at(Vec2::new(500.0, 500.0), Vec2::new(10.0, 0.0));
        assert_eq!(contain_within_bounds(&inside, &bounds, 50.0), Vec2::ZERO);

        let corner = agent_at(Vec2::new(20.0, 990.0), Vec2::new(-10.0, 0.0));
        let f = contain_within_bounds(&corner, &bounds, 50.0);
        assert!(f.approx_eq(Vec2::new(110.0, -100.0), 1e-4));
    }
}
