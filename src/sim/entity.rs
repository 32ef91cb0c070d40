//! Shared entity building blocks
//!
//! `Body` carries the movable/damageable state every agent has. Concrete
//! agents (player, enemies, boss) embed one and add their own behaviour.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Circle;
use super::steering::Agent;
use crate::consts::HIT_FLASH_DURATION;

/// Stable identity for spatial queries and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The player is always id 0; spawned agents count up from 1
    pub const PLAYER: EntityId = EntityId(0);
}

/// Closed set of agent kinds. Used for steering dispatch and as a render tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Player,
    Grunt,
    Swarm,
    Ranger,
    Boss,
}

/// Kinematic and health state shared by every agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Force accumulator, cleared after every integration step
    pub acc: Vec2,
    pub radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
    pub hit_flash: f32,
    pub invuln: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32, max_speed: f32, max_force: f32, max_hp: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            radius,
            max_speed,
            max_force,
            hp: max_hp,
            max_hp,
            alive: true,
            hit_flash: 0.0,
            invuln: 0.0,
        }
    }

    /// Plain kinematics for steering functions
    #[inline]
    pub fn agent(&self) -> Agent {
        Agent {
            pos: self.pos,
            vel: self.vel,
            radius: self.radius,
            max_speed: self.max_speed,
        }
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Apply damage. Returns false (and changes nothing) while invulnerable
    /// or already dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.alive || self.invuln > 0.0 {
            return false;
        }
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        self.hit_flash = HIT_FLASH_DURATION;
        if self.hp <= 0.0 {
            self.alive = false;
        }
        true
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Count down flash and invulnerability timers
    pub fn tick_timers(&mut self, dt: f32) {
        if self.hit_flash > 0.0 {
            self.hit_flash -= dt;
        }
        if self.invuln > 0.0 {
            self.invuln -= dt;
        }
    }

    #[inline]
    pub fn distance_to(&self, pos: Vec2) -> f32 {
        self.pos.distance(pos)
    }

    #[inline]
    pub fn is_near(&self, pos: Vec2, distance: f32) -> bool {
        self.pos.distance_squared(pos) < distance * distance
    }
}

/// Short-lived bullet owned by whoever fired it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Seconds left before it expires
    pub lifetime: f32,
    pub alive: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, damage: f32, lifetime: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            damage,
            lifetime,
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.alive = false;
        }
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_and_kills() {
        let mut body = Body::new(Vec2::ZERO, 10.0, 100.0, 200.0, 40.0);
        assert!(body.take_damage(25.0));
        assert_eq!(body.hp, 15.0);
        assert!(body.alive);
        assert!(body.hit_flash > 0.0);

        assert!(body.take_damage(100.0));
        assert_eq!(body.hp, 0.0);
        assert!(!body.alive);

        // Dead bodies ignore further hits
        assert!(!body.take_damage(5.0));
    }

    #[test]
    fn test_invulnerable_ignores_damage() {
        let mut body = Body::new(Vec2::ZERO, 10.0, 100.0, 200.0, 40.0);
        body.invuln = 0.2;
        assert!(!body.take_damage(10.0));
        assert_eq!(body.hp, 40.0);
        body.tick_timers(0.25);
        assert!(body.take_damage(10.0));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut body = Body::new(Vec2::ZERO, 10.0, 100.0, 200.0, 40.0);
        body.take_damage(10.0);
        body.heal(50.0);
        assert_eq!(body.hp, 40.0);
    }

    #[test]
    fn test_projectile_expires() {
        let mut p = Projectile::new(Vec2::ZERO, Vec2::new(60.0, 0.0), 5.0, 15.0, 0.04);
        p.update(1.0 / 60.0);
        assert!(p.alive);
        assert!((p.pos.x - 1.0).abs() < 1e-5);
        p.update(1.0 / 60.0);
        p.update(1.0 / 60.0);
        assert!(!p.alive);
    }
}
