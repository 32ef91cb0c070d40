//! The player-controlled survivor
//!
//! Movement is acceleration/friction driven rather than steered. Attacks fire
//! a projectile and open a short melee swing; dashes trade control for speed
//! and brief invulnerability.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arc::Sector;
use super::collision::separate_circle_rect;
use super::entity::{Body, Projectile};
use super::world::{Bounds, Obstacle};
use crate::config::PlayerTuning;
use crate::math::Vec2Ext;

/// Dash along velocity only when moving faster than this
const DASH_MIN_SPEED: f32 = 10.0;

/// Player intents for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// Zero or unit length
    pub move_intent: Vec2,
    /// World-space aim point
    pub aim_target: Option<Vec2>,
    pub attack: bool,
    pub dash: bool,
}

/// An active melee swing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub direction: Vec2,
    /// Seconds until the swing closes
    pub remaining: f32,
    /// Distinguishes swings so each target is hit once per swing
    pub serial: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Current stats, including applied upgrades
    pub stats: PlayerTuning,
    /// Flat damage added by upgrades to both swing and projectile
    pub bonus_damage: f32,

    pub aim: Vec2,
    pub dash_dir: Vec2,
    pub dash_timer: f32,
    pub dash_cooldown_timer: f32,
    pub attack_cooldown_timer: f32,
    pub swing: Option<Swing>,
    swing_serial: u32,

    pub xp: u32,
    pub level: u32,
    pub coins: u32,

    pub projectiles: Vec<Projectile>,
}

impl Player {
    pub fn new(pos: Vec2, stats: &PlayerTuning) -> Self {
        Self {
            body: Body::new(pos, stats.radius, stats.max_speed, stats.acceleration, stats.max_hp),
            stats: stats.clone(),
            bonus_damage: 0.0,
            aim: Vec2::X,
            dash_dir: Vec2::X,
            dash_timer: 0.0,
            dash_cooldown_timer: 0.0,
            attack_cooldown_timer: 0.0,
            swing: None,
            swing_serial: 0,
            xp: 0,
            level: 1,
            coins: 0,
            projectiles: Vec::new(),
        }
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Velocity bound for this tick: dash speed while dashing
    pub fn speed_limit(&self) -> f32 {
        if self.is_dashing() {
            self.stats.dash_speed.max(self.body.max_speed)
        } else {
            self.body.max_speed
        }
    }

    pub fn melee_damage(&self) -> f32 {
        self.stats.attack_damage + self.bonus_damage
    }

    pub fn projectile_damage(&self) -> f32 {
        self.stats.projectile_damage + self.bonus_damage
    }

    /// Geometry of the active swing, following the player's position
    pub fn swing_sector(&self) -> Option<(Sector, u32)> {
        self.swing.map(|swing| {
            (
                Sector::new(
                    self.body.pos,
                    swing.direction,
                    self.stats.attack_range,
                    self.stats.attack_arc,
                ),
                swing.serial,
            )
        })
    }

    pub fn update(&mut self, input: &PlayerInput, dt: f32) {
        self.tick_timers(dt);

        if let Some(target) = input.aim_target {
            let to_target = target - self.body.pos;
            if !to_target.is_zero() {
                self.aim = to_target.normalize();
            }
        }

        if input.dash {
            self.start_dash();
        }
        if input.attack {
            self.start_attack();
        }

        if self.is_dashing() {
            self.body.vel = self.dash_dir * self.stats.dash_speed;
        } else {
            let intent = input.move_intent.normalize_or_zero();
            if intent.is_zero() {
                self.body.vel *= (1.0 - self.stats.friction * dt).max(0.0);
            } else {
                self.body.vel += intent * (self.stats.acceleration * dt);
            }
            self.body.vel.limit_mut(self.body.max_speed);
        }
        self.body.pos += self.body.vel * dt;

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.projectiles.retain(|p| p.alive);
    }

    fn tick_timers(&mut self, dt: f32) {
        self.body.tick_timers(dt);
        if self.dash_timer > 0.0 {
            self.dash_timer -= dt;
        }
        if self.dash_cooldown_timer > 0.0 {
            self.dash_cooldown_timer -= dt;
        }
        if self.attack_cooldown_timer > 0.0 {
            self.attack_cooldown_timer -= dt;
        }
        if let Some(swing) = &mut self.swing {
            swing.remaining -= dt;
            if swing.remaining <= 0.0 {
                self.swing = None;
            }
        }
    }

    /// Fire a projectile along the aim and open a melee swing.
    /// Returns false while on cooldown.
    pub fn start_attack(&mut self) -> bool {
        if self.attack_cooldown_timer > 0.0 {
            return false;
        }
        self.attack_cooldown_timer = self.stats.attack_cooldown;

        self.swing_serial = self.swing_serial.wrapping_add(1);
        self.swing = Some(Swing {
            direction: self.aim,
            remaining: self.stats.attack_duration,
            serial: self.swing_serial,
        });

        self.projectiles.push(Projectile::new(
            self.body.pos + self.aim * self.body.radius,
            self.aim * self.stats.projectile_speed,
            self.stats.projectile_radius,
            self.projectile_damage(),
            self.stats.projectile_lifetime,
        ));
        true
    }

    /// Dash along the current velocity, or the aim when nearly still.
    /// Returns false while dashing or on cooldown.
    pub fn start_dash(&mut self) -> bool {
        if self.is_dashing() || self.dash_cooldown_timer > 0.0 {
            return false;
        }
        self.dash_dir = if self.body.vel.length() > DASH_MIN_SPEED {
            self.body.vel.normalize()
        } else {
            self.aim
        };
        self.dash_timer = self.stats.dash_duration;
        self.dash_cooldown_timer = self.stats.dash_cooldown;
        self.body.invuln = self.stats.dash_duration;
        true
    }

    /// Returns true if the hit landed; a landed hit grants invulnerability
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.body.take_damage(amount) {
            return false;
        }
        self.body.invuln = self.stats.invuln_duration;
        true
    }

    pub fn gain(&mut self, xp: u32, coins: u32) {
        self.xp += xp;
        self.coins += coins;
    }

    /// Keep the player inside the arena and out of obstacles. Velocity into a
    /// blocking surface is removed.
    pub fn contain(&mut self, bounds: &Bounds, obstacles: &[Obstacle]) {
        self.body.pos = bounds.clamp_circle(self.body.pos, self.body.radius);

        let mut circle = self.body.circle();
        for obstacle in obstacles {
            if let Some(contact) = separate_circle_rect(&mut circle, obstacle) {
                let into = self.body.vel.dot(contact.normal);
                if into < 0.0 {
                    self.body.vel -= contact.normal * into;
                }
            }
        }
        self.body.pos = circle.pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(1200.0, 1200.0), &PlayerTuning::default())
    }

    #[test]
    fn test_accelerates_along_intent() {
        let mut p = player();
        let input = PlayerInput {
            move_intent: Vec2::X,
            ..Default::default()
        };
        p.update(&input, 1.0 / 60.0);
        assert!((p.body.vel.x - 30.0).abs() < 1e-4);
        assert_eq!(p.body.vel.y, 0.0);
        assert!((p.body.pos.x - 1200.5).abs() < 1e-3);
    }

    #[test]
    fn test_friction_and_speed_cap() {
        let mut p = player();
        let input = PlayerInput {
            move_intent: Vec2::X,
            ..Default::default()
        };
        for _ in 0..120 {
            p.update(&input, 1.0 / 60.0);
        }
        assert!((p.body.vel.length() - p.stats.max_speed).abs() < 1e-3);

        let idle = PlayerInput::default();
        p.update(&idle, 1.0 / 60.0);
        assert!(p.body.vel.x < p.stats.max_speed);
        for _ in 0..240 {
            p.update(&idle, 1.0 / 60.0);
        }
        assert!(p.body.vel.length() < 1.0);
    }

    #[test]
    fn test_attack_fires_projectile_and_swing() {
        let mut p = player();
        let input = PlayerInput {
            aim_target: Some(Vec2::new(1200.0, 1300.0)),
            attack: true,
            ..Default::default()
        };
        p.update(&input, 1.0 / 60.0);
        assert_eq!(p.projectiles.len(), 1);
        assert!(p.projectiles[0].vel.approx_eq(Vec2::new(0.0, 600.0), 1e-3));
        assert_eq!(p.projectiles[0].damage, 15.0);
        let (sector, serial) = p.swing_sector().expect("swing open");
        assert_eq!(serial, 1);
        assert!(sector.contains_point(Vec2::new(1200.0, 1240.0)));

        // Cooldown blocks a second shot
        p.update(&input, 1.0 / 60.0);
        assert_eq!(p.projectiles.len(), 1);

        // Swing closes after its duration
        for _ in 0..15 {
            p.update(&PlayerInput::default(), 1.0 / 60.0);
        }
        assert!(p.swing.is_none());
    }

    #[test]
    fn test_dash_overrides_velocity_and_grants_invuln() {
        let mut p = player();
        p.body.vel = Vec2::new(0.0, -100.0);
        let input = PlayerInput {
            dash: true,
            ..Default::default()
        };
        p.update(&input, 1.0 / 60.0);
        assert!(p.is_dashing());
        assert!(p.body.vel.approx_eq(Vec2::new(0.0, -650.0), 1e-3));
        assert!(p.body.vel.length() <= p.speed_limit() + 1e-3);
        assert!(!p.take_damage(10.0));
        assert_eq!(p.body.hp, 100.0);

        // Second request mid-dash is ignored
        assert!(!p.start_dash());
    }

    #[test]
    fn test_damage_grants_invulnerability() {
        let mut p = player();
        assert!(p.take_damage(30.0));
        assert_eq!(p.body.hp, 70.0);
        assert!(!p.take_damage(30.0));
        for _ in 0..31 {
            p.update(&PlayerInput::default(), 1.0 / 60.0);
        }
        assert!(p.take_damage(80.0));
        assert_eq!(p.body.hp, 0.0);
        assert!(!p.body.alive);
    }

    #[test]
    fn test_contain_pushes_out_and_kills_inward_velocity() {
        let mut p = player();
        let bounds = Bounds::from_size(2400.0, 2400.0);
        let wall = Obstacle::new(1210.0, 1100.0, 50.0, 200.0);
        p.body.vel = Vec2::new(200.0, 50.0);
        p.contain(&bounds, std::slice::from_ref(&wall));
        assert!((p.body.pos.x - 1196.0).abs() < 1e-3);
        assert_eq!(p.body.vel.x, 0.0);
        assert_eq!(p.body.vel.y, 50.0);

        p.body.pos = Vec2::new(-50.0, 3000.0);
        p.contain(&bounds, &[]);
        assert_eq!(p.body.pos, Vec2::new(14.0, 2386.0));
    }
}
