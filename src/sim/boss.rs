//! Two-phase boss
//!
//! Phase 1 pursues and periodically summons swarm adds. Below the phase-2
//! threshold it speeds up and alternates between charges (when far) and
//! slams (when close). The phase change is one-way.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::SteeringContext;
use super::entity::{Archetype, Body, EntityId};
use super::integrate::{combine, steer};
use super::spatial::SpatialEntry;
use super::steering::{avoid_obstacles, contain_within_bounds, pursue};
use crate::config::{BossTuning, EnemyStats};
use crate::consts::CONTACT_COOLDOWN;

const PREDICTION: f32 = 0.5;
const AVOID_LOOK_AHEAD: f32 = 150.0;
const BOUNDARY_MARGIN: f32 = 100.0;
/// pursue, avoid, contain
const WEIGHTS: [f32; 3] = [1.0, 2.0, 3.0];

/// Charge only when the player is farther than this
const CHARGE_MIN_DISTANCE: f32 = 200.0;
/// Slam only when the player is closer than this
const SLAM_MAX_DISTANCE: f32 = 150.0;
/// The slam lands once its countdown drops below this
const SLAM_HIT_AT: f32 = 0.3;
/// Seconds spent winding up before adds appear
const SPAWN_DWELL: f32 = 0.5;
/// Per-tick velocity damping while summoning
const SPAWN_DAMPING: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    Idle,
    Pursuing,
    Charging,
    Slamming,
    Spawning,
}

/// Side effects the boss asks the orchestrator to carry out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossAction {
    PhaseChanged(BossPhase),
    Slam { pos: Vec2, radius: f32, damage: f32 },
    SpawnAdds { pos: Vec2, count: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub body: Body,
    pub tuning: BossTuning,
    base_max_speed: f32,
    /// Contact damage
    pub damage: f32,
    pub xp_value: u32,
    pub coin_value: u32,

    pub phase: BossPhase,
    pub state: BossState,
    pub state_timer: f32,

    pub spawn_timer: f32,
    pub charge_cooldown: f32,
    pub slam_cooldown: f32,
    pub charge_dir: Vec2,
    pub charge_timer: f32,
    pub slam_timer: f32,
    slam_landed: bool,

    pub contact_cooldown: f32,
    pub last_swing: Option<u32>,
    pub steering_force: Vec2,
    pub death_reported: bool,
}

impl Boss {
    pub fn new(id: EntityId, pos: Vec2, stats: &EnemyStats, tuning: &BossTuning) -> Self {
        Self {
            id,
            body: Body::new(pos, stats.radius, stats.max_speed, stats.max_force, stats.hp),
            tuning: tuning.clone(),
            base_max_speed: stats.max_speed,
            damage: stats.damage,
            xp_value: stats.xp_value,
            coin_value: stats.coin_value,
            phase: BossPhase::One,
            state: BossState::Pursuing,
            state_timer: 0.0,
            spawn_timer: tuning.spawn_interval,
            charge_cooldown: tuning.charge_cooldown,
            slam_cooldown: tuning.slam_cooldown,
            charge_dir: Vec2::ZERO,
            charge_timer: 0.0,
            slam_timer: 0.0,
            slam_landed: false,
            contact_cooldown: 0.0,
            last_swing: None,
            steering_force: Vec2::ZERO,
            death_reported: false,
        }
    }

    pub fn spatial_entry(&self) -> SpatialEntry {
        SpatialEntry {
            id: self.id,
            pos: self.body.pos,
            vel: self.body.vel,
            archetype: Archetype::Boss,
        }
    }

    /// Velocity bound for this tick: charge speed while charging
    pub fn speed_limit(&self) -> f32 {
        if self.state == BossState::Charging {
            self.tuning.charge_speed.max(self.body.max_speed)
        } else {
            self.body.max_speed
        }
    }

    fn set_state(&mut self, state: BossState) {
        log::debug!("Boss {:?} -> {:?}", self.state, state);
        self.state = state;
        self.state_timer = 0.0;
    }

    pub fn update(&mut self, ctx: &SteeringContext, dt: f32) -> Vec<BossAction> {
        let mut actions = Vec::new();
        self.state_timer += dt;
        self.body.tick_timers(dt);
        if self.contact_cooldown > 0.0 {
            self.contact_cooldown -= dt;
        }

        if self.phase == BossPhase::One
            && self.body.hp <= self.body.max_hp * self.tuning.phase2_threshold
        {
            self.phase = BossPhase::Two;
            self.body.max_speed = self.base_max_speed * self.tuning.phase2_speed_mult;
            actions.push(BossAction::PhaseChanged(BossPhase::Two));
        }

        match self.state {
            BossState::Idle => {}
            BossState::Pursuing => self.update_pursuing(ctx, dt),
            BossState::Charging => self.update_charging(dt),
            BossState::Slamming => {
                if let Some(slam) = self.update_slamming(dt) {
                    actions.push(slam);
                }
            }
            BossState::Spawning => {
                if let Some(spawn) = self.update_spawning(dt) {
                    actions.push(spawn);
                }
            }
        }

        if self.charge_cooldown > 0.0 {
            self.charge_cooldown -= dt;
        }
        if self.slam_cooldown > 0.0 {
            self.slam_cooldown -= dt;
        }
        actions
    }

    fn update_pursuing(&mut self, ctx: &SteeringContext, dt: f32) {
        let agent = self.body.agent();
        let forces = [
            pursue(&agent, ctx.player_pos, ctx.player_vel, PREDICTION),
            avoid_obstacles(&agent, ctx.obstacles, AVOID_LOOK_AHEAD),
            contain_within_bounds(&agent, ctx.bounds, BOUNDARY_MARGIN),
        ];
        let force = combine(&forces, &WEIGHTS);
        self.steering_force = force;
        steer(&mut self.body, force, dt);

        match self.phase {
            BossPhase::One => {
                self.spawn_timer -= dt;
                if self.spawn_timer <= 0.0 {
                    self.set_state(BossState::Spawning);
                }
            }
            BossPhase::Two => {
                let dist = self.body.distance_to(ctx.player_pos);
                if self.charge_cooldown <= 0.0 && dist > CHARGE_MIN_DISTANCE {
                    self.charge_dir = (ctx.player_pos - self.body.pos).normalize_or_zero();
                    self.charge_timer = self.tuning.charge_duration;
                    self.set_state(BossState::Charging);
                } else if self.slam_cooldown <= 0.0 && dist < SLAM_MAX_DISTANCE {
                    self.slam_timer = self.tuning.slam_duration;
                    self.slam_landed = false;
                    self.set_state(BossState::Slamming);
                }
            }
        }
    }

    /// Straight line along the direction captured at entry
    fn update_charging(&mut self, dt: f32) {
        self.charge_timer -= dt;
        self.body.vel = self.charge_dir * self.tuning.charge_speed;
        self.body.pos += self.body.vel * dt;
        if self.charge_timer <= 0.0 {
            self.charge_cooldown = self.tuning.charge_cooldown;
            self.set_state(BossState::Pursuing);
        }
    }

    fn update_slamming(&mut self, dt: f32) -> Option<BossAction> {
        self.slam_timer -= dt;
        self.body.vel = Vec2::ZERO;

        let mut slam = None;
        if !self.slam_landed && self.slam_timer < SLAM_HIT_AT {
            self.slam_landed = true;
            slam = Some(BossAction::Slam {
                pos: self.body.pos,
                radius: self.tuning.slam_radius,
                damage: self.tuning.slam_damage,
            });
        }

        if self.slam_timer <= 0.0 {
            self.slam_cooldown = self.tuning.slam_cooldown;
            self.set_state(BossState::Pursuing);
        }
        slam
    }

    fn update_spawning(&mut self, dt: f32) -> Option<BossAction> {
        self.body.vel *= SPAWN_DAMPING;
        self.body.pos += self.body.vel * dt;

        if self.state_timer <= SPAWN_DWELL {
            return None;
        }
        self.spawn_timer = self.tuning.spawn_interval;
        self.set_state(BossState::Pursuing);
        Some(BossAction::SpawnAdds {
            pos: self.body.pos,
            count: self.tuning.spawn_count,
        })
    }

    pub fn can_damage(&self, target: Vec2, target_radius: f32) -> bool {
        self.body.alive
            && self.contact_cooldown <= 0.0
            && self.body.is_near(target, self.body.radius + target_radius)
    }

    pub fn on_contact(&mut self) {
        self.contact_cooldown = CONTACT_COOLDOWN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RangerTuning;
    use crate::math::Vec2Ext;
    use crate::sim::spatial::SpatialHash;
    use crate::sim::world::Bounds;

    const DT: f32 = 1.0 / 60.0;

    struct World {
        hash: SpatialHash,
        bounds: Bounds,
        ranger: RangerTuning,
    }

    impl World {
        fn new() -> Self {
            Self {
                hash: SpatialHash::new(150.0),
                bounds: Bounds::from_size(2400.0, 2400.0),
                ranger: RangerTuning::default(),
            }
        }

        fn ctx(&self, player_pos: Vec2) -> SteeringContext<'_> {
            SteeringContext {
                player_pos,
                player_vel: Vec2::ZERO,
                hash: &self.hash,
                obstacles: &[],
                bounds: &self.bounds,
                ranger: &self.ranger,
            }
        }
    }

    fn boss() -> Boss {
        Boss::new(
            EntityId(1),
            Vec2::new(1200.0, 1200.0),
            &EnemyStats::boss(),
            &BossTuning::default(),
        )
    }

    #[test]
    fn test_phase_two_entered_once() {
        let world = World::new();
        let ctx = world.ctx(Vec2::new(1200.0, 2000.0));
        let mut boss = boss();
        let base = boss.body.max_speed;

        boss.body.take_damage(300.0);
        assert!(boss.update(&ctx, DT).is_empty());
        assert_eq!(boss.phase, BossPhase::One);

        boss.body.take_damage(20.0);
        let actions = boss.update(&ctx, DT);
        assert_eq!(actions, vec![BossAction::PhaseChanged(BossPhase::Two)]);
        assert_eq!(boss.phase, BossPhase::Two);
        assert_eq!(boss.body.max_speed, base * 1.5);

        boss.body.take_damage(300.0);
        let actions = boss.update(&ctx, DT);
        assert!(!actions.contains(&BossAction::PhaseChanged(BossPhase::Two)));
        assert_eq!(boss.phase, BossPhase::Two);
        assert_eq!(boss.body.max_speed, base * 1.5);
    }

    #[test]
    fn test_phase_one_summons_adds() {
        let world = World::new();
        let ctx = world.ctx(Vec2::new(1200.0, 2000.0));
        let mut boss = boss();

        let mut summons = 0;
        let mut saw_spawning = false;
        for _ in 0..400 {
            saw_spawning |= boss.state == BossState::Spawning;
            for action in boss.update(&ctx, DT) {
                if let BossAction::SpawnAdds { count, .. } = action {
                    assert_eq!(count, 4);
                    summons += 1;
                }
            }
            assert!(boss.body.vel.length() <= boss.speed_limit() + 1e-3);
        }
        assert!(saw_spawning);
        assert_eq!(summons, 1);
        assert_eq!(boss.state, BossState::Pursuing);
    }

    #[test]
    fn test_charge_keeps_entry_direction() {
        let world = World::new();
        let mut boss = boss();
        boss.phase = BossPhase::Two;
        boss.charge_cooldown = 0.0;

        boss.update(&world.ctx(Vec2::new(1700.0, 1200.0)), DT);
        assert_eq!(boss.state, BossState::Charging);
        assert!(boss.charge_dir.approx_eq(Vec2::X, 1e-6));

        // Player moves; the charge does not re-aim
        let ctx = world.ctx(Vec2::new(1200.0, 600.0));
        boss.update(&ctx, DT);
        assert!((boss.body.vel - Vec2::new(450.0, 0.0)).length() < 1e-3);
        assert!(boss.body.vel.length() <= boss.speed_limit() + 1e-3);

        for _ in 0..40 {
            boss.update(&ctx, DT);
        }
        assert_eq!(boss.state, BossState::Pursuing);
        assert!(boss.charge_cooldown > 3.0);
    }

    #[test]
    fn test_slam_fires_exactly_once() {
        let world = World::new();
        let ctx = world.ctx(Vec2::new(1300.0, 1200.0));
        let mut boss = boss();
        boss.phase = BossPhase::Two;
        boss.slam_cooldown = 0.0;

        boss.update(&ctx, DT);
        assert_eq!(boss.state, BossState::Slamming);

        let mut slams = Vec::new();
        for _ in 0..40 {
            for action in boss.update(&ctx, DT) {
                if let BossAction::Slam { radius, damage, .. } = action {
                    slams.push((radius, damage));
                }
            }
            if boss.state == BossState::Slamming {
                assert_eq!(boss.body.vel, Vec2::ZERO);
            }
        }
        assert_eq!(slams, vec![(150.0, 35.0)]);
        assert_eq!(boss.state, BossState::Pursuing);
        assert!(boss.slam_cooldown > 5.0);
    }
}
