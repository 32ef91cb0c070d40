//! Regular enemies: Grunt, Swarm and Ranger
//!
//! All three share one `Enemy` struct. Kind-specific state lives in the
//! `EnemyKind` variant and `compute_steering` dispatches on it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Archetype, Body, EntityId, Projectile};
use super::integrate::{combine, steer};
use super::spatial::{SpatialEntry, SpatialHash};
use super::steering::{
    Agent, alignment, arrive, avoid_obstacles, cohesion, contain_within_bounds, flee, pursue,
    separation,
};
use super::world::{Bounds, Obstacle};
use crate::config::{EnemyStats, RangerTuning};
use crate::consts::CONTACT_COOLDOWN;

mod grunt {
    pub const PREDICTION: f32 = 0.3;
    pub const SEPARATION_RADIUS: f32 = 50.0;
    pub const AVOID_LOOK_AHEAD: f32 = 100.0;
    pub const BOUNDARY_MARGIN: f32 = 80.0;
    /// pursue, separation, avoid, contain
    pub const WEIGHTS: [f32; 4] = [1.0, 0.8, 1.5, 2.0];
}

mod swarm {
    pub const FLOCK_RADIUS: f32 = 80.0;
    pub const SEPARATION_RADIUS: f32 = 30.0;
    pub const ARRIVE_RADIUS: f32 = 120.0;
    pub const AVOID_LOOK_AHEAD: f32 = 60.0;
    pub const BOUNDARY_MARGIN: f32 = 50.0;
    /// cohesion, alignment, separation, arrive, avoid, contain
    pub const WEIGHTS: [f32; 6] = [1.2, 1.0, 1.5, 0.6, 1.2, 2.0];
}

mod ranger {
    pub const SEPARATION_RADIUS: f32 = 40.0;
    pub const ARRIVE_SLOW_RADIUS: f32 = 100.0;
    pub const AVOID_LOOK_AHEAD: f32 = 80.0;
    pub const BOUNDARY_MARGIN: f32 = 80.0;
    /// Shots are allowed out to preferred distance plus this
    pub const RANGE_SLACK: f32 = 150.0;
    /// Projectiles spawn this far outside the body
    pub const MUZZLE_OFFSET: f32 = 5.0;
    /// flee, arrive, separation, avoid, contain
    pub const WEIGHTS: [f32; 5] = [2.0, 1.0, 0.6, 1.5, 2.0];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Idle,
    Pursuing,
    Attacking,
    Stunned,
    Fleeing,
}

/// Kind-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Swarm,
    Ranger { shoot_cooldown: f32 },
}

/// Everything an enemy reads about the world during its update
pub struct SteeringContext<'a> {
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub hash: &'a SpatialHash,
    pub obstacles: &'a [Obstacle],
    pub bounds: &'a Bounds,
    pub ranger: &'a RangerTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub body: Body,
    pub state: EnemyState,
    pub state_timer: f32,
    /// Contact damage
    pub damage: f32,
    pub xp_value: u32,
    pub coin_value: u32,
    pub contact_cooldown: f32,
    /// Serial of the last melee swing that hit this enemy
    pub last_swing: Option<u32>,
    /// Net steering force of the last update, for debug display
    pub steering_force: Vec2,
    /// Rangers only; other kinds never fire
    pub projectiles: Vec<Projectile>,
    /// Set once the death event has been raised
    pub death_reported: bool,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2, stats: &EnemyStats) -> Self {
        Self {
            id,
            kind,
            body: Body::new(pos, stats.radius, stats.max_speed, stats.max_force, stats.hp),
            state: EnemyState::Pursuing,
            state_timer: 0.0,
            damage: stats.damage,
            xp_value: stats.xp_value,
            coin_value: stats.coin_value,
            contact_cooldown: 0.0,
            last_swing: None,
            steering_force: Vec2::ZERO,
            projectiles: Vec::new(),
            death_reported: false,
        }
    }

    pub fn grunt(id: EntityId, pos: Vec2, stats: &EnemyStats) -> Self {
        Self::new(id, EnemyKind::Grunt, pos, stats)
    }

    pub fn swarm(id: EntityId, pos: Vec2, stats: &EnemyStats) -> Self {
        Self::new(id, EnemyKind::Swarm, pos, stats)
    }

    pub fn ranger(id: EntityId, pos: Vec2, stats: &EnemyStats, tuning: &RangerTuning) -> Self {
        let kind = EnemyKind::Ranger {
            shoot_cooldown: tuning.shoot_cooldown,
        };
        Self::new(id, kind, pos, stats)
    }

    pub fn archetype(&self) -> Archetype {
        match self.kind {
            EnemyKind::Grunt => Archetype::Grunt,
            EnemyKind::Swarm => Archetype::Swarm,
            EnemyKind::Ranger { .. } => Archetype::Ranger,
        }
    }

    pub fn spatial_entry(&self) -> SpatialEntry {
        SpatialEntry {
            id: self.id,
            pos: self.body.pos,
            vel: self.body.vel,
            archetype: self.archetype(),
        }
    }

    fn set_state(&mut self, state: EnemyState) {
        if self.state != state {
            log::trace!("{:?} {:?}: {:?} -> {:?}", self.archetype(), self.id, self.state, state);
            self.state = state;
            self.state_timer = 0.0;
        }
    }

    /// One fixed step: timers, steering, integration, then ranged attacks
    pub fn update(&mut self, ctx: &SteeringContext, dt: f32) {
        self.state_timer += dt;
        self.body.tick_timers(dt);
        if self.contact_cooldown > 0.0 {
            self.contact_cooldown -= dt;
        }

        let force = compute_steering(self, ctx);
        self.steering_force = force;
        steer(&mut self.body, force, dt);

        let dist = self.body.distance_to(ctx.player_pos);
        let tuning = ctx.ranger;
        let in_band =
            dist > tuning.flee_distance && dist < tuning.preferred_distance + ranger::RANGE_SLACK;
        let mut fire = false;
        if let EnemyKind::Ranger { shoot_cooldown } = &mut self.kind {
            *shoot_cooldown -= dt;
            if *shoot_cooldown <= 0.0 && in_band {
                *shoot_cooldown = tuning.shoot_cooldown;
                fire = true;
            }
        }
        if fire {
            self.shoot(ctx.player_pos, tuning);
        }

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.projectiles.retain(|p| p.alive);
    }

    fn shoot(&mut self, target: Vec2, tuning: &RangerTuning) {
        let dir = (target - self.body.pos).normalize_or_zero();
        self.projectiles.push(Projectile::new(
            self.body.pos + dir * (self.body.radius + ranger::MUZZLE_OFFSET),
            dir * tuning.projectile_speed,
            tuning.projectile_radius,
            tuning.projectile_damage,
            tuning.projectile_lifetime,
        ));
    }

    /// Contact damage is possible: overlapping and off cooldown
    pub fn can_damage(&self, target: Vec2, target_radius: f32) -> bool {
        self.body.alive
            && self.contact_cooldown <= 0.0
            && self.body.is_near(target, self.body.radius + target_radius)
    }

    pub fn on_contact(&mut self) {
        self.contact_cooldown = CONTACT_COOLDOWN;
    }
}

/// Net steering force for an enemy, by kind
pub fn compute_steering(enemy: &mut Enemy, ctx: &SteeringContext) -> Vec2 {
    let agent = enemy.body.agent();
    let id = enemy.id;
    let (force, state) = match enemy.kind {
        EnemyKind::Grunt => (grunt_steering(&agent, id, ctx), EnemyState::Pursuing),
        EnemyKind::Swarm => (swarm_steering(&agent, id, ctx), EnemyState::Pursuing),
        EnemyKind::Ranger { .. } => ranger_steering(&agent, id, ctx),
    };
    enemy.set_state(state);
    force
}

fn neighbour_positions(neighbours: &[SpatialEntry]) -> impl Iterator<Item = Vec2> + '_ {
    neighbours.iter().map(|e| e.pos)
}

fn grunt_steering(agent: &Agent, id: EntityId, ctx: &SteeringContext) -> Vec2 {
    let neighbours = ctx.hash.query_near(id, agent.pos, grunt::SEPARATION_RADIUS);
    let forces = [
        pursue(agent, ctx.player_pos, ctx.player_vel, grunt::PREDICTION),
        separation(agent, neighbour_positions(&neighbours), grunt::SEPARATION_RADIUS),
        avoid_obstacles(agent, ctx.obstacles, grunt::AVOID_LOOK_AHEAD),
        contain_within_bounds(agent, ctx.bounds, grunt::BOUNDARY_MARGIN),
    ];
    combine(&forces, &grunt::WEIGHTS)
}

fn swarm_steering(agent: &Agent, id: EntityId, ctx: &SteeringContext) -> Vec2 {
    let flockmates: Vec<SpatialEntry> = ctx
        .hash
        .query_near(id, agent.pos, swarm::FLOCK_RADIUS)
        .into_iter()
        .filter(|e| e.archetype == Archetype::Swarm)
        .collect();

    let forces = [
        cohesion(agent, neighbour_positions(&flockmates)),
        alignment(agent, flockmates.iter().map(|e| e.vel)),
        separation(agent, neighbour_positions(&flockmates), swarm::SEPARATION_RADIUS),
        arrive(agent, ctx.player_pos, swarm::ARRIVE_RADIUS),
        avoid_obstacles(agent, ctx.obstacles, swarm::AVOID_LOOK_AHEAD),
        contain_within_bounds(agent, ctx.bounds, swarm::BOUNDARY_MARGIN),
    ];
    combine(&forces, &swarm::WEIGHTS)
}

/// Kite: flee inside the flee distance, otherwise hold the preferred range
fn ranger_steering(agent: &Agent, id: EntityId, ctx: &SteeringContext) -> (Vec2, EnemyState) {
    let tuning = ctx.ranger;
    let dist = agent.pos.distance(ctx.player_pos);

    let (flee_force, arrive_force, state) = if dist < tuning.flee_distance {
        (
            flee(agent, ctx.player_pos, tuning.flee_distance),
            Vec2::ZERO,
            EnemyState::Fleeing,
        )
    } else {
        let to_player = (ctx.player_pos - agent.pos).normalize_or_zero();
        let orbit = ctx.player_pos - to_player * tuning.preferred_distance;
        (
            Vec2::ZERO,
            arrive(agent, orbit, ranger::ARRIVE_SLOW_RADIUS),
            EnemyState::Pursuing,
        )
    };

    let neighbours = ctx.hash.query_near(id, agent.pos, ranger::SEPARATION_RADIUS);
    let forces = [
        flee_force,
        arrive_force,
        separation(agent, neighbour_positions(&neighbours), ranger::SEPARATION_RADIUS),
        avoid_obstacles(agent, ctx.obstacles, ranger::AVOID_LOOK_AHEAD),
        contain_within_bounds(agent, ctx.bounds, ranger::BOUNDARY_MARGIN),
    ];
    (combine(&forces, &ranger::WEIGHTS), state)
}
