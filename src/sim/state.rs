//! Game state and read-only views
//!
//! Everything the simulation mutates lives in `GameState`. Presentation code
//! reads the views and drains the event queue; it never writes back.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::boss::{BossPhase, BossState};
use super::enemy::EnemyState;
use super::entity::{Archetype, Body, EntityId};
use super::events::GameEvent;
use super::player::Player;
use super::spatial::{OccupiedCell, SpatialHash};
use super::spawner::Spawner;
use super::upgrades::Progression;
use super::world::{Bounds, Obstacle, generate_obstacles};
use crate::config::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Level-up offer on screen; simulation suspended
    UpgradeSelect,
    /// Game is paused
    Paused,
    /// Boss defeated
    Victory,
    /// Player died
    GameOver,
}

/// What a renderer needs to draw one agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub archetype: Archetype,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
    pub hit_flash: f32,
    /// Enemies only
    pub state: Option<EnemyState>,
}

impl EntityView {
    fn from_body(id: EntityId, archetype: Archetype, body: &Body, state: Option<EnemyState>) -> Self {
        Self {
            id,
            archetype,
            pos: body.pos,
            vel: body.vel,
            radius: body.radius,
            hp: body.hp,
            max_hp: body.max_hp,
            alive: body.alive,
            hit_flash: body.hit_flash,
            state,
        }
    }
}

/// Boss-specific extras for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BossView {
    pub entity: EntityView,
    pub phase: BossPhase,
    pub state: BossState,
    pub state_timer: f32,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Gameplay randomness (spawns, upgrade offers)
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Debug overlay requested
    pub debug: bool,
    pub bounds: Bounds,
    pub obstacles: Vec<Obstacle>,
    pub player: Player,
    pub spawner: Spawner,
    pub progression: Progression,
    /// Rebuilt at the start of every tick
    pub hash: SpatialHash,
    /// Undrained notifications, oldest first
    pub events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl GameState {
    /// Create a new run. The world seed drives both the obstacle layout and
    /// gameplay randomness.
    pub fn new(tuning: Tuning) -> Self {
        let bounds = Bounds::from_size(tuning.world.width, tuning.world.height);
        let state = Self {
            rng: Pcg32::seed_from_u64(tuning.world.seed),
            time_ticks: 0,
            phase: GamePhase::Playing,
            debug: false,
            bounds,
            obstacles: generate_obstacles(&tuning.world),
            player: Player::new(bounds.center(), &tuning.player),
            spawner: Spawner::new(&tuning),
            progression: Progression::new(&tuning.upgrades),
            hash: SpatialHash::new(tuning.cell_size),
            events: Vec::new(),
            tuning,
        };
        log::info!(
            "New run: seed {}, {} obstacles",
            state.tuning.world.seed,
            state.obstacles.len()
        );
        state
    }

    /// Start over with the same tuning. The layout is regenerated from the
    /// same seed, so it comes out identical.
    pub fn restart(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    /// Take every pending event, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Repopulate the spatial hash from live enemies and the boss
    pub fn rebuild_spatial_hash(&mut self) {
        self.hash.clear();
        for enemy in self.spawner.enemies.iter().filter(|e| e.body.alive) {
            self.hash.insert(enemy.spatial_entry());
        }
        if let Some(boss) = self.spawner.boss.as_ref().filter(|b| b.body.alive) {
            self.hash.insert(boss.spatial_entry());
        }
    }

    /// Non-empty spatial hash cells, for the debug overlay
    pub fn occupied_cells(&self) -> Vec<OccupiedCell> {
        self.hash.occupied_cells()
    }

    /// Player first, then enemies in spawn order, then the boss
    pub fn entity_views(&self) -> Vec<EntityView> {
        let player = EntityView::from_body(EntityId::PLAYER, Archetype::Player, &self.player.body, None);
        let enemies = self
            .spawner
            .enemies
            .iter()
            .filter(|e| e.body.alive)
            .map(|e| EntityView::from_body(e.id, e.archetype(), &e.body, Some(e.state)));
        let boss = self.boss_view().map(|b| b.entity);

        std::iter::once(player).chain(enemies).chain(boss).collect()
    }

    pub fn boss_view(&self) -> Option<BossView> {
        let boss = self.spawner.boss.as_ref().filter(|b| b.body.alive)?;
        Some(BossView {
            entity: EntityView::from_body(boss.id, Archetype::Boss, &boss.body, None),
            phase: boss.phase,
            state: boss.state,
            state_timer: boss.state_timer,
        })
    }
}
