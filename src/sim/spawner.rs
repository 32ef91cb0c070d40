//! Wave orchestration
//!
//! The spawner owns every enemy and the boss. Its state machine walks
//! through the configured waves, pauses between them, spawns the boss once
//! all waves are cleared and reports victory when the boss falls.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossAction};
use super::enemy::{Enemy, SteeringContext};
use super::entity::EntityId;
use super::events::GameEvent;
use crate::config::Tuning;

const SWARM_CHANCE: f32 = 0.5;
const RANGER_CHANCE_PER_WAVE: f32 = 0.05;
const RANGER_CHANCE_MAX: f32 = 0.3;
/// Rangers never appear before this wave
const RANGER_MIN_WAVE: u32 = 2;
/// Boss adds appear on a ring this far from the boss
const ADD_RING_RADIUS: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnerState {
    Waves,
    WaveComplete,
    BossSpawned,
    Victory,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    tuning: Tuning,
    pub state: SpawnerState,
    /// Waves spawned so far (the current wave, 1-based)
    pub wave: u32,
    pub total_waves: u32,
    pub delay_timer: f32,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    /// Ids 1.. are handed out in spawn order; 0 is the player
    next_id: u32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tuning: tuning.clone(),
            state: SpawnerState::Waves,
            wave: 0,
            total_waves: tuning.spawner.wave_count,
            delay_timer: 0.0,
            enemies: Vec::new(),
            boss: None,
            next_id: 1,
        }
    }

    /// Back to the start of a run
    pub fn reset(&mut self) {
        self.state = SpawnerState::Waves;
        self.wave = 0;
        self.delay_timer = 0.0;
        self.enemies.clear();
        self.boss = None;
        self.next_id = 1;
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn waves_exhausted(&self) -> bool {
        self.wave >= self.total_waves
    }

    /// Live enemies plus the boss if it is alive
    pub fn enemy_count(&self) -> usize {
        let boss = self.boss.as_ref().is_some_and(|b| b.body.alive);
        self.enemies.iter().filter(|e| e.body.alive).count() + usize::from(boss)
    }

    pub fn game_over(&mut self) {
        if self.state != SpawnerState::GameOver {
            log::debug!("Spawner {:?} -> GameOver", self.state);
            self.state = SpawnerState::GameOver;
        }
    }

    fn set_state(&mut self, state: SpawnerState) {
        log::debug!("Spawner {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Advance the wave machine, then update every enemy and the boss
    pub fn update(
        &mut self,
        ctx: &SteeringContext,
        dt: f32,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        // Deaths were reported by last tick's combat pass
        self.enemies.retain(|e| e.body.alive || !e.death_reported);

        match self.state {
            SpawnerState::Waves => {
                if self.enemies.is_empty() {
                    if self.waves_exhausted() {
                        self.delay_timer = self.tuning.spawner.boss_delay;
                        self.set_state(SpawnerState::WaveComplete);
                        log::info!("All waves cleared, boss incoming");
                    } else if self.wave == 0 {
                        if self.tuning.spawner.auto_start {
                            self.spawn_wave(rng, events);
                        }
                    } else {
                        self.delay_timer = self.tuning.spawner.wave_delay;
                        self.set_state(SpawnerState::WaveComplete);
                    }
                }
            }
            SpawnerState::WaveComplete => {
                self.delay_timer -= dt;
                if self.delay_timer <= 0.0 {
                    if self.waves_exhausted() {
                        self.spawn_boss(events);
                    } else {
                        self.spawn_wave(rng, events);
                        self.set_state(SpawnerState::Waves);
                    }
                }
            }
            SpawnerState::BossSpawned => {
                if self.boss.as_ref().is_some_and(|b| !b.body.alive) {
                    self.set_state(SpawnerState::Victory);
                    events.push(GameEvent::Victory);
                    log::info!("Victory after {} waves", self.wave);
                }
            }
            SpawnerState::Victory | SpawnerState::GameOver => {}
        }

        for enemy in self.enemies.iter_mut().filter(|e| e.body.alive) {
            enemy.update(ctx, dt);
        }

        let actions = match &mut self.boss {
            Some(boss) if boss.body.alive => boss.update(ctx, dt),
            _ => Vec::new(),
        };
        for action in actions {
            self.handle_boss_action(action, events);
        }
    }

    fn handle_boss_action(&mut self, action: BossAction, events: &mut Vec<GameEvent>) {
        match action {
            BossAction::PhaseChanged(phase) => {
                log::info!("Boss entered phase {:?}", phase);
                events.push(GameEvent::BossPhaseChanged { phase });
            }
            BossAction::Slam { pos, radius, damage } => {
                events.push(GameEvent::BossSlam { pos, radius, damage });
            }
            BossAction::SpawnAdds { pos, count } => {
                self.spawn_adds(pos, count);
                events.push(GameEvent::BossSummoned { pos, count });
            }
        }
    }

    /// Evenly spaced swarm minions around `pos`
    fn spawn_adds(&mut self, pos: Vec2, count: u32) {
        let step = std::f32::consts::TAU / count.max(1) as f32;
        for i in 0..count {
            let offset = Vec2::from_angle(step * i as f32) * ADD_RING_RADIUS;
            let id = self.next_entity_id();
            let add = Enemy::swarm(id, pos + offset, &self.tuning.swarm);
            self.enemies.push(add);
        }
    }

    /// Start the next wave: `base + wave * increase` enemies along the edges
    pub fn spawn_wave(&mut self, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        self.wave += 1;
        let spawner = &self.tuning.spawner;
        let count = spawner.base_enemies_per_wave + self.wave * spawner.enemies_per_wave_increase;

        for _ in 0..count {
            let pos = self.edge_spawn_position(rng);
            let enemy = self.create_random_enemy(pos, rng);
            self.enemies.push(enemy);
        }

        log::info!("Wave {}/{}: {} enemies", self.wave, self.total_waves, count);
        events.push(GameEvent::WaveAdvanced {
            wave: self.wave,
            enemies: count,
        });
    }

    fn create_random_enemy(&mut self, pos: Vec2, rng: &mut impl Rng) -> Enemy {
        let id = self.next_entity_id();
        let roll = rng.random::<f32>();
        let ranger_chance = (self.wave as f32 * RANGER_CHANCE_PER_WAVE).min(RANGER_CHANCE_MAX);

        if roll < ranger_chance && self.wave >= RANGER_MIN_WAVE {
            Enemy::ranger(id, pos, &self.tuning.ranger, &self.tuning.ranger_attack)
        } else if roll < ranger_chance + SWARM_CHANCE {
            Enemy::swarm(id, pos, &self.tuning.swarm)
        } else {
            Enemy::grunt(id, pos, &self.tuning.grunt)
        }
    }

    /// Uniform point on one of the four arena edges, inset by the margin
    fn edge_spawn_position(&self, rng: &mut impl Rng) -> Vec2 {
        let margin = self.tuning.spawner.spawn_margin;
        let (w, h) = (self.tuning.world.width, self.tuning.world.height);
        let along_x = margin + rng.random::<f32>() * (w - margin * 2.0);
        let along_y = margin + rng.random::<f32>() * (h - margin * 2.0);

        match rng.random_range(0..4) {
            0 => Vec2::new(along_x, margin),
            1 => Vec2::new(w - margin, along_y),
            2 => Vec2::new(along_x, h - margin),
            _ => Vec2::new(margin, along_y),
        }
    }

    fn spawn_boss(&mut self, events: &mut Vec<GameEvent>) {
        let id = self.next_entity_id();
        let attack = &self.tuning.boss_attack;
        let pos = Vec2::new(attack.spawn_x, attack.spawn_y);
        self.boss = Some(Boss::new(id, pos, &self.tuning.boss, attack));
        self.set_state(SpawnerState::BossSpawned);
        log::info!("Boss spawned at ({:.0}, {:.0})", pos.x, pos.y);
        events.push(GameEvent::BossSpawned { id, pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Archetype;
    use crate::sim::spatial::SpatialHash;
    use crate::sim::world::Bounds;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn quick_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.spawner.wave_count = 3;
        tuning.spawner.base_enemies_per_wave = 2;
        tuning.spawner.enemies_per_wave_increase = 1;
        tuning.spawner.wave_delay = 0.1;
        tuning.spawner.boss_delay = 0.1;
        tuning
    }

    struct Harness {
        spawner: Spawner,
        hash: SpatialHash,
        bounds: Bounds,
        tuning: Tuning,
        rng: Pcg32,
        events: Vec<GameEvent>,
    }

    impl Harness {
        fn new(tuning: Tuning) -> Self {
            Self {
                spawner: Spawner::new(&tuning),
                hash: SpatialHash::new(tuning.cell_size),
                bounds: Bounds::from_size(tuning.world.width, tuning.world.height),
                tuning,
                rng: Pcg32::seed_from_u64(42),
                events: Vec::new(),
            }
        }

        fn step(&mut self) {
            let ctx = SteeringContext {
                player_pos: Vec2::new(600.0, 600.0),
                player_vel: Vec2::ZERO,
                hash: &self.hash,
                obstacles: &[],
                bounds: &self.bounds,
                ranger: &self.tuning.ranger_attack,
            };
            self.spawner.update(&ctx, DT, &mut self.rng, &mut self.events);
        }

        fn kill_all_enemies(&mut self) {
            for enemy in &mut self.spawner.enemies {
                enemy.body.alive = false;
                enemy.death_reported = true;
            }
        }
    }

    #[test]
    fn test_first_wave_spawns_immediately() {
        let mut h = Harness::new(Tuning::default());
        h.step();
        assert_eq!(h.spawner.wave, 1);
        assert_eq!(h.spawner.enemies.len(), 12);
        assert_eq!(h.events, vec![GameEvent::WaveAdvanced { wave: 1, enemies: 12 }]);

        // Wave 1 never rolls rangers; everyone starts on an edge
        let margin = h.tuning.spawner.spawn_margin;
        for enemy in &h.spawner.enemies {
            assert_ne!(enemy.archetype(), Archetype::Ranger);
            let p = enemy.body.pos;
            let on_edge = (p.x - margin).abs() < 5.0
                || (p.x - (2400.0 - margin)).abs() < 5.0
                || (p.y - margin).abs() < 5.0
                || (p.y - (2400.0 - margin)).abs() < 5.0;
            assert!(on_edge, "{p:?} not on an edge");
        }
    }

    #[test]
    fn test_auto_start_disabled_stays_idle() {
        let mut tuning = Tuning::default();
        tuning.spawner.auto_start = false;
        let mut h = Harness::new(tuning);
        for _ in 0..10 {
            h.step();
        }
        assert_eq!(h.spawner.state, SpawnerState::Waves);
        assert_eq!(h.spawner.wave, 0);
        assert!(h.spawner.enemies.is_empty());
    }

    #[test]
    fn test_waves_then_boss_then_victory() {
        let mut h = Harness::new(quick_tuning());
        let mut cleared = 0;

        h.step();
        while h.spawner.boss.is_none() {
            assert!(cleared <= 3, "boss should follow the third clear");
            let wave = h.spawner.wave;
            assert_eq!(h.spawner.enemies.len() as u32, 2 + wave);
            h.kill_all_enemies();
            cleared += 1;
            // Delay, then either the next wave or the boss
            for _ in 0..20 {
                h.step();
                if h.spawner.wave != wave || h.spawner.boss.is_some() {
                    break;
                }
            }
        }

        assert_eq!(cleared, 3);
        assert_eq!(h.spawner.state, SpawnerState::BossSpawned);
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::BossSpawned { .. })));

        if let Some(boss) = &mut h.spawner.boss {
            boss.body.take_damage(10_000.0);
        }
        h.step();
        assert_eq!(h.spawner.state, SpawnerState::Victory);
        assert_eq!(h.events.last(), Some(&GameEvent::Victory));

        for _ in 0..30 {
            h.step();
        }
        assert_eq!(h.spawner.state, SpawnerState::Victory);
        assert_eq!(h.events.iter().filter(|e| **e == GameEvent::Victory).count(), 1);
    }

    #[test]
    fn test_boss_adds_join_enemy_list() {
        let mut h = Harness::new(quick_tuning());
        let mut events = Vec::new();
        h.spawner.spawn_boss(&mut events);
        let pos = h.spawner.boss.as_ref().map(|b| b.body.pos).unwrap_or_default();

        h.spawner
            .handle_boss_action(BossAction::SpawnAdds { pos, count: 4 }, &mut events);
        assert_eq!(h.spawner.enemies.len(), 4);
        for add in &h.spawner.enemies {
            assert_eq!(add.archetype(), Archetype::Swarm);
            assert!((add.body.pos.distance(pos) - ADD_RING_RADIUS).abs() < 1e-3);
        }
        assert_eq!(h.spawner.enemy_count(), 5);
    }

    fn ranger_share(h: &mut Harness, wave: u32, rolls: usize) -> f32 {
        h.spawner.wave = wave;
        let rangers = (0..rolls)
            .map(|_| h.spawner.create_random_enemy(Vec2::ZERO, &mut h.rng))
            .filter(|e| e.archetype() == Archetype::Ranger)
            .count();
        rangers as f32 / rolls as f32
    }

    #[test]
    fn test_rangers_join_from_second_wave() {
        let mut h = Harness::new(quick_tuning());
        assert_eq!(ranger_share(&mut h, 1, 2000), 0.0);

        // 10% at wave 2
        let early = ranger_share(&mut h, 2, 4000);
        assert!(early > 0.06 && early < 0.14, "wave 2 share {early}");
    }

    #[test]
    fn test_ranger_chance_is_capped() {
        let mut h = Harness::new(quick_tuning());
        // 20 * 0.05 would be 1.0 without the cap
        let late = ranger_share(&mut h, 20, 4000);
        assert!(late > 0.25 && late < 0.35, "wave 20 share {late}");
        let mixed = (0..200)
            .map(|_| h.spawner.create_random_enemy(Vec2::ZERO, &mut h.rng).archetype())
            .any(|a| a != Archetype::Ranger);
        assert!(mixed);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut h = Harness::new(quick_tuning());
        h.step();
        h.spawner.game_over();
        assert_eq!(h.spawner.state, SpawnerState::GameOver);
        h.spawner.reset();
        assert_eq!(h.spawner.state, SpawnerState::Waves);
        assert_eq!(h.spawner.wave, 0);
        assert!(h.spawner.enemies.is_empty());
        assert!(h.spawner.boss.is_none());
        assert_eq!(h.spawner.next_entity_id(), EntityId(1));
    }
}
