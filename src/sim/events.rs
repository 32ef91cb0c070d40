//! Discrete notifications raised by the simulation
//!
//! Events accumulate in `GameState::events` in the order they happen and stay
//! there until the presentation layer drains them.

use glam::Vec2;
use serde::Serialize;

use super::boss::BossPhase;
use super::entity::{Archetype, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    EnemyDied {
        id: EntityId,
        archetype: Archetype,
        pos: Vec2,
        xp: u32,
        coins: u32,
    },
    /// A new wave was spawned (1-based)
    WaveAdvanced { wave: u32, enemies: u32 },
    BossSpawned { id: EntityId, pos: Vec2 },
    BossPhaseChanged { phase: BossPhase },
    /// Area attack; the combat pass applies it in the same tick
    BossSlam { pos: Vec2, radius: f32, damage: f32 },
    BossSummoned { pos: Vec2, count: u32 },
    PlayerHit { damage: f32, hp: f32 },
    LevelUp { level: u32 },
    Victory,
    GameOver,
}
