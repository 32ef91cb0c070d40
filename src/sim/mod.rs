//! Deterministic simulation module
//!
//! All game logic lives here. Pure Rust, no rendering or platform dependencies.

mod arc;
pub mod boss;
mod clock;
pub mod collision;
mod combat;
pub mod enemy;
pub mod entity;
mod events;
pub mod integrate;
pub mod player;
pub mod spatial;
pub mod spawner;
mod state;
pub mod steering;
mod tick;
pub mod upgrades;
pub mod world;

pub use arc::Sector;
pub use boss::{Boss, BossPhase, BossState};
pub use clock::FixedTimestep;
pub use enemy::{Enemy, EnemyKind, EnemyState};
pub use entity::{Archetype, Body, EntityId, Projectile};
pub use events::GameEvent;
pub use player::{Player, PlayerInput};
pub use spatial::{OccupiedCell, SpatialEntry, SpatialHash};
pub use spawner::{Spawner, SpawnerState};
pub use state::{BossView, EntityView, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use upgrades::{Progression, Upgrade, UpgradeKind};
pub use world::{Bounds, Obstacle};
