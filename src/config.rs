//! Game balance tuning
//!
//! Every value defaults to the shipped balance. A JSON document may override
//! any subset; missing keys fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Arena size and procedural obstacle layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    pub seed: u64,
    pub obstacle_count: u32,
    pub obstacle_min_size: f32,
    pub obstacle_max_size: f32,
    /// Obstacle centres stay this far from the arena edges
    pub obstacle_margin: f32,
    /// Half-extent of the square around the arena centre kept clear for the player
    pub center_exclusion: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            seed: WORLD_SEED,
            obstacle_count: 25,
            obstacle_min_size: 40.0,
            obstacle_max_size: 120.0,
            obstacle_margin: 200.0,
            center_exclusion: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub dt: f32,
    pub max_frame_time: f32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            dt: SIM_DT,
            max_frame_time: MAX_FRAME_TIME,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
    pub max_hp: f32,

    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,

    /// Melee swing
    pub attack_damage: f32,
    pub attack_range: f32,
    pub attack_arc: f32,
    pub attack_duration: f32,
    pub attack_cooldown: f32,

    pub invuln_duration: f32,

    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 14.0,
            max_speed: 280.0,
            acceleration: 1800.0,
            friction: 8.0,
            max_hp: 100.0,
            dash_speed: 650.0,
            dash_duration: 0.15,
            dash_cooldown: 0.8,
            attack_damage: 25.0,
            attack_range: 55.0,
            attack_arc: std::f32::consts::PI * 0.6,
            attack_duration: 0.2,
            attack_cooldown: 0.35,
            invuln_duration: 0.5,
            projectile_speed: 600.0,
            projectile_radius: 5.0,
            projectile_damage: 15.0,
            projectile_lifetime: 1.5,
        }
    }
}

/// Per-archetype stat block shared by every enemy kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub hp: f32,
    /// Contact damage
    pub damage: f32,
    pub xp_value: u32,
    pub coin_value: u32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self::grunt()
    }
}

impl EnemyStats {
    pub fn grunt() -> Self {
        Self {
            radius: 16.0,
            max_speed: 160.0,
            max_force: 300.0,
            hp: 40.0,
            damage: 12.0,
            xp_value: 15,
            coin_value: 5,
        }
    }

    pub fn swarm() -> Self {
        Self {
            radius: 10.0,
            max_speed: 200.0,
            max_force: 400.0,
            hp: 15.0,
            damage: 5.0,
            xp_value: 8,
            coin_value: 2,
        }
    }

    pub fn ranger() -> Self {
        Self {
            radius: 14.0,
            max_speed: 140.0,
            max_force: 250.0,
            hp: 30.0,
            damage: 8.0,
            xp_value: 20,
            coin_value: 8,
        }
    }

    pub fn boss() -> Self {
        Self {
            radius: 45.0,
            max_speed: 120.0,
            max_force: 200.0,
            hp: 800.0,
            damage: 25.0,
            xp_value: 200,
            coin_value: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangerTuning {
    pub preferred_distance: f32,
    pub flee_distance: f32,
    pub shoot_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime: f32,
}

impl Default for RangerTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 280.0,
            flee_distance: 150.0,
            shoot_cooldown: 2.0,
            projectile_speed: 220.0,
            projectile_damage: 15.0,
            projectile_radius: 8.0,
            projectile_lifetime: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Phase 2 starts at or below this fraction of max hp
    pub phase2_threshold: f32,
    pub phase2_speed_mult: f32,
    pub spawn_interval: f32,
    pub spawn_count: u32,
    pub charge_speed: f32,
    pub charge_duration: f32,
    pub charge_cooldown: f32,
    pub slam_radius: f32,
    pub slam_damage: f32,
    pub slam_duration: f32,
    pub slam_cooldown: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            spawn_x: WORLD_WIDTH / 2.0,
            spawn_y: WORLD_HEIGHT / 2.0,
            phase2_threshold: 0.6,
            phase2_speed_mult: 1.5,
            spawn_interval: 5.0,
            spawn_count: 4,
            charge_speed: 450.0,
            charge_duration: 0.6,
            charge_cooldown: 4.0,
            slam_radius: 150.0,
            slam_damage: 35.0,
            slam_duration: 0.6,
            slam_cooldown: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerTuning {
    pub wave_count: u32,
    pub wave_delay: f32,
    pub boss_delay: f32,
    pub base_enemies_per_wave: u32,
    pub enemies_per_wave_increase: u32,
    pub spawn_margin: f32,
    /// When false the spawner sits idle in `waves` (sandbox/testing)
    pub auto_start: bool,
}

impl Default for SpawnerTuning {
    fn default() -> Self {
        Self {
            wave_count: 5,
            wave_delay: 2.0,
            boss_delay: 2.0,
            base_enemies_per_wave: 8,
            enemies_per_wave_increase: 4,
            spawn_margin: 100.0,
            auto_start: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    pub base_xp_threshold: f32,
    pub xp_multiplier: f32,
    pub options_offered: usize,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            base_xp_threshold: 50.0,
            xp_multiplier: 1.5,
            options_offered: 3,
        }
    }
}

/// Complete balance sheet for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub timing: TimingTuning,
    pub cell_size: f32,
    pub player: PlayerTuning,
    pub grunt: EnemyStats,
    pub swarm: EnemyStats,
    pub ranger: EnemyStats,
    pub ranger_attack: RangerTuning,
    pub boss: EnemyStats,
    pub boss_attack: BossTuning,
    pub spawner: SpawnerTuning,
    pub upgrades: UpgradeTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world: WorldTuning::default(),
            timing: TimingTuning::default(),
            cell_size: CELL_SIZE,
            player: PlayerTuning::default(),
            grunt: EnemyStats::grunt(),
            swarm: EnemyStats::swarm(),
            ranger: EnemyStats::ranger(),
            ranger_attack: RangerTuning::default(),
            boss: EnemyStats::boss(),
            boss_attack: BossTuning::default(),
            spawner: SpawnerTuning::default(),
            upgrades: UpgradeTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be positive and finite",
                })
            }
        }

        positive("timing.dt", self.timing.dt)?;
        positive("timing.max_frame_time", self.timing.max_frame_time)?;
        if self.timing.max_frame_time < self.timing.dt {
            return Err(ConfigError::Invalid {
                field: "timing.max_frame_time",
                reason: "must be at least one timestep",
            });
        }
        positive("cell_size", self.cell_size)?;
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        if self.world.obstacle_min_size > self.world.obstacle_max_size {
            return Err(ConfigError::Invalid {
                field: "world.obstacle_min_size",
                reason: "exceeds obstacle_max_size",
            });
        }
        positive("player.radius", self.player.radius)?;
        positive("player.max_speed", self.player.max_speed)?;
        positive("player.max_hp", self.player.max_hp)?;

        let archetypes = [
            ("grunt", &self.grunt),
            ("swarm", &self.swarm),
            ("ranger", &self.ranger),
            ("boss", &self.boss),
        ];
        for (field, stats) in archetypes {
            positive(field, stats.radius)?;
            positive(field, stats.max_speed)?;
            positive(field, stats.hp)?;
        }

        let largest_radius = archetypes
            .iter()
            .map(|(_, stats)| stats.radius)
            .fold(self.player.radius, f32::max);
        let smallest_side = self.world.width.min(self.world.height);
        if smallest_side <= 2.0 * largest_radius {
            return Err(ConfigError::Invalid {
                field: "world",
                reason: "must be wider and taller than the largest body",
            });
        }
        if smallest_side <= 2.0 * self.spawner.spawn_margin {
            return Err(ConfigError::Invalid {
                field: "spawner.spawn_margin",
                reason: "must be less than half the world size",
            });
        }
        if smallest_side <= 2.0 * self.world.obstacle_margin {
            return Err(ConfigError::Invalid {
                field: "world.obstacle_margin",
                reason: "must be less than half the world size",
            });
        }

        if self.upgrades.base_xp_threshold <= 0.0 || self.upgrades.xp_multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                field: "upgrades",
                reason: "threshold must be positive and multiplier at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "spawner": { "wave_count": 2 }, "cell_size": 64 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.spawner.wave_count, 2);
        assert_eq!(tuning.cell_size, 64.0);
        // Untouched groups keep defaults
        assert_eq!(tuning.spawner.base_enemies_per_wave, 8);
        assert_eq!(tuning.grunt.hp, 40.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "timing": { "dt": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timing.dt", .. }));

        let err = Tuning::from_json(r#"{ "cell_size": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cell_size", .. }));

        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_world_smaller_than_bodies_or_margins() {
        let err = Tuning::from_json(r#"{ "world": { "width": 20, "height": 20, "obstacle_count": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "world", .. }));

        // The boss is the widest body at radius 45
        let err = Tuning::from_json(r#"{ "world": { "width": 90, "height": 2400 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "world", .. }));

        let err = Tuning::from_json(r#"{ "world": { "width": 150, "height": 150, "obstacle_margin": 10 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "spawner.spawn_margin", .. }));

        let err = Tuning::from_json(r#"{ "world": { "width": 300, "height": 300 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "world.obstacle_margin", .. }));

        let small = Tuning::from_json(
            r#"{ "world": { "width": 300, "height": 300, "obstacle_margin": 50, "obstacle_count": 0 } }"#,
        );
        assert!(small.is_ok());
    }
}
