//! XP levelling and upgrade selection

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::config::UpgradeTuning;

/// Shortest dash cooldown upgrades can reach
const MIN_DASH_COOLDOWN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    MaxHp,
    Damage,
    Speed,
    DashCooldown,
    AttackArc,
    AttackRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub value: f32,
}

impl Upgrade {
    pub fn name(&self) -> &'static str {
        match self.kind {
            UpgradeKind::MaxHp => "+25 Max HP",
            UpgradeKind::Damage => "+10 Damage",
            UpgradeKind::Speed => "+30 Speed",
            UpgradeKind::DashCooldown => "-0.15s Dash CD",
            UpgradeKind::AttackArc => "+20° Arc",
            UpgradeKind::AttackRange => "+15 Range",
        }
    }

    pub fn apply(&self, player: &mut Player) {
        match self.kind {
            UpgradeKind::MaxHp => {
                player.body.max_hp += self.value;
                player.body.heal(self.value);
            }
            UpgradeKind::Damage => player.bonus_damage += self.value,
            UpgradeKind::Speed => player.body.max_speed += self.value,
            UpgradeKind::DashCooldown => {
                player.stats.dash_cooldown =
                    (player.stats.dash_cooldown - self.value).max(MIN_DASH_COOLDOWN);
            }
            UpgradeKind::AttackArc => player.stats.attack_arc += self.value,
            UpgradeKind::AttackRange => player.stats.attack_range += self.value,
        }
    }
}

pub const UPGRADE_POOL: [Upgrade; 6] = [
    Upgrade { kind: UpgradeKind::MaxHp, value: 25.0 },
    Upgrade { kind: UpgradeKind::Damage, value: 10.0 },
    Upgrade { kind: UpgradeKind::Speed, value: 30.0 },
    Upgrade { kind: UpgradeKind::DashCooldown, value: 0.15 },
    Upgrade { kind: UpgradeKind::AttackArc, value: 20.0 * std::f32::consts::PI / 180.0 },
    Upgrade { kind: UpgradeKind::AttackRange, value: 15.0 },
];

/// Level thresholds and the pending upgrade offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    tuning: UpgradeTuning,
    /// Choices awaiting a pick; empty when nothing is pending
    pub options: Vec<Upgrade>,
}

impl Progression {
    pub fn new(tuning: &UpgradeTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            options: Vec::new(),
        }
    }

    #[inline]
    pub fn pending(&self) -> bool {
        !self.options.is_empty()
    }

    /// XP required to advance from `level` to the next one
    pub fn xp_for_level(&self, level: u32) -> u32 {
        let exponent = level.saturating_sub(1) as i32;
        (self.tuning.base_xp_threshold * self.tuning.xp_multiplier.powi(exponent)).floor() as u32
    }

    /// Consume XP for one level if the player has enough, and roll an offer
    pub fn check_level_up(&mut self, player: &mut Player, rng: &mut impl Rng) -> bool {
        if self.pending() {
            return false;
        }
        let needed = self.xp_for_level(player.level);
        if player.xp < needed {
            return false;
        }
        player.xp -= needed;
        player.level += 1;
        self.options = self.roll_options(rng);
        log::info!("Level up: {} ({} upgrades offered)", player.level, self.options.len());
        true
    }

    fn roll_options(&self, rng: &mut impl Rng) -> Vec<Upgrade> {
        let mut pool = UPGRADE_POOL.to_vec();
        pool.shuffle(rng);
        pool.truncate(self.tuning.options_offered.min(pool.len()));
        pool
    }

    /// Apply the offered upgrade at `index`. Out-of-range picks change nothing.
    pub fn select(&mut self, index: usize, player: &mut Player) -> bool {
        let Some(upgrade) = self.options.get(index).copied() else {
            return false;
        };
        upgrade.apply(player);
        log::debug!("Upgrade selected: {}", upgrade.name());
        self.options.clear();
        true
    }

    pub fn reset(&mut self) {
        self.options.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerTuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (Progression, Player, Pcg32) {
        (
            Progression::new(&UpgradeTuning::default()),
            Player::new(Vec2::ZERO, &PlayerTuning::default()),
            Pcg32::seed_from_u64(7),
        )
    }

    #[test]
    fn test_xp_curve() {
        let (prog, _, _) = setup();
        assert_eq!(prog.xp_for_level(1), 50);
        assert_eq!(prog.xp_for_level(2), 75);
        assert_eq!(prog.xp_for_level(3), 112);
        assert_eq!(prog.xp_for_level(4), 168);
    }

    #[test]
    fn test_level_up_consumes_xp_and_offers_distinct_upgrades() {
        let (mut prog, mut player, mut rng) = setup();
        player.gain(49, 0);
        assert!(!prog.check_level_up(&mut player, &mut rng));

        player.gain(11, 3);
        assert!(prog.check_level_up(&mut player, &mut rng));
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 10);
        assert_eq!(player.coins, 3);
        assert_eq!(prog.options.len(), 3);
        for (i, a) in prog.options.iter().enumerate() {
            for b in &prog.options[i + 1..] {
                assert_ne!(a.kind, b.kind);
            }
        }
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let (mut prog, mut player, mut rng) = setup();
        player.gain(50, 0);
        prog.check_level_up(&mut player, &mut rng);
        assert!(!prog.select(3, &mut player));
        assert!(prog.pending());
        assert!(prog.select(0, &mut player));
        assert!(!prog.pending());
        assert!(!prog.select(0, &mut player));
    }

    #[test]
    fn test_upgrade_effects() {
        let (_, mut player, _) = setup();
        player.take_damage(40.0);
        Upgrade { kind: UpgradeKind::MaxHp, value: 25.0 }.apply(&mut player);
        assert_eq!(player.body.max_hp, 125.0);
        assert_eq!(player.body.hp, 85.0);

        Upgrade { kind: UpgradeKind::Damage, value: 10.0 }.apply(&mut player);
        assert_eq!(player.melee_damage(), 35.0);
        assert_eq!(player.projectile_damage(), 25.0);

        for _ in 0..10 {
            Upgrade { kind: UpgradeKind::DashCooldown, value: 0.15 }.apply(&mut player);
        }
        assert_eq!(player.stats.dash_cooldown, MIN_DASH_COOLDOWN);
    }
}
