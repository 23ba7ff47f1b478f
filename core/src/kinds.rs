//! Closed catalogues of difficulties, tower types, mob types and upgrades.
//!
//! Every catalogue carries a stable numeric code used by the text save format.

use serde::{Deserialize, Serialize};

/// World generation difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    /// One spawner, sparse walls, linear wave growth.
    Easy,
    /// Two spawners, moderate walls, quadratic wave growth.
    #[default]
    Normal,
    /// Three spawners, dense walls, cubic wave growth.
    Hard,
}

impl Difficulty {
    /// Every difficulty in ascending order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Number of spawners placed by world generation.
    #[must_use]
    pub const fn spawner_count(self) -> usize {
        match self {
            Self::Easy => 1,
            Self::Normal => 2,
            Self::Hard => 3,
        }
    }

    /// Number of walls placed by world generation.
    #[must_use]
    pub const fn wall_count(self) -> usize {
        match self {
            Self::Easy => 12,
            Self::Normal => 24,
            Self::Hard => 40,
        }
    }

    /// Stable numeric code used by the save format.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }

    /// Resolves a save-format code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|difficulty| difficulty.code() == code)
    }
}

/// Upgradable tower statistic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Minimum and maximum targeting range.
    Range,
    /// Base damage and poison strength.
    Damage,
    /// Radians the turret turns per second.
    RotationSpeed,
    /// Energy refill rate, i.e. rate of fire.
    AttackSpeed,
    /// Speed of the aiming warm-up.
    AimSpeed,
    /// Probability of a hit landing.
    Accuracy,
    /// Travel speed of fired projectiles.
    ProjectileSpeed,
    /// Strength of the slow applied on hit.
    FreezingPower,
    /// How fast and for how long the slow takes hold.
    FreezingSpeed,
    /// Probability of stunning on hit.
    StunChance,
    /// Length of the stun.
    StunDuration,
}

impl UpgradeKind {
    /// Every upgrade kind in save-code order.
    pub const ALL: [UpgradeKind; 11] = [
        Self::Range,
        Self::Damage,
        Self::RotationSpeed,
        Self::AttackSpeed,
        Self::AimSpeed,
        Self::Accuracy,
        Self::ProjectileSpeed,
        Self::FreezingPower,
        Self::FreezingSpeed,
        Self::StunChance,
        Self::StunDuration,
    ];

    /// Stable numeric code used by the save format.
    #[must_use]
    pub fn code(self) -> u8 {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .map_or(u8::MAX, |index| index as u8)
    }

    /// Resolves a save-format code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Types of towers the player can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Balanced projectile tower.
    Basic,
    /// Long range tower that hits instantly after a long aim.
    Sniper,
    /// Slow tower firing area-of-effect shells.
    Cannon,
    /// Tower whose projectiles slow mobs down.
    Frost,
    /// Tower whose projectiles may stun mobs.
    Shock,
    /// Tower whose projectiles poison mobs.
    Venom,
}

impl TowerKind {
    /// Every tower kind in save-code order.
    pub const ALL: [TowerKind; 6] = [
        Self::Basic,
        Self::Sniper,
        Self::Cannon,
        Self::Frost,
        Self::Shock,
        Self::Venom,
    ];

    /// Gold required to construct the tower.
    #[must_use]
    pub const fn price(self) -> f32 {
        match self {
            Self::Basic => 50.0,
            Self::Sniper => 120.0,
            Self::Cannon => 150.0,
            Self::Frost => 90.0,
            Self::Shock => 110.0,
            Self::Venom => 100.0,
        }
    }

    /// Stable numeric code used by the save format.
    #[must_use]
    pub fn code(self) -> u8 {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .map_or(u8::MAX, |index| index as u8)
    }

    /// Resolves a save-format code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Types of hostile mobs spawners can release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MobKind {
    /// Average speed and health.
    Crawler,
    /// Fast and fragile.
    Runner,
    /// Slow, tough, and hits defences hard.
    Brute,
    /// Shielded mob that shrugs off slows and stuns.
    Warden,
}

impl MobKind {
    /// Every mob kind in save-code order.
    pub const ALL: [MobKind; 4] = [Self::Crawler, Self::Runner, Self::Brute, Self::Warden];

    /// Stable numeric code used by the save format.
    #[must_use]
    pub fn code(self) -> u8 {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .map_or(u8::MAX, |index| index as u8)
    }

    /// Resolves a save-format code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_every_catalogue() {
        for kind in UpgradeKind::ALL {
            assert_eq!(UpgradeKind::from_code(kind.code()), Some(kind));
        }
        for kind in TowerKind::ALL {
            assert_eq!(TowerKind::from_code(kind.code()), Some(kind));
        }
        for kind in MobKind::ALL {
            assert_eq!(MobKind::from_code(kind.code()), Some(kind));
        }
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::from_code(difficulty.code()), Some(difficulty));
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(UpgradeKind::from_code(11), None);
        assert_eq!(TowerKind::from_code(6), None);
        assert_eq!(MobKind::from_code(200), None);
        assert_eq!(Difficulty::from_code(3), None);
    }

    #[test]
    fn harder_difficulties_place_more_obstacles() {
        assert!(Difficulty::Easy.wall_count() < Difficulty::Normal.wall_count());
        assert!(Difficulty::Normal.spawner_count() < Difficulty::Hard.spawner_count());
    }
}
