//! Mob spawners: a refilling stock that releases difficulty-scaled waves.

use bulwark_core::{Curve, Difficulty, EntityId, Event, MobKind, Position};
use rand::distributions::{Distribution, WeightedIndex};
use rand_chacha::ChaCha8Rng;
use rand_distr::UnitDisc;
use thiserror::Error;

use crate::{
    config::WorldConfig,
    context::StepInfo,
    mob::{Mob, MobProfile},
};

/// Slack applied when comparing the stock against the threshold, so that
/// accumulated rounding does not delay a wave by a tick.
const STOCK_EPSILON: f32 = 1e-4;

/// Errors raised while constructing a spawner.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpawnerError {
    /// The mob-type distribution has no entries.
    #[error("spawner mob distribution is empty")]
    EmptyDistribution,
    /// A weight is negative, not finite, or every weight is zero.
    #[error("spawner mob distribution has invalid weights")]
    InvalidWeights,
}

/// Weighted choice over mob kinds.
#[derive(Clone, Debug)]
pub struct MobDistribution {
    entries: Vec<(MobKind, f32)>,
    index: WeightedIndex<f32>,
}

impl MobDistribution {
    /// Builds a distribution from `(kind, weight)` pairs.
    pub fn new(entries: Vec<(MobKind, f32)>) -> Result<Self, SpawnerError> {
        if entries.is_empty() {
            return Err(SpawnerError::EmptyDistribution);
        }
        let index = WeightedIndex::new(entries.iter().map(|(_, weight)| *weight))
            .map_err(|_| SpawnerError::InvalidWeights)?;
        Ok(Self { entries, index })
    }

    /// Default distribution for a difficulty tier.
    pub fn for_difficulty(difficulty: Difficulty) -> Result<Self, SpawnerError> {
        let entries = match difficulty {
            Difficulty::Easy => vec![(MobKind::Crawler, 3.0), (MobKind::Runner, 1.0)],
            Difficulty::Normal => vec![
                (MobKind::Crawler, 3.0),
                (MobKind::Runner, 2.0),
                (MobKind::Brute, 1.0),
            ],
            Difficulty::Hard => vec![
                (MobKind::Crawler, 2.0),
                (MobKind::Runner, 2.0),
                (MobKind::Brute, 2.0),
                (MobKind::Warden, 1.0),
            ],
        };
        Self::new(entries)
    }

    /// The `(kind, weight)` pairs in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[(MobKind, f32)] {
        &self.entries
    }

    /// Draws a mob kind.
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> MobKind {
        let (kind, _) = self.entries[self.index.sample(rng)];
        kind
    }
}

/// Wave size and health pool as functions of the spawner's wave counter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveFormula {
    size: Curve,
    health_pool: Curve,
}

impl WaveFormula {
    /// Formula family used by `difficulty`: linear, quadratic or cubic.
    #[must_use]
    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                size: Curve::Linear {
                    base: 2.0,
                    slope: 1.0,
                },
                health_pool: Curve::Linear {
                    base: 40.0,
                    slope: 25.0,
                },
            },
            Difficulty::Normal => Self {
                size: Curve::Quadratic {
                    base: 3.0,
                    linear: 1.0,
                    quadratic: 0.1,
                },
                health_pool: Curve::Quadratic {
                    base: 60.0,
                    linear: 30.0,
                    quadratic: 4.0,
                },
            },
            Difficulty::Hard => Self {
                size: Curve::Cubic {
                    base: 4.0,
                    linear: 1.5,
                    quadratic: 0.2,
                    cubic: 0.01,
                },
                health_pool: Curve::Cubic {
                    base: 80.0,
                    linear: 40.0,
                    quadratic: 6.0,
                    cubic: 0.5,
                },
            },
        }
    }

    /// Number of mobs in wave `counter`; never zero.
    #[must_use]
    pub fn size(&self, counter: u32) -> u32 {
        (self.size.evaluate(counter).floor().max(1.0)) as u32
    }

    /// Total health shared by the mobs of wave `counter`.
    #[must_use]
    pub fn health_pool(&self, counter: u32) -> f32 {
        self.health_pool.evaluate(counter).max(1.0)
    }
}

/// Block that turns a refilling stock into waves of mobs.
#[derive(Clone, Debug)]
pub struct Spawner {
    pub(crate) difficulty: Difficulty,
    pub(crate) distribution: MobDistribution,
    pub(crate) stock: f32,
    pub(crate) threshold: f32,
    pub(crate) refill_rate: f32,
    pub(crate) experience: u32,
    pub(crate) spawn_radius: f32,
}

impl Spawner {
    /// Creates a spawner with the default distribution for `difficulty`.
    pub fn new(difficulty: Difficulty, config: &WorldConfig) -> Result<Self, SpawnerError> {
        let distribution = MobDistribution::for_difficulty(difficulty)?;
        Ok(Self::with_distribution(difficulty, distribution, config))
    }

    /// Creates a spawner releasing mobs from `distribution`.
    #[must_use]
    pub fn with_distribution(
        difficulty: Difficulty,
        distribution: MobDistribution,
        config: &WorldConfig,
    ) -> Self {
        Self {
            difficulty,
            distribution,
            stock: config.spawner_reserve.max(0.0),
            threshold: config.spawner_threshold.max(0.0),
            refill_rate: config.spawner_refill.max(0.0),
            experience: 0,
            spawn_radius: config.spawn_radius.max(0.0),
        }
    }

    /// Overrides the stock and wave counter, used when restoring saves.
    #[must_use]
    pub(crate) fn with_progress(mut self, stock: f32, experience: u32) -> Self {
        self.stock = stock.max(0.0);
        self.experience = experience;
        self
    }

    /// Difficulty tier driving the wave formulas.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Mob-type distribution.
    #[must_use]
    pub const fn distribution(&self) -> &MobDistribution {
        &self.distribution
    }

    /// Accumulated stock.
    #[must_use]
    pub const fn stock(&self) -> f32 {
        self.stock
    }

    /// Stock consumed per wave.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Number of waves released so far.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Refills the stock and releases a wave once it crosses the threshold.
    pub(crate) fn step(&mut self, id: EntityId, position: Position, info: &mut StepInfo<'_>) {
        self.stock += info.elapsed * self.refill_rate;
        if self.stock + STOCK_EPSILON < self.threshold {
            return;
        }

        self.stock = (self.stock - self.threshold).max(0.0);
        if self.stock < STOCK_EPSILON {
            self.stock = 0.0;
        }
        self.experience += 1;

        let formula = WaveFormula::for_difficulty(self.difficulty);
        let count = formula.size(self.experience);
        let share = formula.health_pool(self.experience) / count as f32;

        for _ in 0..count {
            let kind = self.distribution.sample(info.rng);
            let [dx, dy]: [f32; 2] = UnitDisc.sample(info.rng);
            let spawn_at = position + Position::new(dx, dy) * self.spawn_radius;
            let health = share * MobProfile::of(kind).health_factor;
            info.spawned_mobs.push(Mob::new(kind, spawn_at, health));
        }

        info.events.push(Event::WaveSpawned { spawner: id, count });
        tracing::info!(
            spawner = ?id,
            wave = self.experience,
            count,
            "wave spawned"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_system_locator::Locator;
    use bulwark_system_pathfinding::PathFinder;
    use rand::SeedableRng;

    fn config() -> WorldConfig {
        WorldConfig {
            spawner_threshold: 1.0,
            spawner_reserve: 0.9,
            spawner_refill: 0.1,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn empty_distribution_is_rejected() {
        assert_eq!(
            MobDistribution::new(Vec::new()).err(),
            Some(SpawnerError::EmptyDistribution)
        );
        assert_eq!(
            MobDistribution::new(vec![(MobKind::Runner, 0.0)]).err(),
            Some(SpawnerError::InvalidWeights)
        );
    }

    #[test]
    fn one_second_of_refill_releases_a_single_wave() {
        let config = config();
        let path_finder = PathFinder::new(config.path_finder());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut spawner = Spawner::new(Difficulty::Easy, &config).expect("valid spawner");
        let id = EntityId::new(0, 0);

        let mut waves = 0;
        for tick in 0..10 {
            let mut info = StepInfo::new(
                &mut rng,
                &path_finder,
                &config,
                Locator::new(),
                0.1,
                f64::from(tick) * 0.1,
            );
            spawner.step(id, Position::new(2.5, 2.5), &mut info);
            waves += info
                .events
                .iter()
                .filter(|event| matches!(event, Event::WaveSpawned { .. }))
                .count();
        }

        assert_eq!(waves, 1);
        assert_eq!(spawner.experience(), 1);
        assert!(spawner.stock().abs() < 1e-3);
    }

    #[test]
    fn waves_spawn_within_radius_with_pooled_health() {
        let config = WorldConfig {
            spawner_reserve: 1.0,
            ..config()
        };
        let path_finder = PathFinder::new(config.path_finder());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut spawner = Spawner::new(Difficulty::Normal, &config).expect("valid spawner");
        let origin = Position::new(5.5, 5.5);

        let mut info = StepInfo::new(&mut rng, &path_finder, &config, Locator::new(), 0.0, 0.0);
        spawner.step(EntityId::new(1, 0), origin, &mut info);

        let formula = WaveFormula::for_difficulty(Difficulty::Normal);
        assert_eq!(info.spawned_mobs.len() as u32, formula.size(1));
        for mob in &info.spawned_mobs {
            assert!(mob.position.distance(origin) <= config.spawn_radius + 1e-4);
        }
    }

    #[test]
    fn harder_tiers_grow_faster() {
        let easy = WaveFormula::for_difficulty(Difficulty::Easy);
        let hard = WaveFormula::for_difficulty(Difficulty::Hard);
        assert!(hard.size(10) > easy.size(10));
        assert!(hard.health_pool(10) > easy.health_pool(10));
        assert_eq!(easy.size(0), 2);
    }
}
