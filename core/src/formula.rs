//! Parametrised leveling formulas.
//!
//! Every upgradable statistic is a pure function of two integer levels: the
//! upgrade level bought for that statistic and the overall experience level of
//! the entity. Formulas are plain data so tower and mob catalogues can be
//! declared as constants and evaluated without closures.

use serde::{Deserialize, Serialize};

/// Polynomial in a single integer level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// `c`
    Constant(f32),
    /// `a + b·n`
    Linear {
        /// Value at level zero.
        base: f32,
        /// Growth per level.
        slope: f32,
    },
    /// `a + b·n + c·n²`
    Quadratic {
        /// Value at level zero.
        base: f32,
        /// Linear coefficient.
        linear: f32,
        /// Quadratic coefficient.
        quadratic: f32,
    },
    /// `a + b·n + c·n² + d·n³`
    Cubic {
        /// Value at level zero.
        base: f32,
        /// Linear coefficient.
        linear: f32,
        /// Quadratic coefficient.
        quadratic: f32,
        /// Cubic coefficient.
        cubic: f32,
    },
}

impl Curve {
    /// Evaluates the polynomial at `level`.
    #[must_use]
    pub fn evaluate(&self, level: u32) -> f32 {
        let n = level as f32;
        match *self {
            Self::Constant(value) => value,
            Self::Linear { base, slope } => base + slope * n,
            Self::Quadratic {
                base,
                linear,
                quadratic,
            } => base + n * (linear + n * quadratic),
            Self::Cubic {
                base,
                linear,
                quadratic,
                cubic,
            } => base + n * (linear + n * (quadratic + n * cubic)),
        }
    }
}

/// Statistic computed from `(upgrade level, entity level)`.
///
/// The curve is evaluated at the upgrade level, scaled by
/// `1 + level_bonus · entity_level`, then clamped to `floor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradableFormula {
    curve: Curve,
    level_bonus: f32,
    floor: f32,
}

impl UpgradableFormula {
    /// Creates a formula with no experience-level bonus and a floor of zero.
    #[must_use]
    pub const fn new(curve: Curve) -> Self {
        Self {
            curve,
            level_bonus: 0.0,
            floor: 0.0,
        }
    }

    /// Formula that always yields `value`.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self {
            curve: Curve::Constant(value),
            level_bonus: 0.0,
            floor: f32::MIN,
        }
    }

    /// Formula that grows linearly with the upgrade level.
    #[must_use]
    pub const fn linear(base: f32, slope: f32) -> Self {
        Self::new(Curve::Linear { base, slope })
    }

    /// Formula that grows quadratically with the upgrade level.
    #[must_use]
    pub const fn quadratic(base: f32, linear: f32, quadratic: f32) -> Self {
        Self::new(Curve::Quadratic {
            base,
            linear,
            quadratic,
        })
    }

    /// Formula that grows cubically with the upgrade level.
    #[must_use]
    pub const fn cubic(base: f32, linear: f32, quadratic: f32, cubic: f32) -> Self {
        Self::new(Curve::Cubic {
            base,
            linear,
            quadratic,
            cubic,
        })
    }

    /// Sets the fractional bonus granted per experience level.
    #[must_use]
    pub const fn with_level_bonus(mut self, level_bonus: f32) -> Self {
        self.level_bonus = level_bonus;
        self
    }

    /// Sets the minimum value the formula may produce.
    #[must_use]
    pub const fn with_floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    /// Evaluates the statistic.
    #[must_use]
    pub fn evaluate(&self, upgrade_level: u32, entity_level: u32) -> f32 {
        let scale = 1.0 + self.level_bonus * entity_level as f32;
        (self.curve.evaluate(upgrade_level) * scale).max(self.floor)
    }
}

/// Maps accumulated experience onto an overall level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelScale {
    experience_per_level: f32,
    max_level: u32,
}

impl LevelScale {
    /// Creates a linear scale capped at `max_level`.
    #[must_use]
    pub const fn new(experience_per_level: f32, max_level: u32) -> Self {
        Self {
            experience_per_level,
            max_level,
        }
    }

    /// Highest attainable level.
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Level reached with `experience` points.
    #[must_use]
    pub fn level_for(&self, experience: f32) -> u32 {
        if self.experience_per_level <= 0.0 || experience <= 0.0 {
            return 0;
        }
        let level = (experience / self.experience_per_level).floor();
        if level >= self.max_level as f32 {
            self.max_level
        } else {
            level as u32
        }
    }
}

/// Gold cost of buying an upgrade level.
///
/// Cubic in the level being bought and clamped to a floor for low levels where
/// the polynomial would otherwise go negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCost {
    curve: Curve,
    floor: f32,
}

impl UpgradeCost {
    /// Creates a cubic cost curve with the provided floor.
    #[must_use]
    pub const fn cubic(base: f32, linear: f32, quadratic: f32, cubic: f32, floor: f32) -> Self {
        Self {
            curve: Curve::Cubic {
                base,
                linear,
                quadratic,
                cubic,
            },
            floor,
        }
    }

    /// Cost of buying `level`.
    #[must_use]
    pub fn evaluate(&self, level: u32) -> f32 {
        self.curve.evaluate(level).max(self.floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_evaluate_polynomials() {
        assert_eq!(Curve::Constant(3.0).evaluate(9), 3.0);
        assert_eq!(Curve::Linear { base: 1.0, slope: 2.0 }.evaluate(3), 7.0);
        let quadratic = Curve::Quadratic {
            base: 1.0,
            linear: 1.0,
            quadratic: 1.0,
        };
        assert_eq!(quadratic.evaluate(2), 7.0);
        let cubic = Curve::Cubic {
            base: 0.0,
            linear: 0.0,
            quadratic: 0.0,
            cubic: 2.0,
        };
        assert_eq!(cubic.evaluate(3), 54.0);
    }

    #[test]
    fn formula_clamps_to_floor() {
        let formula = UpgradableFormula::linear(1.0, -1.0).with_floor(0.25);
        assert_eq!(formula.evaluate(0, 0), 1.0);
        assert_eq!(formula.evaluate(5, 0), 0.25);
    }

    #[test]
    fn experience_level_scales_formula() {
        let formula = UpgradableFormula::linear(10.0, 2.0).with_level_bonus(0.1);
        assert!((formula.evaluate(1, 0) - 12.0).abs() < 1e-6);
        assert!((formula.evaluate(1, 5) - 18.0).abs() < 1e-5);
    }

    #[test]
    fn level_scale_caps_at_maximum() {
        let scale = LevelScale::new(100.0, 5);
        assert_eq!(scale.level_for(0.0), 0);
        assert_eq!(scale.level_for(99.0), 0);
        assert_eq!(scale.level_for(250.0), 2);
        assert_eq!(scale.level_for(500.0), 5);
        assert_eq!(scale.level_for(10_000.0), 5);
    }

    #[test]
    fn upgrade_cost_respects_floor_for_low_levels() {
        let cost = UpgradeCost::cubic(-40.0, 5.0, 2.0, 1.0, 15.0);
        assert_eq!(cost.evaluate(0), 15.0);
        assert_eq!(cost.evaluate(1), 15.0);
        assert_eq!(cost.evaluate(4), -40.0 + 20.0 + 32.0 + 64.0);
    }
}
