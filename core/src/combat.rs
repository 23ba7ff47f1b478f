//! Damage payloads carried by direct hits and projectiles.

use serde::{Deserialize, Serialize};

/// Everything a hit may inflict on a mob.
///
/// A `speed_multiplier` of `1.0` means the hit does not slow, a zero
/// `stun_probability` means it never stuns, and a zero `poison_dps` means it
/// does not poison.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamagePayload {
    /// Base damage before shields and crits.
    pub damage: f32,
    /// Radius around the impact point that also takes damage; zero for single target.
    pub aoe_radius: f32,
    /// Probability in `[0, 1]` that the hit lands at all.
    pub accuracy: f32,
    /// Multiplier applied to the target's base speed while frozen.
    pub speed_multiplier: f32,
    /// Seconds the slow lasts.
    pub freeze_duration: f32,
    /// Rate, in speed units per second, at which the slow takes hold.
    pub deceleration: f32,
    /// Probability in `[0, 1]` that the hit stuns.
    pub stun_probability: f32,
    /// Seconds the stun lasts.
    pub stun_duration: f32,
    /// Damage per second of a fresh poison stack.
    pub poison_dps: f32,
    /// Seconds the poison lasts.
    pub poison_duration: f32,
    /// Probability in `[0, 1]` of a critical hit.
    pub crit_probability: f32,
    /// Damage multiplier of a critical hit.
    pub crit_multiplier: f32,
}

impl DamagePayload {
    /// Plain single-target damage with perfect accuracy and no side effects.
    #[must_use]
    pub const fn plain(damage: f32) -> Self {
        Self {
            damage,
            aoe_radius: 0.0,
            accuracy: 1.0,
            speed_multiplier: 1.0,
            freeze_duration: 0.0,
            deceleration: 0.0,
            stun_probability: 0.0,
            stun_duration: 0.0,
            poison_dps: 0.0,
            poison_duration: 0.0,
            crit_probability: 0.0,
            crit_multiplier: 1.0,
        }
    }

    /// Reports whether the hit carries a slow.
    #[must_use]
    pub fn slows(&self) -> bool {
        (self.speed_multiplier - 1.0).abs() > f32::EPSILON && self.freeze_duration > 0.0
    }

    /// Reports whether the hit may stun.
    #[must_use]
    pub fn may_stun(&self) -> bool {
        self.stun_probability > 0.0 && self.stun_duration > 0.0
    }

    /// Reports whether the hit poisons.
    #[must_use]
    pub fn poisons(&self) -> bool {
        self.poison_dps > 0.0 && self.poison_duration > 0.0
    }

    /// Copy of the payload with its damage scaled by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            damage: self.damage * factor.max(0.0),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_payload_has_no_side_effects() {
        let payload = DamagePayload::plain(5.0);
        assert!(!payload.slows());
        assert!(!payload.may_stun());
        assert!(!payload.poisons());
    }

    #[test]
    fn scaling_only_touches_damage() {
        let payload = DamagePayload {
            poison_dps: 2.0,
            poison_duration: 3.0,
            ..DamagePayload::plain(10.0)
        };
        let scaled = payload.scaled(0.5);
        assert_eq!(scaled.damage, 5.0);
        assert_eq!(scaled.poison_dps, 2.0);
        assert_eq!(payload.scaled(-1.0).damage, 0.0);
    }
}
