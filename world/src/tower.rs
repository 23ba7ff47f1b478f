//! Player towers: catalogue, targeting, aiming and firing.

use bulwark_core::{
    heading, normalize_angle, Arena, DamagePayload, Energy, Entity, EntityId, LevelScale,
    OwnerFilter, OwnerId, Position, TowerKind, UpgradableFormula, UpgradeCost, UpgradeKind,
};
use rand::Rng;

use crate::{context::StepInfo, effect::Countdown, mob::Mob, projectile::Projectile};

const BASIC_UPGRADES: &[UpgradeKind] = &[
    UpgradeKind::Range,
    UpgradeKind::Damage,
    UpgradeKind::RotationSpeed,
    UpgradeKind::AttackSpeed,
    UpgradeKind::Accuracy,
    UpgradeKind::ProjectileSpeed,
];

const SNIPER_UPGRADES: &[UpgradeKind] = &[
    UpgradeKind::Range,
    UpgradeKind::Damage,
    UpgradeKind::RotationSpeed,
    UpgradeKind::AttackSpeed,
    UpgradeKind::AimSpeed,
    UpgradeKind::Accuracy,
];

const FROST_UPGRADES: &[UpgradeKind] = &[
    UpgradeKind::Range,
    UpgradeKind::Damage,
    UpgradeKind::RotationSpeed,
    UpgradeKind::AttackSpeed,
    UpgradeKind::FreezingPower,
    UpgradeKind::FreezingSpeed,
];

const SHOCK_UPGRADES: &[UpgradeKind] = &[
    UpgradeKind::Range,
    UpgradeKind::Damage,
    UpgradeKind::RotationSpeed,
    UpgradeKind::AttackSpeed,
    UpgradeKind::StunChance,
    UpgradeKind::StunDuration,
];

const TOWER_LEVELS: LevelScale = LevelScale::new(10.0, 10);

/// Strategy a tower uses to choose among mobs in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TargetPicker {
    /// Nearest mob first.
    #[default]
    Closest,
    /// Mob with the least health first, nearest on ties.
    Weakest,
}

impl TargetPicker {
    /// Chooses a target from `(id, health)` candidates ordered nearest first.
    #[must_use]
    pub fn pick(self, candidates: &[(EntityId, f32)]) -> Option<EntityId> {
        match self {
            Self::Closest => candidates.first().map(|(id, _)| *id),
            Self::Weakest => candidates
                .iter()
                .fold(None::<(EntityId, f32)>, |best, &(id, health)| match best {
                    Some((_, lowest)) if lowest <= health => best,
                    _ => Some((id, health)),
                })
                .map(|(id, _)| id),
        }
    }
}

/// Gold cost curve of buying a level of `kind`.
#[must_use]
pub const fn upgrade_cost(kind: UpgradeKind) -> UpgradeCost {
    match kind {
        UpgradeKind::Range => UpgradeCost::cubic(-10.0, 12.0, 4.0, 0.5, 20.0),
        UpgradeKind::Damage => UpgradeCost::cubic(-15.0, 15.0, 5.0, 1.0, 25.0),
        UpgradeKind::RotationSpeed => UpgradeCost::cubic(0.0, 8.0, 2.0, 0.25, 10.0),
        UpgradeKind::AttackSpeed => UpgradeCost::cubic(-20.0, 18.0, 6.0, 1.0, 30.0),
        UpgradeKind::AimSpeed => UpgradeCost::cubic(0.0, 10.0, 3.0, 0.5, 15.0),
        UpgradeKind::Accuracy => UpgradeCost::cubic(0.0, 10.0, 3.0, 0.5, 15.0),
        UpgradeKind::ProjectileSpeed => UpgradeCost::cubic(0.0, 6.0, 2.0, 0.25, 10.0),
        UpgradeKind::FreezingPower => UpgradeCost::cubic(-10.0, 14.0, 5.0, 0.75, 20.0),
        UpgradeKind::FreezingSpeed => UpgradeCost::cubic(0.0, 10.0, 3.0, 0.5, 15.0),
        UpgradeKind::StunChance => UpgradeCost::cubic(-10.0, 16.0, 5.0, 1.0, 25.0),
        UpgradeKind::StunDuration => UpgradeCost::cubic(0.0, 12.0, 4.0, 0.5, 20.0),
    }
}

/// Statistics of a tower kind, each a formula of `(upgrade level, tower level)`.
///
/// The comment on each formula names the upgrade whose level it is evaluated
/// at; formulas without one are evaluated at upgrade level zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerProfile {
    /// Health of the tower block.
    pub health: f32,
    /// Energy pool capacity.
    pub energy_capacity: f32,
    /// Energy spent per shot.
    pub attack_cost: f32,
    /// Half-angle of the firing cone in radians.
    pub half_angle: f32,
    /// Strategy used to choose targets.
    pub picker: TargetPicker,
    /// Range.
    pub min_range: UpgradableFormula,
    /// Range.
    pub max_range: UpgradableFormula,
    /// Damage.
    pub damage: UpgradableFormula,
    /// RotationSpeed, in radians per second.
    pub rotation_speed: UpgradableFormula,
    /// AttackSpeed, as energy refilled per second.
    pub attack_speed: UpgradableFormula,
    /// AimSpeed, as seconds of aiming before the first shot.
    pub aim_duration: UpgradableFormula,
    /// Accuracy.
    pub accuracy: UpgradableFormula,
    /// ProjectileSpeed; `None` for towers that hit instantly.
    pub projectile_speed: Option<UpgradableFormula>,
    /// FreezingPower.
    pub speed_multiplier: UpgradableFormula,
    /// FreezingSpeed.
    pub freeze_duration: UpgradableFormula,
    /// FreezingSpeed.
    pub deceleration: UpgradableFormula,
    /// StunChance.
    pub stun_probability: UpgradableFormula,
    /// StunDuration.
    pub stun_duration: UpgradableFormula,
    /// Damage.
    pub poison_dps: UpgradableFormula,
    /// Poison duration in seconds.
    pub poison_duration: UpgradableFormula,
    /// Accuracy.
    pub crit_probability: UpgradableFormula,
    /// Critical damage multiplier.
    pub crit_multiplier: UpgradableFormula,
    /// Area-of-effect radius.
    pub aoe_radius: UpgradableFormula,
    /// Upgrades the tower supports.
    pub upgrades: &'static [UpgradeKind],
    /// Maps experience onto the tower level.
    pub levels: LevelScale,
}

impl TowerProfile {
    const fn base() -> Self {
        Self {
            health: 100.0,
            energy_capacity: 1.0,
            attack_cost: 1.0,
            half_angle: 0.2,
            picker: TargetPicker::Closest,
            min_range: UpgradableFormula::constant(0.0),
            max_range: UpgradableFormula::linear(3.0, 0.5).with_level_bonus(0.02),
            damage: UpgradableFormula::linear(6.0, 3.0).with_level_bonus(0.1),
            rotation_speed: UpgradableFormula::linear(3.0, 0.5),
            attack_speed: UpgradableFormula::linear(1.0, 0.25).with_level_bonus(0.05),
            aim_duration: UpgradableFormula::constant(0.0),
            accuracy: UpgradableFormula::linear(0.85, 0.03),
            projectile_speed: Some(UpgradableFormula::linear(6.0, 1.0)),
            speed_multiplier: UpgradableFormula::constant(1.0),
            freeze_duration: UpgradableFormula::constant(0.0),
            deceleration: UpgradableFormula::constant(0.0),
            stun_probability: UpgradableFormula::constant(0.0),
            stun_duration: UpgradableFormula::constant(0.0),
            poison_dps: UpgradableFormula::constant(0.0),
            poison_duration: UpgradableFormula::constant(0.0),
            crit_probability: UpgradableFormula::constant(0.05),
            crit_multiplier: UpgradableFormula::constant(1.5),
            aoe_radius: UpgradableFormula::constant(0.0),
            upgrades: BASIC_UPGRADES,
            levels: TOWER_LEVELS,
        }
    }

    /// Catalogue entry for a tower kind.
    #[must_use]
    pub const fn of(kind: TowerKind) -> Self {
        let base = Self::base();
        match kind {
            TowerKind::Basic => base,
            TowerKind::Sniper => Self {
                health: 80.0,
                half_angle: 0.05,
                picker: TargetPicker::Weakest,
                min_range: UpgradableFormula::constant(2.0),
                max_range: UpgradableFormula::linear(7.0, 1.0).with_level_bonus(0.02),
                damage: UpgradableFormula::linear(25.0, 10.0).with_level_bonus(0.1),
                rotation_speed: UpgradableFormula::linear(1.5, 0.3),
                attack_speed: UpgradableFormula::linear(0.3, 0.08),
                aim_duration: UpgradableFormula::linear(1.5, -0.25).with_floor(0.2),
                accuracy: UpgradableFormula::linear(0.95, 0.01),
                projectile_speed: None,
                crit_probability: UpgradableFormula::linear(0.2, 0.02),
                crit_multiplier: UpgradableFormula::constant(2.0),
                upgrades: SNIPER_UPGRADES,
                ..base
            },
            TowerKind::Cannon => Self {
                health: 150.0,
                energy_capacity: 2.0,
                attack_cost: 2.0,
                half_angle: 0.15,
                min_range: UpgradableFormula::constant(1.0),
                max_range: UpgradableFormula::linear(3.5, 0.4).with_level_bonus(0.02),
                damage: UpgradableFormula::quadratic(10.0, 4.0, 0.5).with_level_bonus(0.1),
                rotation_speed: UpgradableFormula::linear(1.0, 0.3),
                attack_speed: UpgradableFormula::linear(0.8, 0.2),
                accuracy: UpgradableFormula::linear(0.9, 0.02),
                projectile_speed: Some(UpgradableFormula::linear(4.0, 0.8)),
                aoe_radius: UpgradableFormula::constant(1.2).with_level_bonus(0.05),
                ..base
            },
            TowerKind::Frost => Self {
                health: 90.0,
                damage: UpgradableFormula::linear(2.0, 1.0).with_level_bonus(0.1),
                speed_multiplier: UpgradableFormula::linear(0.6, -0.08).with_floor(0.2),
                freeze_duration: UpgradableFormula::linear(1.5, 0.5),
                deceleration: UpgradableFormula::linear(2.0, 1.0),
                projectile_speed: Some(UpgradableFormula::linear(5.0, 1.0)),
                upgrades: FROST_UPGRADES,
                ..base
            },
            TowerKind::Shock => Self {
                health: 90.0,
                damage: UpgradableFormula::linear(4.0, 2.0).with_level_bonus(0.1),
                stun_probability: UpgradableFormula::linear(0.15, 0.05),
                stun_duration: UpgradableFormula::linear(0.5, 0.2),
                projectile_speed: Some(UpgradableFormula::linear(7.0, 1.0)),
                upgrades: SHOCK_UPGRADES,
                ..base
            },
            TowerKind::Venom => Self {
                health: 90.0,
                damage: UpgradableFormula::linear(1.0, 0.5),
                poison_dps: UpgradableFormula::linear(3.0, 1.5).with_level_bonus(0.1),
                poison_duration: UpgradableFormula::constant(4.0),
                ..base
            },
        }
    }
}

/// Defence that turns towards mobs in range and fires at them.
#[derive(Clone, Debug)]
pub struct Tower {
    pub(crate) kind: TowerKind,
    pub(crate) profile: TowerProfile,
    pub(crate) upgrades: Vec<(UpgradeKind, u32)>,
    pub(crate) experience: f32,
    pub(crate) energy: Energy,
    pub(crate) orientation: f32,
    pub(crate) target: Option<EntityId>,
    pub(crate) aim: Option<Countdown>,
    pub(crate) invested: f32,
}

impl Tower {
    /// Creates a fresh tower of `kind` with every upgrade at level zero.
    #[must_use]
    pub fn new(kind: TowerKind) -> Self {
        Self::with_profile(kind, TowerProfile::of(kind))
    }

    /// Creates a tower of `kind` using a custom profile.
    #[must_use]
    pub fn with_profile(kind: TowerKind, profile: TowerProfile) -> Self {
        let upgrades = profile.upgrades.iter().map(|upgrade| (*upgrade, 0)).collect();
        let refill = profile.attack_speed.evaluate(0, 0);
        Self {
            kind,
            profile,
            upgrades,
            experience: 0.0,
            energy: Energy::new(profile.energy_capacity, refill),
            orientation: 0.0,
            target: None,
            aim: None,
            invested: kind.price(),
        }
    }

    /// Points the turret at `radians`.
    #[must_use]
    pub fn with_orientation(mut self, radians: f32) -> Self {
        self.orientation = normalize_angle(radians);
        self
    }

    /// Kind of the tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Statistics in effect.
    #[must_use]
    pub const fn profile(&self) -> &TowerProfile {
        &self.profile
    }

    /// Upgrade levels bought so far.
    #[must_use]
    pub fn upgrades(&self) -> &[(UpgradeKind, u32)] {
        &self.upgrades
    }

    /// Level bought for `kind`, or `None` when the tower does not support it.
    #[must_use]
    pub fn upgrade_level(&self, kind: UpgradeKind) -> Option<u32> {
        self.upgrades
            .iter()
            .find(|(upgrade, _)| *upgrade == kind)
            .map(|(_, level)| *level)
    }

    /// Accumulated experience.
    #[must_use]
    pub const fn experience(&self) -> f32 {
        self.experience
    }

    /// Level derived from experience.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.profile.levels.level_for(self.experience)
    }

    /// Energy pool gating shots.
    #[must_use]
    pub const fn energy(&self) -> &Energy {
        &self.energy
    }

    /// Turret orientation in radians.
    #[must_use]
    pub const fn orientation(&self) -> f32 {
        self.orientation
    }

    /// Mob currently targeted.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Gold spent on the tower and its upgrades.
    #[must_use]
    pub const fn invested(&self) -> f32 {
        self.invested
    }

    /// Gold refunded when selling at `ratio`.
    #[must_use]
    pub fn sell_value(&self, ratio: f32) -> f32 {
        self.invested * ratio.clamp(0.0, 1.0)
    }

    /// Cost of the next level of `kind`, or `None` when unsupported.
    #[must_use]
    pub fn next_upgrade_cost(&self, kind: UpgradeKind) -> Option<f32> {
        self.upgrade_level(kind)
            .map(|level| upgrade_cost(kind).evaluate(level + 1))
    }

    fn stat(&self, formula: &UpgradableFormula, upgrade: Option<UpgradeKind>) -> f32 {
        let upgrade_level = upgrade
            .and_then(|kind| self.upgrade_level(kind))
            .unwrap_or(0);
        formula.evaluate(upgrade_level, self.level())
    }

    /// Smallest distance at which the tower engages.
    #[must_use]
    pub fn min_range(&self) -> f32 {
        self.stat(&self.profile.min_range, Some(UpgradeKind::Range))
    }

    /// Largest distance at which the tower engages.
    #[must_use]
    pub fn max_range(&self) -> f32 {
        self.stat(&self.profile.max_range, Some(UpgradeKind::Range))
    }

    /// Radians the turret turns per second.
    #[must_use]
    pub fn rotation_speed(&self) -> f32 {
        self.stat(&self.profile.rotation_speed, Some(UpgradeKind::RotationSpeed))
            .max(0.0)
    }

    /// Energy refilled per second.
    #[must_use]
    pub fn attack_speed(&self) -> f32 {
        self.stat(&self.profile.attack_speed, Some(UpgradeKind::AttackSpeed))
    }

    /// Seconds of aiming required before firing.
    #[must_use]
    pub fn aim_duration(&self) -> f32 {
        self.stat(&self.profile.aim_duration, Some(UpgradeKind::AimSpeed))
            .max(0.0)
    }

    /// Projectile travel speed, or `None` for instant hits.
    #[must_use]
    pub fn projectile_speed(&self) -> Option<f32> {
        self.profile
            .projectile_speed
            .map(|formula| self.stat(&formula, Some(UpgradeKind::ProjectileSpeed)))
    }

    /// Damage bundle delivered by the next shot.
    #[must_use]
    pub fn damage_payload(&self) -> DamagePayload {
        let profile = &self.profile;
        DamagePayload {
            damage: self.stat(&profile.damage, Some(UpgradeKind::Damage)),
            aoe_radius: self.stat(&profile.aoe_radius, None).max(0.0),
            accuracy: self
                .stat(&profile.accuracy, Some(UpgradeKind::Accuracy))
                .clamp(0.0, 1.0),
            speed_multiplier: self
                .stat(&profile.speed_multiplier, Some(UpgradeKind::FreezingPower))
                .clamp(0.0, 1.0),
            freeze_duration: self.stat(&profile.freeze_duration, Some(UpgradeKind::FreezingSpeed)),
            deceleration: self.stat(&profile.deceleration, Some(UpgradeKind::FreezingSpeed)),
            stun_probability: self
                .stat(&profile.stun_probability, Some(UpgradeKind::StunChance))
                .clamp(0.0, 1.0),
            stun_duration: self.stat(&profile.stun_duration, Some(UpgradeKind::StunDuration)),
            poison_dps: self.stat(&profile.poison_dps, Some(UpgradeKind::Damage)),
            poison_duration: self.stat(&profile.poison_duration, None),
            crit_probability: self
                .stat(&profile.crit_probability, Some(UpgradeKind::Accuracy))
                .clamp(0.0, 1.0),
            crit_multiplier: self.stat(&profile.crit_multiplier, None).max(1.0),
        }
    }

    /// Buys one level of `kind` for `cost` gold and returns the new level.
    pub(crate) fn apply_upgrade(&mut self, kind: UpgradeKind, cost: f32) -> Option<u32> {
        let level = self
            .upgrades
            .iter_mut()
            .find(|(upgrade, _)| *upgrade == kind)
            .map(|(_, level)| level)?;
        *level += 1;
        let reached = *level;
        self.invested += cost;
        self.energy.set_refill_rate(self.attack_speed());
        Some(reached)
    }

    pub(crate) fn gain_experience(&mut self, experience: f32) {
        self.experience += experience.max(0.0);
    }

    /// Advances the tower by one tick.
    ///
    /// The tower keeps its target while it stays alive and within range,
    /// turns towards it at its rotation speed, and fires once it is inside
    /// the firing cone, has finished aiming, and can pay the attack cost.
    pub(crate) fn step(
        &mut self,
        id: EntityId,
        position: Position,
        owner: Option<OwnerId>,
        info: &mut StepInfo<'_>,
        mobs: &mut Arena<Mob>,
    ) {
        self.energy.set_refill_rate(self.attack_speed());
        self.energy.refill(info.elapsed);

        let Some((target, target_position)) = self.acquire(position, owner, info, mobs) else {
            return;
        };

        let desired = heading(target_position - position);
        let max_turn = self.rotation_speed() * info.elapsed;
        let delta = normalize_angle(desired - self.orientation);
        self.orientation = if delta.abs() <= max_turn {
            normalize_angle(desired)
        } else {
            normalize_angle(self.orientation + max_turn.copysign(delta))
        };

        let misalignment = normalize_angle(desired - self.orientation).abs();
        if misalignment > self.profile.half_angle {
            self.aim = None;
            return;
        }

        let aim_duration = self.aim_duration();
        let aim = *self
            .aim
            .get_or_insert_with(|| Countdown::new(info.now, aim_duration));
        if aim.is_active(info.end_of_tick()) {
            return;
        }
        if !self.energy.try_spend(self.profile.attack_cost) {
            return;
        }

        self.fire(id, position, owner, target, target_position, info, mobs);
    }

    /// Keeps the current target if still valid, otherwise picks a new one.
    fn acquire(
        &mut self,
        position: Position,
        owner: Option<OwnerId>,
        info: &StepInfo<'_>,
        mobs: &Arena<Mob>,
    ) -> Option<(EntityId, Position)> {
        let min_range = self.min_range();
        let max_range = self.max_range();
        let in_range = |mob: &Mob| {
            let distance = mob.position().distance(position);
            mob.is_live() && distance >= min_range && distance <= max_range
        };

        if let Some(current) = self.target {
            if let Some(mob) = mobs.get(current).filter(|mob| in_range(mob)) {
                return Some((current, mob.position()));
            }
            self.target = None;
            self.aim = None;
        }

        let filter = owner.map_or(OwnerFilter::Any, OwnerFilter::Exclude);
        let candidates: Vec<(EntityId, f32)> = info
            .locator
            .mobs_around(position, max_range, filter)
            .into_iter()
            .filter_map(|id| {
                mobs.get(id)
                    .filter(|mob| in_range(mob))
                    .map(|mob| (id, mob.vitals().current()))
            })
            .collect();

        let chosen = self.profile.picker.pick(&candidates)?;
        self.target = Some(chosen);
        mobs.get(chosen).map(|mob| (chosen, mob.position()))
    }

    #[allow(clippy::too_many_arguments)]
    fn fire(
        &mut self,
        id: EntityId,
        position: Position,
        owner: Option<OwnerId>,
        target: EntityId,
        target_position: Position,
        info: &mut StepInfo<'_>,
        mobs: &mut Arena<Mob>,
    ) {
        let mut payload = self.damage_payload();
        match self.projectile_speed() {
            Some(speed) => {
                info.spawned_projectiles.push(Projectile::new(
                    position,
                    owner,
                    target,
                    target_position,
                    Some(id),
                    speed,
                    payload,
                ));
            }
            None => {
                if info.rng.gen::<f32>() < payload.crit_probability {
                    payload.damage *= payload.crit_multiplier;
                }
                let Some(mob) = mobs.get_mut(target) else {
                    return;
                };
                mob.note_attacker(Some(id));
                if mob.hit(&payload, info.rng, info.now).killed() {
                    let experience = mob.experience_reward();
                    info.record_kill(target, mob.bounty(), experience, None);
                    self.gain_experience(experience);
                }
            }
        }
    }

    pub(crate) fn pause(&mut self, now: f64) {
        if let Some(aim) = self.aim.as_mut() {
            aim.pause(now);
        }
    }

    pub(crate) fn resume(&mut self, now: f64) {
        if let Some(aim) = self.aim.as_mut() {
            aim.resume(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weakest_picker_prefers_low_health_then_proximity() {
        let a = EntityId::new(0, 0);
        let b = EntityId::new(1, 0);
        let c = EntityId::new(2, 0);
        let candidates = [(a, 10.0), (b, 4.0), (c, 4.0)];
        assert_eq!(TargetPicker::Weakest.pick(&candidates), Some(b));
        assert_eq!(TargetPicker::Closest.pick(&candidates), Some(a));
        assert_eq!(TargetPicker::Closest.pick(&[]), None);
    }

    #[test]
    fn new_tower_supports_catalogue_upgrades_only() {
        let tower = Tower::new(TowerKind::Frost);
        assert_eq!(tower.upgrade_level(UpgradeKind::FreezingPower), Some(0));
        assert_eq!(tower.upgrade_level(UpgradeKind::StunChance), None);
        assert_eq!(tower.next_upgrade_cost(UpgradeKind::StunChance), None);
        assert_eq!(tower.invested(), TowerKind::Frost.price());
    }

    #[test]
    fn upgrades_raise_stats_and_investment() {
        let mut tower = Tower::new(TowerKind::Basic);
        let before = tower.max_range();
        let cost = tower
            .next_upgrade_cost(UpgradeKind::Range)
            .expect("basic towers upgrade range");

        assert_eq!(tower.apply_upgrade(UpgradeKind::Range, cost), Some(1));
        assert!(tower.max_range() > before);
        assert_eq!(tower.invested(), TowerKind::Basic.price() + cost);
        assert_eq!(tower.sell_value(0.5), tower.invested() * 0.5);
    }

    #[test]
    fn upgrade_costs_respect_floor_and_grow() {
        let cost = upgrade_cost(UpgradeKind::Damage);
        assert_eq!(cost.evaluate(1), 25.0);
        assert!(cost.evaluate(5) > cost.evaluate(4));
    }

    #[test]
    fn experience_levels_feed_formulas() {
        let mut tower = Tower::new(TowerKind::Basic);
        let fresh = tower.damage_payload().damage;
        tower.gain_experience(35.0);
        assert_eq!(tower.level(), 3);
        assert!(tower.damage_payload().damage > fresh);
    }

    #[test]
    fn sniper_hits_instantly_after_aiming() {
        let tower = Tower::new(TowerKind::Sniper);
        assert_eq!(tower.projectile_speed(), None);
        assert!(tower.aim_duration() > 0.0);
        assert!(Tower::new(TowerKind::Basic).projectile_speed().is_some());
    }

    #[test]
    fn payload_reflects_tower_specialisation() {
        assert!(Tower::new(TowerKind::Frost).damage_payload().slows());
        assert!(Tower::new(TowerKind::Shock).damage_payload().may_stun());
        assert!(Tower::new(TowerKind::Venom).damage_payload().poisons());
        assert!(Tower::new(TowerKind::Cannon).damage_payload().aoe_radius > 0.0);
        assert!(!Tower::new(TowerKind::Basic).damage_payload().slows());
    }
}
