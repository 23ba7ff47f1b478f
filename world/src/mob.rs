//! Hostile mobs: objective selection, movement, status effects and hit resolution.

use bulwark_core::{
    Arena, DamagePayload, Energy, Entity, EntityId, EntityKind, Event, Handle, MobKind, OwnerFilter,
    OwnerId, Position, Vitals,
};
use bulwark_system_pathfinding::{Path, PathRequest};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{
    block::{Block, BlockPayload},
    context::StepInfo,
    effect::Countdown,
};

/// Maximum number of poison stacks a mob can carry.
pub const POISON_STACK_LIMIT: u32 = 5;

/// Fraction of the shielded damage that wears the shield down.
const SHIELD_WEAR: f32 = 0.01;

/// Order in which objective kinds are attempted.
const OBJECTIVE_PRIORITY: [EntityKind; 3] = [EntityKind::Portal, EntityKind::Wall, EntityKind::Tower];

/// Shield and immunity profile of a mob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Defense {
    /// Fraction of incoming damage the shield covers.
    pub shield: f32,
    /// Fraction of the covered damage the shield absorbs.
    pub efficiency: f32,
    /// Remaining shield integrity; the shield stops absorbing at zero.
    pub durability: f32,
    /// Whether poison takes hold.
    pub poisonable: bool,
    /// Whether slows take hold.
    pub slowable: bool,
    /// Whether stuns take hold.
    pub stunnable: bool,
}

impl Defense {
    /// No shield and no immunities.
    #[must_use]
    pub const fn unshielded() -> Self {
        Self {
            shield: 0.0,
            efficiency: 0.0,
            durability: 0.0,
            poisonable: true,
            slowable: true,
            stunnable: true,
        }
    }

    /// Absorbs part of `damage`, wears the shield, and returns the absorbed amount.
    fn absorb(&mut self, damage: f32) -> f32 {
        if self.durability <= 0.0 || damage <= 0.0 {
            return 0.0;
        }
        let absorbed = (damage * self.shield * self.efficiency).clamp(0.0, damage);
        self.durability = (self.durability - SHIELD_WEAR * absorbed).max(0.0);
        absorbed
    }
}

/// Static statistics of a mob kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobProfile {
    /// Cells per second at full speed.
    pub speed: f32,
    /// Rate at which speed recovers, in cells per second squared.
    pub acceleration: f32,
    /// Footprint size.
    pub radius: f32,
    /// Multiplier applied to the wave's per-mob health.
    pub health_factor: f32,
    /// Energy pool capacity.
    pub energy_capacity: f32,
    /// Energy regained per second.
    pub energy_refill: f32,
    /// Energy spent per attack on a defence.
    pub attack_cost: f32,
    /// Damage dealt per attack on a defence.
    pub attack_damage: f32,
    /// Distance from a defence's centre at which attacks land.
    pub reach: f32,
    /// Gold paid per point of total health when killed.
    pub bounty_scaling: f32,
    /// Experience granted to the tower that kills the mob.
    pub experience: f32,
    /// Portal lives taken on breach.
    pub lives_cost: u32,
    /// Shield and immunities.
    pub defense: Defense,
}

impl MobProfile {
    /// Catalogue entry for a mob kind.
    #[must_use]
    pub const fn of(kind: MobKind) -> Self {
        match kind {
            MobKind::Crawler => Self {
                speed: 1.0,
                acceleration: 2.0,
                radius: 0.6,
                health_factor: 1.0,
                energy_capacity: 2.0,
                energy_refill: 1.0,
                attack_cost: 1.0,
                attack_damage: 5.0,
                reach: 0.9,
                bounty_scaling: 0.1,
                experience: 1.0,
                lives_cost: 1,
                defense: Defense::unshielded(),
            },
            MobKind::Runner => Self {
                speed: 2.0,
                acceleration: 4.0,
                radius: 0.5,
                health_factor: 0.6,
                energy_capacity: 1.0,
                energy_refill: 1.0,
                attack_cost: 1.0,
                attack_damage: 3.0,
                reach: 0.9,
                bounty_scaling: 0.12,
                experience: 1.0,
                lives_cost: 1,
                defense: Defense::unshielded(),
            },
            MobKind::Brute => Self {
                speed: 0.6,
                acceleration: 1.0,
                radius: 0.8,
                health_factor: 2.5,
                energy_capacity: 4.0,
                energy_refill: 1.0,
                attack_cost: 2.0,
                attack_damage: 15.0,
                reach: 1.0,
                bounty_scaling: 0.08,
                experience: 3.0,
                lives_cost: 3,
                defense: Defense {
                    stunnable: false,
                    ..Defense::unshielded()
                },
            },
            MobKind::Warden => Self {
                speed: 0.9,
                acceleration: 1.5,
                radius: 0.7,
                health_factor: 1.5,
                energy_capacity: 2.0,
                energy_refill: 0.5,
                attack_cost: 1.0,
                attack_damage: 6.0,
                reach: 0.95,
                bounty_scaling: 0.15,
                experience: 2.0,
                lives_cost: 2,
                defense: Defense {
                    shield: 0.6,
                    efficiency: 0.5,
                    durability: 1.0,
                    poisonable: false,
                    slowable: false,
                    stunnable: false,
                },
            },
        }
    }
}

/// What a mob is currently trying to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Behavior {
    /// No objective; a new one is chosen on the next tick.
    #[default]
    Idle,
    /// Walking towards a portal to breach it.
    SeekingPortal {
        /// Portal being approached.
        portal: EntityId,
    },
    /// Walking towards, or attacking, a wall or tower.
    BreakingDefense {
        /// Defence being attacked.
        target: EntityId,
    },
}

impl Behavior {
    fn objective(self) -> Option<EntityId> {
        match self {
            Self::Idle => None,
            Self::SeekingPortal { portal } => Some(portal),
            Self::BreakingDefense { target } => Some(target),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Freeze {
    pub(crate) multiplier: f32,
    pub(crate) deceleration: f32,
    pub(crate) timer: Countdown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Poison {
    pub(crate) dps: f32,
    pub(crate) stacks: u32,
    pub(crate) timer: Countdown,
}

/// Movement speed and active status effects of a mob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Status {
    base_speed: f32,
    speed: f32,
    acceleration: f32,
    pub(crate) freeze: Option<Freeze>,
    pub(crate) stun: Option<Countdown>,
    pub(crate) poison: Option<Poison>,
}

impl Status {
    /// Creates a status moving at full `base_speed` with no effects.
    #[must_use]
    pub fn new(base_speed: f32, acceleration: f32) -> Self {
        let base_speed = base_speed.max(0.0);
        Self {
            base_speed,
            speed: base_speed,
            acceleration: acceleration.max(0.0),
            freeze: None,
            stun: None,
            poison: None,
        }
    }

    pub(crate) fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Speed without effects.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Current speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed recovery rate.
    #[must_use]
    pub const fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Active slow multiplier at `now`, `1.0` when not slowed.
    #[must_use]
    pub fn freeze_multiplier(&self, now: f64) -> f32 {
        self.freeze
            .filter(|freeze| freeze.timer.is_active(now))
            .map_or(1.0, |freeze| freeze.multiplier)
    }

    /// Seconds of slow left at `now`.
    #[must_use]
    pub fn freeze_remaining(&self, now: f64) -> f32 {
        self.freeze
            .map_or(0.0, |freeze| freeze.timer.remaining_at(now))
    }

    /// Reports whether the mob is stunned at `now`.
    #[must_use]
    pub fn is_stunned(&self, now: f64) -> bool {
        self.stun.is_some_and(|stun| stun.is_active(now))
    }

    /// Seconds of stun left at `now`.
    #[must_use]
    pub fn stun_remaining(&self, now: f64) -> f32 {
        self.stun.map_or(0.0, |stun| stun.remaining_at(now))
    }

    /// Poison damage per second at `now`.
    #[must_use]
    pub fn poison_dps(&self, now: f64) -> f32 {
        self.poison
            .filter(|poison| poison.timer.is_active(now))
            .map_or(0.0, |poison| poison.dps)
    }

    /// Number of poison stacks currently applied.
    #[must_use]
    pub fn poison_stacks(&self) -> u32 {
        self.poison.map_or(0, |poison| poison.stacks)
    }

    /// Seconds of poison left at `now`.
    #[must_use]
    pub fn poison_remaining(&self, now: f64) -> f32 {
        self.poison
            .map_or(0.0, |poison| poison.timer.remaining_at(now))
    }

    fn target_speed(&self, now: f64) -> f32 {
        if self.is_stunned(now) {
            0.0
        } else {
            self.base_speed * self.freeze_multiplier(now)
        }
    }

    /// Moves the current speed towards its target at the configured rates.
    fn update_speed(&mut self, now: f64, elapsed: f32) {
        let target = self.target_speed(now);
        if self.speed > target {
            let deceleration = self
                .freeze
                .filter(|freeze| freeze.timer.is_active(now) && freeze.deceleration > 0.0)
                .map_or(self.acceleration, |freeze| freeze.deceleration);
            self.speed = (self.speed - deceleration * elapsed).max(target);
        } else {
            self.speed = (self.speed + self.acceleration * elapsed).min(target);
        }
    }

    fn apply_freeze(&mut self, multiplier: f32, deceleration: f32, duration: f32, now: f64) {
        let multiplier = multiplier.clamp(0.0, 1.0);
        let stronger = self.freeze_multiplier(now) > multiplier || !self.is_frozen(now);
        if stronger {
            self.freeze = Some(Freeze {
                multiplier,
                deceleration: deceleration.max(0.0),
                timer: Countdown::new(now, duration),
            });
        }
    }

    fn is_frozen(&self, now: f64) -> bool {
        self.freeze.is_some_and(|freeze| freeze.timer.is_active(now))
    }

    fn apply_stun(&mut self, duration: f32, now: f64) {
        let candidate = Countdown::new(now, duration);
        let later = self
            .stun
            .filter(|stun| stun.is_active(now))
            .map_or(true, |stun| candidate.end() > stun.end());
        if later {
            self.stun = Some(candidate);
        }
    }

    fn apply_poison(&mut self, dps: f32, duration: f32, now: f64) {
        if !self.poison.is_some_and(|poison| poison.timer.is_active(now)) {
            self.poison = None;
        }
        let poison = self.poison.get_or_insert(Poison {
            dps: 0.0,
            stacks: 0,
            timer: Countdown::new(now, 0.0),
        });

        if poison.stacks < POISON_STACK_LIMIT {
            poison.dps += dps * 0.5_f32.powi(poison.stacks as i32);
            poison.stacks += 1;
        }

        let candidate = Countdown::new(now, duration);
        if candidate.end() > poison.timer.end() {
            poison.timer = candidate;
        }
    }

    /// Poison damage dealt over the tick starting at `now`.
    fn poison_damage(&self, now: f64, elapsed: f32) -> f32 {
        self.poison
            .filter(|poison| poison.timer.is_active(now))
            .map_or(0.0, |poison| {
                poison.dps * elapsed.min(poison.timer.remaining_at(now))
            })
    }

    /// Drops effects that ran out before `now`.
    fn expire(&mut self, now: f64) {
        if self.freeze.is_some_and(|freeze| !freeze.timer.is_active(now)) {
            self.freeze = None;
        }
        if self.stun.is_some_and(|stun| !stun.is_active(now)) {
            self.stun = None;
        }
        if self.poison.is_some_and(|poison| !poison.timer.is_active(now)) {
            self.poison = None;
        }
    }

    pub(crate) fn pause(&mut self, now: f64) {
        if let Some(freeze) = self.freeze.as_mut() {
            freeze.timer.pause(now);
        }
        if let Some(stun) = self.stun.as_mut() {
            stun.pause(now);
        }
        if let Some(poison) = self.poison.as_mut() {
            poison.timer.pause(now);
        }
    }

    pub(crate) fn resume(&mut self, now: f64) {
        if let Some(freeze) = self.freeze.as_mut() {
            freeze.timer.resume(now);
        }
        if let Some(stun) = self.stun.as_mut() {
            stun.resume(now);
        }
        if let Some(poison) = self.poison.as_mut() {
            poison.timer.resume(now);
        }
    }
}

/// Result of a single hit on a mob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitOutcome {
    /// The accuracy roll failed; nothing happened.
    Missed,
    /// The hit landed.
    Landed {
        /// Health removed.
        dealt: f32,
        /// Damage soaked by the shield.
        absorbed: f32,
        /// Whether this hit took the mob from alive to dead.
        killed: bool,
    },
}

impl HitOutcome {
    /// Reports whether the hit killed the mob.
    #[must_use]
    pub const fn killed(&self) -> bool {
        matches!(self, Self::Landed { killed: true, .. })
    }
}

/// Hostile unit walking towards portals and breaking defences on the way.
#[derive(Clone, Debug)]
pub struct Mob {
    pub(crate) kind: MobKind,
    pub(crate) position: Position,
    pub(crate) radius: f32,
    pub(crate) vitals: Vitals,
    pub(crate) energy: Energy,
    pub(crate) behavior: Behavior,
    pub(crate) path: Option<Path>,
    pub(crate) bounty_scaling: f32,
    pub(crate) experience: f32,
    pub(crate) lives_cost: u32,
    pub(crate) attack_cost: f32,
    pub(crate) attack_damage: f32,
    pub(crate) reach: f32,
    pub(crate) defense: Defense,
    pub(crate) status: Status,
    pub(crate) last_attacker: Option<EntityId>,
}

impl Mob {
    /// Creates a mob of `kind` with `health` total health using its catalogue profile.
    #[must_use]
    pub fn new(kind: MobKind, position: Position, health: f32) -> Self {
        let profile = MobProfile::of(kind);
        Self {
            kind,
            position,
            radius: profile.radius,
            vitals: Vitals::new(health),
            energy: Energy::new(profile.energy_capacity, profile.energy_refill),
            behavior: Behavior::Idle,
            path: None,
            bounty_scaling: profile.bounty_scaling,
            experience: profile.experience,
            lives_cost: profile.lives_cost,
            attack_cost: profile.attack_cost,
            attack_damage: profile.attack_damage,
            reach: profile.reach,
            defense: profile.defense,
            status: Status::new(profile.speed, profile.acceleration),
            last_attacker: None,
        }
    }

    /// Overrides the shield and immunity profile.
    #[must_use]
    pub const fn with_defense(mut self, defense: Defense) -> Self {
        self.defense = defense;
        self
    }

    /// Overrides the portal lives taken on breach.
    #[must_use]
    pub const fn with_lives_cost(mut self, lives_cost: u32) -> Self {
        self.lives_cost = lives_cost;
        self
    }

    /// Kind of the mob.
    #[must_use]
    pub const fn kind(&self) -> MobKind {
        self.kind
    }

    /// Current objective.
    #[must_use]
    pub const fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Route being walked, if any.
    #[must_use]
    pub const fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Movement and effect state.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Shield and immunity profile.
    #[must_use]
    pub const fn defense(&self) -> &Defense {
        &self.defense
    }

    /// Energy pool gating attacks.
    #[must_use]
    pub const fn energy(&self) -> &Energy {
        &self.energy
    }

    /// Gold paid when the mob is killed.
    #[must_use]
    pub fn bounty(&self) -> f32 {
        self.bounty_scaling * self.vitals.total()
    }

    /// Experience granted to the tower that kills the mob.
    #[must_use]
    pub const fn experience_reward(&self) -> f32 {
        self.experience
    }

    /// Portal lives taken on breach.
    #[must_use]
    pub const fn lives_cost(&self) -> u32 {
        self.lives_cost
    }

    /// Orientation of travel in radians.
    #[must_use]
    pub fn orientation(&self) -> f32 {
        self.path
            .as_ref()
            .and_then(|path| {
                let cursor = usize::try_from(path.cursor().max(0)).ok()?;
                path.segments().get(cursor)
            })
            .map_or(0.0, |segment| bulwark_core::heading(segment.direction()))
    }

    /// Resolves a hit carrying `payload` at `now`.
    ///
    /// An accuracy roll may miss entirely. A landed hit is partly absorbed by
    /// the shield, then slow, stun and poison are applied independently
    /// according to the mob's immunities.
    pub fn hit(&mut self, payload: &DamagePayload, rng: &mut ChaCha8Rng, now: f64) -> HitOutcome {
        if rng.gen::<f32>() >= payload.accuracy {
            return HitOutcome::Missed;
        }

        let was_alive = !self.vitals.is_dead();
        let absorbed = self.defense.absorb(payload.damage);
        let dealt = self.vitals.damage(payload.damage - absorbed);

        if self.defense.slowable && payload.slows() {
            self.status.apply_freeze(
                payload.speed_multiplier,
                payload.deceleration,
                payload.freeze_duration,
                now,
            );
        }
        if self.defense.stunnable
            && payload.may_stun()
            && rng.gen::<f32>() < payload.stun_probability
        {
            self.status.apply_stun(payload.stun_duration, now);
        }
        if self.defense.poisonable && payload.poisons() {
            self.status
                .apply_poison(payload.poison_dps, payload.poison_duration, now);
        }

        HitOutcome::Landed {
            dealt,
            absorbed,
            killed: was_alive && self.vitals.is_dead(),
        }
    }

    /// Records the tower responsible for the latest hit.
    pub(crate) fn note_attacker(&mut self, tower: Option<EntityId>) {
        if tower.is_some() {
            self.last_attacker = tower;
        }
    }

    /// Advances the mob by one tick.
    pub(crate) fn step(&mut self, id: EntityId, info: &mut StepInfo<'_>, blocks: &mut Arena<Block>) {
        if self.vitals.is_deleted() {
            return;
        }

        let now = info.now;
        let elapsed = info.elapsed;
        self.energy.refill(elapsed);
        self.status.update_speed(now, elapsed);

        let poison = self.status.poison_damage(now, elapsed);
        if poison > 0.0 {
            let was_alive = !self.vitals.is_dead();
            let _ = self.vitals.damage(poison);
            if was_alive && self.vitals.is_dead() {
                info.record_kill(id, self.bounty(), self.experience, self.last_attacker);
            }
        }
        self.status.expire(info.end_of_tick());

        if self.vitals.is_dead() {
            self.vitals.mark_for_deletion();
            return;
        }

        if info.replan || !self.objective_is_live(blocks) {
            self.clear_objective();
        }
        if self.behavior == Behavior::Idle {
            self.choose_objective(info);
        }
        if self.behavior == Behavior::Idle {
            return;
        }

        let threshold = self.arrival_threshold(info);
        let Some(mut path) = self.path.take() else {
            self.behavior = Behavior::Idle;
            return;
        };
        if path.en_route(threshold) {
            self.position = path.advance(self.status.speed(), elapsed, threshold);
        }
        let arrived = !path.en_route(threshold);
        self.path = Some(path);
        if arrived {
            self.arrive(id, info, blocks);
        }
    }

    fn objective_is_live(&self, blocks: &Arena<Block>) -> bool {
        self.behavior
            .objective()
            .and_then(|target| blocks.get(target))
            .is_some_and(|block| block.is_live())
    }

    fn clear_objective(&mut self) {
        self.behavior = Behavior::Idle;
        self.path = None;
    }

    fn arrival_threshold(&self, info: &StepInfo<'_>) -> f32 {
        match self.behavior {
            Behavior::SeekingPortal { .. } => info.config.portal_reach,
            Behavior::BreakingDefense { .. } | Behavior::Idle => self.reach,
        }
    }

    /// Plans a route to the nearest reachable portal, then wall, then tower.
    ///
    /// Only the `objective_candidates` nearest entities of each kind are
    /// tried; if all of them are unreachable the next kind is considered.
    fn choose_objective(&mut self, info: &StepInfo<'_>) {
        let candidates = info.config.navigation.objective_candidates.max(1);
        for kind in OBJECTIVE_PRIORITY {
            let targets = info
                .locator
                .nearest_of(self.position, kind, OwnerFilter::Any, candidates);
            for target in targets {
                let Some(entry) = info.locator.entry(Handle::new(kind, target)) else {
                    continue;
                };

                let mut request =
                    PathRequest::new(self.position, entry.position).approaching_solid_target();
                if let Some(limit) = info.config.navigation.max_path_distance {
                    request = request.with_max_distance(limit);
                }

                match info.path_finder.find(&info.locator, &request) {
                    Ok(path) => {
                        self.behavior = if kind == EntityKind::Portal {
                            Behavior::SeekingPortal { portal: target }
                        } else {
                            Behavior::BreakingDefense { target }
                        };
                        self.path = Some(path);
                        tracing::debug!(?kind, ?target, "mob chose objective");
                        return;
                    }
                    Err(error) => {
                        tracing::debug!(?kind, ?target, %error, "objective unreachable");
                    }
                }
            }
        }
        tracing::debug!(position = ?self.position, "mob has no reachable objective");
    }

    fn arrive(&mut self, id: EntityId, info: &mut StepInfo<'_>, blocks: &mut Arena<Block>) {
        match self.behavior {
            Behavior::Idle => {}
            Behavior::SeekingPortal { portal } => {
                let Some(block) = blocks.get_mut(portal) else {
                    self.clear_objective();
                    return;
                };
                let BlockPayload::Portal(gate) = &mut block.payload else {
                    self.clear_objective();
                    return;
                };

                let before = gate.lives;
                gate.lives = gate.lives.saturating_sub(self.lives_cost);
                info.events.push(Event::MobBreached {
                    mob: id,
                    portal,
                    lives_remaining: gate.lives,
                });
                tracing::info!(?portal, lives = gate.lives, "mob breached portal");
                if before > 0 && gate.lives == 0 {
                    info.events.push(Event::PortalDepleted { portal });
                    tracing::info!(?portal, "portal depleted");
                }
                self.vitals.mark_for_deletion();
            }
            Behavior::BreakingDefense { target } => {
                if !self.energy.try_spend(self.attack_cost) {
                    return;
                }
                let Some(block) = blocks.get_mut(target) else {
                    self.clear_objective();
                    return;
                };
                let _ = block.vitals.damage(self.attack_damage);
                if block.vitals.is_dead() {
                    block.vitals.mark_for_deletion();
                    let destroyed = Handle::new(block.kind(), target);
                    info.events.push(Event::BlockDestroyed { block: destroyed });
                    info.blocks_changed = true;
                    tracing::info!(block = ?destroyed, "defence destroyed");
                    self.clear_objective();
                }
            }
        }
    }

    pub(crate) fn pause(&mut self, now: f64) {
        self.status.pause(now);
    }

    pub(crate) fn resume(&mut self, now: f64) {
        self.status.resume(now);
    }
}

impl Entity for Mob {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn owner(&self) -> Option<OwnerId> {
        None
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn shielded() -> Defense {
        Defense {
            shield: 1.0,
            efficiency: 0.5,
            durability: 1.0,
            ..Defense::unshielded()
        }
    }

    #[test]
    fn shield_absorbs_half_and_wears_by_one_percent() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 20.0).with_defense(shielded());
        let outcome = mob.hit(&DamagePayload::plain(10.0), &mut rng(), 0.0);

        assert_eq!(
            outcome,
            HitOutcome::Landed {
                dealt: 5.0,
                absorbed: 5.0,
                killed: false
            }
        );
        assert_eq!(mob.vitals().current(), 15.0);
        assert!((mob.defense().durability - 0.95).abs() < 1e-6);
        assert!(mob.health_ratio() > 0.0);
    }

    #[test]
    fn worn_out_shield_stops_absorbing() {
        let defense = Defense {
            durability: 0.0,
            ..shielded()
        };
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 20.0).with_defense(defense);
        let _ = mob.hit(&DamagePayload::plain(10.0), &mut rng(), 0.0);
        assert_eq!(mob.vitals().current(), 10.0);
    }

    #[test]
    fn zero_accuracy_always_misses() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 20.0);
        let payload = DamagePayload {
            accuracy: 0.0,
            ..DamagePayload::plain(10.0)
        };
        assert_eq!(mob.hit(&payload, &mut rng(), 0.0), HitOutcome::Missed);
        assert_eq!(mob.vitals().current(), 20.0);
    }

    #[test]
    fn only_the_killing_hit_reports_a_kill() {
        let mut mob = Mob::new(MobKind::Runner, Position::ZERO, 5.0);
        let mut rng = rng();
        assert!(mob.hit(&DamagePayload::plain(8.0), &mut rng, 0.0).killed());
        assert!(!mob.hit(&DamagePayload::plain(8.0), &mut rng, 0.0).killed());
    }

    #[test]
    fn poison_stacks_fall_off_geometrically() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 100.0);
        let payload = DamagePayload {
            poison_dps: 4.0,
            poison_duration: 3.0,
            ..DamagePayload::plain(0.0)
        };
        let mut rng = rng();
        for _ in 0..3 {
            let _ = mob.hit(&payload, &mut rng, 0.0);
        }
        assert_eq!(mob.status().poison_stacks(), 3);
        assert!((mob.status().poison_dps(0.0) - (4.0 + 2.0 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn poison_stacks_are_capped() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 100.0);
        let payload = DamagePayload {
            poison_dps: 1.0,
            poison_duration: 3.0,
            ..DamagePayload::plain(0.0)
        };
        let mut rng = rng();
        for _ in 0..(POISON_STACK_LIMIT + 4) {
            let _ = mob.hit(&payload, &mut rng, 0.0);
        }
        assert_eq!(mob.status().poison_stacks(), POISON_STACK_LIMIT);
        let expected: f32 = (0..POISON_STACK_LIMIT).map(|n| 0.5_f32.powi(n as i32)).sum();
        assert!((mob.status().poison_dps(0.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn poison_refresh_keeps_the_later_end() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 100.0);
        let long = DamagePayload {
            poison_dps: 1.0,
            poison_duration: 5.0,
            ..DamagePayload::plain(0.0)
        };
        let short = DamagePayload {
            poison_duration: 1.0,
            ..long
        };
        let mut rng = rng();
        let _ = mob.hit(&long, &mut rng, 0.0);
        let _ = mob.hit(&short, &mut rng, 1.0);
        assert_eq!(mob.status().poison_remaining(1.0), 4.0);
        assert_eq!(mob.status().poison_stacks(), 2);
    }

    #[test]
    fn weaker_freeze_does_not_override_stronger_one() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 100.0);
        let strong = DamagePayload {
            speed_multiplier: 0.3,
            freeze_duration: 2.0,
            deceleration: 5.0,
            ..DamagePayload::plain(0.0)
        };
        let weak = DamagePayload {
            speed_multiplier: 0.8,
            freeze_duration: 10.0,
            ..strong
        };
        let mut rng = rng();
        let _ = mob.hit(&strong, &mut rng, 0.0);
        let _ = mob.hit(&weak, &mut rng, 0.5);
        assert_eq!(mob.status().freeze_multiplier(0.5), 0.3);
        assert_eq!(mob.status().freeze_remaining(0.5), 1.5);
    }

    #[test]
    fn immune_mob_ignores_slow_and_stun() {
        let mut mob = Mob::new(MobKind::Warden, Position::ZERO, 100.0);
        let payload = DamagePayload {
            speed_multiplier: 0.2,
            freeze_duration: 2.0,
            stun_probability: 1.0,
            stun_duration: 2.0,
            ..DamagePayload::plain(0.0)
        };
        let _ = mob.hit(&payload, &mut rng(), 0.0);
        assert_eq!(mob.status().freeze_multiplier(0.0), 1.0);
        assert!(!mob.status().is_stunned(0.0));
    }

    #[test]
    fn stun_only_extends_to_a_later_end() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 100.0);
        let long = DamagePayload {
            stun_probability: 1.0,
            stun_duration: 3.0,
            ..DamagePayload::plain(0.0)
        };
        let short = DamagePayload {
            stun_duration: 0.5,
            ..long
        };
        let mut rng = rng();
        let _ = mob.hit(&long, &mut rng, 0.0);
        let _ = mob.hit(&short, &mut rng, 1.0);
        assert_eq!(mob.status().stun_remaining(1.0), 2.0);
    }

    #[test]
    fn speed_approaches_target_at_configured_rates() {
        let mut status = Status::new(2.0, 1.0);
        status.apply_freeze(0.5, 4.0, 10.0, 0.0);

        status.update_speed(0.0, 0.1);
        assert!((status.speed() - 1.6).abs() < 1e-6);
        status.update_speed(0.1, 1.0);
        assert_eq!(status.speed(), 1.0);

        status.expire(20.0);
        status.update_speed(20.0, 0.5);
        assert!((status.speed() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn pause_and_resume_preserve_effect_durations() {
        let mut mob = Mob::new(MobKind::Crawler, Position::ZERO, 100.0);
        let payload = DamagePayload {
            speed_multiplier: 0.5,
            freeze_duration: 4.0,
            stun_probability: 1.0,
            stun_duration: 2.0,
            poison_dps: 1.0,
            poison_duration: 3.0,
            ..DamagePayload::plain(0.0)
        };
        let _ = mob.hit(&payload, &mut rng(), 10.0);

        mob.pause(11.0);
        mob.resume(11.0);
        assert_eq!(mob.status().freeze_remaining(11.0), 3.0);
        assert_eq!(mob.status().stun_remaining(11.0), 1.0);
        assert_eq!(mob.status().poison_remaining(11.0), 2.0);

        mob.pause(11.0);
        mob.resume(40.0);
        assert_eq!(mob.status().freeze_remaining(40.0), 3.0);
        assert_eq!(mob.status().stun_remaining(40.0), 1.0);
        assert_eq!(mob.status().poison_remaining(40.0), 2.0);
    }
}
