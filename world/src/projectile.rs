//! Projectiles fired by towers.

use bulwark_core::{Arena, DamagePayload, Entity, EntityId, OwnerFilter, OwnerId, Position, Vitals};
use rand::Rng;

use crate::{context::StepInfo, mob::Mob};

const PROJECTILE_RADIUS: f32 = 0.1;

/// Shot travelling towards a mob, homing while the mob stays alive.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub(crate) position: Position,
    pub(crate) owner: Option<OwnerId>,
    pub(crate) vitals: Vitals,
    pub(crate) speed: f32,
    pub(crate) destination: Position,
    pub(crate) target: Option<EntityId>,
    pub(crate) tower: Option<EntityId>,
    pub(crate) payload: DamagePayload,
}

impl Projectile {
    /// Creates a projectile at `position` heading for `target`.
    #[must_use]
    pub fn new(
        position: Position,
        owner: Option<OwnerId>,
        target: EntityId,
        destination: Position,
        tower: Option<EntityId>,
        speed: f32,
        payload: DamagePayload,
    ) -> Self {
        Self {
            position,
            owner,
            vitals: Vitals::new(1.0),
            speed: speed.max(0.0),
            destination,
            target: Some(target),
            tower,
            payload,
        }
    }

    /// Point the projectile is flying to.
    #[must_use]
    pub const fn destination(&self) -> Position {
        self.destination
    }

    /// Mob being homed on, until it dies or the projectile is reloaded.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Tower that fired the projectile.
    #[must_use]
    pub const fn tower(&self) -> Option<EntityId> {
        self.tower
    }

    /// Travel speed in cells per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Damage delivered on impact.
    #[must_use]
    pub const fn payload(&self) -> &DamagePayload {
        &self.payload
    }

    /// Flight direction in radians.
    #[must_use]
    pub fn orientation(&self) -> f32 {
        bulwark_core::heading(self.destination - self.position)
    }

    /// Moves towards the destination and detonates on arrival.
    pub(crate) fn step(&mut self, info: &mut StepInfo<'_>, mobs: &mut Arena<Mob>) {
        if !self.is_live() {
            return;
        }

        if let Some(target) = self.target {
            match mobs.get(target).filter(|mob| mob.is_live()) {
                Some(mob) => self.destination = mob.position(),
                None => self.target = None,
            }
        }

        let travel = self.speed * info.elapsed;
        let remaining = self.position.distance(self.destination);
        if travel < remaining {
            let direction = (self.destination - self.position) / remaining;
            self.position += direction * travel;
            return;
        }

        self.position = self.destination;
        self.detonate(info, mobs);
        self.vitals.mark_for_deletion();
    }

    fn detonate(&mut self, info: &mut StepInfo<'_>, mobs: &mut Arena<Mob>) {
        let mut payload = self.payload;
        if info.rng.gen::<f32>() < payload.crit_probability {
            payload.damage *= payload.crit_multiplier;
        }

        let mut wounded = Vec::new();
        if let Some(target) = self.target {
            wounded.push(target);
        }
        if payload.aoe_radius > 0.0 {
            let filter = self.owner.map_or(OwnerFilter::Any, OwnerFilter::Exclude);
            for id in info
                .locator
                .mobs_around(self.position, payload.aoe_radius, filter)
            {
                if !wounded.contains(&id) {
                    wounded.push(id);
                }
            }
        }

        for id in wounded {
            let Some(mob) = mobs.get_mut(id).filter(|mob| mob.is_live()) else {
                continue;
            };
            let factor = if Some(id) == self.target {
                1.0
            } else {
                1.0 - mob.position().distance(self.position) / payload.aoe_radius
            };
            if factor <= 0.0 {
                continue;
            }

            mob.note_attacker(self.tower);
            if mob.hit(&payload.scaled(factor), info.rng, info.now).killed() {
                let experience = mob.experience_reward();
                info.record_kill(id, mob.bounty(), experience, self.tower);
            }
        }
    }
}

impl Entity for Projectile {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f32 {
        PROJECTILE_RADIUS
    }

    fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
}
