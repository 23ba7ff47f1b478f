//! Lifecycle contract shared by every simulated object.

use serde::{Deserialize, Serialize};

use crate::{EntityId, Position};

/// Identifier of the player or faction owning an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(u32);

impl OwnerId {
    /// Owner assigned to structures built by the local player.
    pub const PLAYER: OwnerId = OwnerId(0);

    /// Creates an owner identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Health and deletion state of an entity.
///
/// Deletion is two-phase: [`Vitals::is_dead`] makes an entity eligible,
/// [`Vitals::mark_for_deletion`] flags it, and the world's purge pass removes
/// it from its collection after the tick sweep finishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vitals {
    total: f32,
    current: f32,
    deleted: bool,
}

impl Vitals {
    /// Creates vitals at full health.
    #[must_use]
    pub fn new(total: f32) -> Self {
        let total = total.max(0.0);
        Self {
            total,
            current: total,
            deleted: false,
        }
    }

    /// Creates vitals with an explicit current health, clamped to `[0, total]`.
    #[must_use]
    pub fn with_current(total: f32, current: f32) -> Self {
        let total = total.max(0.0);
        Self {
            total,
            current: current.clamp(0.0, total),
            deleted: false,
        }
    }

    /// Maximum health.
    #[must_use]
    pub const fn total(&self) -> f32 {
        self.total
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Remaining health as a fraction of the total, `1.0` when the total is zero.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.total <= 0.0 {
            1.0
        } else {
            self.current / self.total
        }
    }

    /// Reports whether the entity ran out of health.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Reports whether the entity was flagged for the purge pass.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Flags the entity for removal by the next purge pass.
    pub fn mark_for_deletion(&mut self) {
        self.deleted = true;
    }

    /// Subtracts health and returns the amount actually removed.
    pub fn damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }
}

/// Continuously refilling resource pool that gates attacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Energy {
    current: f32,
    capacity: f32,
    refill_rate: f32,
}

impl Energy {
    /// Creates a full pool.
    #[must_use]
    pub fn new(capacity: f32, refill_rate: f32) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            current: capacity,
            capacity,
            refill_rate: refill_rate.max(0.0),
        }
    }

    /// Creates a pool holding `current`, clamped to `[0, capacity]`.
    #[must_use]
    pub fn with_current(capacity: f32, refill_rate: f32, current: f32) -> Self {
        let mut pool = Self::new(capacity, refill_rate);
        pool.current = current.clamp(0.0, pool.capacity);
        pool
    }

    /// Energy currently stored.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum energy the pool can store.
    #[must_use]
    pub const fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Energy regained per second.
    #[must_use]
    pub const fn refill_rate(&self) -> f32 {
        self.refill_rate
    }

    /// Replaces the refill rate, e.g. after an upgrade changed it.
    pub fn set_refill_rate(&mut self, refill_rate: f32) {
        self.refill_rate = refill_rate.max(0.0);
    }

    /// Refills the pool for `elapsed` seconds.
    pub fn refill(&mut self, elapsed: f32) {
        self.current = (self.current + self.refill_rate * elapsed.max(0.0)).min(self.capacity);
    }

    /// Spends `cost` if the pool holds enough and reports whether it did.
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if self.current < cost {
            return false;
        }
        self.current = (self.current - cost).max(0.0);
        true
    }
}

/// Runtime category of a simulated entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Goal block that absorbs breaching mobs.
    Portal,
    /// Obstacle block that mobs must walk around or break.
    Wall,
    /// Block that periodically releases waves of mobs.
    Spawner,
    /// Defensive block that attacks mobs.
    Tower,
    /// Mobile hostile unit.
    Mob,
    /// Flying damage payload.
    Projectile,
}

impl EntityKind {
    /// Reports whether entities of this kind are immobile blocks.
    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            Self::Portal | Self::Wall | Self::Spawner | Self::Tower
        )
    }
}

/// Lightweight reference to an entity: its kind tag plus its arena identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    /// Category of the referenced entity, selecting the collection `id` indexes.
    pub kind: EntityKind,
    /// Identifier within the category's collection.
    pub id: EntityId,
}

impl Handle {
    /// Creates a handle from a kind tag and identifier.
    #[must_use]
    pub const fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// Capabilities every simulated object exposes.
pub trait Entity {
    /// Current location.
    fn position(&self) -> Position;

    /// Size of the entity; blocks occupy the square `position ± radius / 2`.
    fn radius(&self) -> f32;

    /// Owning player or faction, if any.
    fn owner(&self) -> Option<OwnerId>;

    /// Health and deletion state.
    fn vitals(&self) -> &Vitals;

    /// Mutable health and deletion state.
    fn vitals_mut(&mut self) -> &mut Vitals;

    /// Reports whether the entity ran out of health.
    fn is_dead(&self) -> bool {
        self.vitals().is_dead()
    }

    /// Reports whether the entity is flagged for the purge pass.
    fn is_deleted(&self) -> bool {
        self.vitals().is_deleted()
    }

    /// Reports whether the entity may still be targeted or interacted with.
    fn is_live(&self) -> bool {
        !self.is_dead() && !self.is_deleted()
    }

    /// Flags the entity for the purge pass.
    fn mark_for_deletion(&mut self) {
        self.vitals_mut().mark_for_deletion();
    }

    /// Remaining health as a fraction of the total.
    fn health_ratio(&self) -> f32 {
        self.vitals().ratio()
    }
}
