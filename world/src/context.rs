//! Per-tick context handed to every entity behaviour.

use bulwark_core::{EntityId, Event};
use bulwark_system_locator::Locator;
use bulwark_system_pathfinding::PathFinder;
use rand_chacha::ChaCha8Rng;

use crate::{config::WorldConfig, mob::Mob, projectile::Projectile};

/// Everything an entity may read or produce while stepping.
///
/// Created fresh by the world for each tick and drained once the sweep over
/// blocks, mobs and projectiles is complete. Entities never mutate the
/// world's collections through the context; they only append to its queues.
#[derive(Debug)]
pub struct StepInfo<'a> {
    /// World random stream, consumed in entity order.
    pub rng: &'a mut ChaCha8Rng,
    /// Seconds simulated by this tick.
    pub elapsed: f32,
    /// Moment the tick started at.
    pub now: f64,
    /// Spatial snapshot of the world.
    pub locator: Locator,
    /// Route planner shared by mobs.
    pub path_finder: &'a PathFinder,
    /// World parameters.
    pub config: &'a WorldConfig,
    /// Mobs queued for insertion after the sweep.
    pub spawned_mobs: Vec<Mob>,
    /// Projectiles queued for insertion after the sweep.
    pub spawned_projectiles: Vec<Projectile>,
    /// Gold earned during the tick.
    pub gold: f32,
    /// Experience owed to towers, credited after the sweep.
    pub experience: Vec<(EntityId, f32)>,
    /// Notifications raised during the tick.
    pub events: Vec<Event>,
    /// Set when mobs must discard their routes and plan again.
    pub replan: bool,
    /// Set when a block was destroyed since the locator last saw the blocks.
    pub blocks_changed: bool,
}

impl<'a> StepInfo<'a> {
    /// Creates a context with empty queues.
    #[must_use]
    pub fn new(
        rng: &'a mut ChaCha8Rng,
        path_finder: &'a PathFinder,
        config: &'a WorldConfig,
        locator: Locator,
        elapsed: f32,
        now: f64,
    ) -> Self {
        Self {
            rng,
            elapsed: elapsed.max(0.0),
            now,
            locator,
            path_finder,
            config,
            spawned_mobs: Vec::new(),
            spawned_projectiles: Vec::new(),
            gold: 0.0,
            experience: Vec::new(),
            events: Vec::new(),
            replan: false,
            blocks_changed: false,
        }
    }

    /// Moment the tick ends at.
    #[must_use]
    pub fn end_of_tick(&self) -> f64 {
        self.now + f64::from(self.elapsed)
    }

    /// Credits the bounty of a killed mob and the experience it grants.
    pub fn record_kill(&mut self, mob: EntityId, bounty: f32, experience: f32, tower: Option<EntityId>) {
        self.gold += bounty.max(0.0);
        if let Some(tower) = tower {
            self.experience.push((tower, experience));
        }
        self.events.push(Event::MobKilled { mob, bounty });
        tracing::debug!(?mob, bounty, "mob killed");
    }
}
