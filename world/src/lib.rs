#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Bulwark.
//!
//! The world owns every block, mob and projectile. Adapters mutate it only
//! through [`apply`], which runs commands strictly between ticks and reports
//! outcomes as [`Event`] values, and read it through the [`query`] module.

mod block;
mod config;
mod context;
mod effect;
mod generation;
mod mob;
mod persistence;
mod projectile;
mod spawner;
mod tower;

use std::mem;

use bulwark_core::{
    Arena, CellCoord, Command, CommandError, Difficulty, Entity, EntityId, EntityKind, Event,
    Handle, LocatorEntry, OwnerId, RunState, TowerKind, UpgradeKind,
};
use bulwark_system_locator::Locator;
use bulwark_system_pathfinding::PathFinder;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use block::{Block, BlockPayload, Portal, Wall, BLOCK_RADIUS};
pub use config::{ConfigError, NavigationTuning, WorldConfig};
pub use context::StepInfo;
pub use effect::Countdown;
pub use mob::{Behavior, Defense, HitOutcome, Mob, MobProfile, Status, POISON_STACK_LIMIT};
pub use persistence::{load_from_str, save_to_string, LoadError, SAVE_VERSION};
pub use projectile::Projectile;
pub use spawner::{MobDistribution, Spawner, SpawnerError, WaveFormula};
pub use tower::{upgrade_cost, TargetPicker, Tower, TowerProfile};

use generation::{derive_labeled_seed, RNG_STREAM_SIMULATION};

/// Represents the authoritative Bulwark world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    path_finder: PathFinder,
    rng: ChaCha8Rng,
    moment: f64,
    run_state: RunState,
    gold: f32,
    selected: Option<TowerKind>,
    blocks: Arena<Block>,
    mobs: Arena<Mob>,
    projectiles: Arena<Projectile>,
    topology_dirty: bool,
    tick_index: u64,
}

impl World {
    /// Generates a world for `difficulty` from `seed`.
    pub fn new(config: WorldConfig, difficulty: Difficulty, seed: u64) -> Result<Self, SpawnerError> {
        let blocks = generation::generate(&config, difficulty, seed)?;
        let mut world = Self::empty(config, seed);
        for block in blocks {
            let _ = world.insert_block(block);
        }
        Ok(world)
    }

    /// Creates a world with no entities.
    #[must_use]
    pub fn empty(config: WorldConfig, seed: u64) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, RNG_STREAM_SIMULATION));
        Self::with_rng(config, rng)
    }

    fn with_rng(config: WorldConfig, rng: ChaCha8Rng) -> Self {
        Self {
            path_finder: PathFinder::new(config.path_finder()),
            gold: config.starting_gold,
            config,
            rng,
            moment: 0.0,
            run_state: RunState::Running,
            selected: None,
            blocks: Arena::new(),
            mobs: Arena::new(),
            projectiles: Arena::new(),
            topology_dirty: false,
            tick_index: 0,
        }
    }

    /// Adds a block; mobs re-plan their routes on the next tick.
    pub fn insert_block(&mut self, block: Block) -> EntityId {
        self.topology_dirty = true;
        self.blocks.insert(block)
    }

    /// Adds a mob.
    pub fn insert_mob(&mut self, mob: Mob) -> EntityId {
        self.mobs.insert(mob)
    }

    /// Adds a projectile.
    pub fn insert_projectile(&mut self, projectile: Projectile) -> EntityId {
        self.projectiles.insert(projectile)
    }

    /// Builds a locator snapshot of every collection.
    fn capture_locator(&self) -> Locator {
        Locator::capture(
            self.blocks
                .iter()
                .map(|(id, block)| locator_entry(block.kind(), id, block))
                .chain(
                    self.mobs
                        .iter()
                        .map(|(id, mob)| locator_entry(EntityKind::Mob, id, mob)),
                )
                .chain(
                    self.projectiles
                        .iter()
                        .map(|(id, projectile)| locator_entry(EntityKind::Projectile, id, projectile)),
                ),
        )
    }

    /// Advances the simulation by `elapsed` seconds.
    ///
    /// Blocks step first, then mobs against a refreshed mob snapshot for
    /// projectiles, then projectiles. Spawned entities join their collections
    /// and deleted ones are purged only after the sweep.
    fn step(&mut self, elapsed: f32, out_events: &mut Vec<Event>) {
        if !self.run_state.is_running() {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);

        let locator = self.capture_locator();
        let replan = mem::take(&mut self.topology_dirty);
        if replan {
            tracing::debug!(tick = self.tick_index, "topology changed, mobs re-plan");
        }

        let mut info = StepInfo::new(
            &mut self.rng,
            &self.path_finder,
            &self.config,
            locator,
            elapsed,
            self.moment,
        );
        info.replan = replan;

        for id in self.blocks.ids() {
            if let Some(block) = self.blocks.get_mut(id) {
                block.step(id, &mut info, &mut self.mobs);
            }
        }
        for id in self.mobs.ids() {
            if let Some(mob) = self.mobs.get_mut(id) {
                mob.step(id, &mut info, &mut self.blocks);
            }
            if mem::take(&mut info.blocks_changed) {
                info.locator.recapture_blocks(
                    self.blocks
                        .iter()
                        .map(|(id, block)| locator_entry(block.kind(), id, block)),
                );
            }
        }

        info.locator.recapture_mobs(
            self.mobs
                .iter()
                .map(|(id, mob)| locator_entry(EntityKind::Mob, id, mob)),
        );
        for id in self.projectiles.ids() {
            if let Some(projectile) = self.projectiles.get_mut(id) {
                projectile.step(&mut info, &mut self.mobs);
            }
        }

        let StepInfo {
            spawned_mobs,
            spawned_projectiles,
            gold,
            experience,
            events,
            ..
        } = info;

        for (tower, gained) in experience {
            if let Some(tower) = self.blocks.get_mut(tower).and_then(Block::as_tower_mut) {
                tower.gain_experience(gained);
            }
        }
        for mob in spawned_mobs {
            let _ = self.mobs.insert(mob);
        }
        for projectile in spawned_projectiles {
            let _ = self.projectiles.insert(projectile);
        }

        self.purge();
        self.moment += f64::from(elapsed);

        out_events.extend(events);
        if gold > 0.0 {
            self.gold += gold;
            out_events.push(Event::GoldEarned { amount: gold });
        }
    }

    /// Removes every entity flagged for deletion.
    fn purge(&mut self) {
        let blocks = self.blocks.retain(|block| !block.is_deleted());
        let mobs = self.mobs.retain(|mob| !mob.is_deleted());
        let projectiles = self.projectiles.retain(|projectile| !projectile.is_deleted());
        if !blocks.is_empty() {
            self.topology_dirty = true;
        }
        tracing::trace!(
            blocks = blocks.len(),
            mobs = mobs.len(),
            projectiles = projectiles.len(),
            "purged entities"
        );
    }

    fn toggle_pause(&mut self, out_events: &mut Vec<Event>) {
        let (transitional, settled) = match self.run_state {
            RunState::Running | RunState::Resuming => (RunState::Pausing, RunState::Paused),
            RunState::Paused | RunState::Pausing => (RunState::Resuming, RunState::Running),
        };

        self.run_state = transitional;
        out_events.push(Event::RunStateChanged {
            state: transitional,
        });

        let now = self.moment;
        let pausing = transitional == RunState::Pausing;
        for (_, block) in self.blocks.iter_mut() {
            if pausing {
                block.pause(now);
            } else {
                block.resume(now);
            }
        }
        for (_, mob) in self.mobs.iter_mut() {
            if pausing {
                mob.pause(now);
            } else {
                mob.resume(now);
            }
        }

        self.run_state = settled;
        out_events.push(Event::RunStateChanged { state: settled });
        tracing::info!(state = ?settled, moment = now, "run state changed");
    }

    fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
        match command {
            Command::Tick { .. } | Command::SelectTowerKind { .. } | Command::TogglePause => Ok(()),
            Command::PlaceTower { cell } => self.place_tower(cell, out_events),
            Command::BuildWall { cell } => self.build_wall(cell, out_events),
            Command::UpgradeTower { tower, upgrade } => {
                self.upgrade_tower(tower, upgrade, out_events)
            }
            Command::SellTower { tower } => self.sell_tower(tower, out_events),
        }
    }

    fn ensure_buildable(&self, cell: CellCoord) -> Result<(), CommandError> {
        if !self.config.bounds().contains(cell) {
            return Err(CommandError::OutOfBounds {
                column: cell.column(),
                row: cell.row(),
            });
        }
        let occupied = self
            .blocks
            .iter()
            .any(|(_, block)| block.is_live() && block.cell() == cell)
            || self
                .mobs
                .iter()
                .any(|(_, mob)| mob.is_live() && CellCoord::containing(mob.position()) == cell);
        if occupied {
            return Err(CommandError::Occupied {
                column: cell.column(),
                row: cell.row(),
            });
        }
        Ok(())
    }

    fn ensure_affordable(&self, required: f32) -> Result<(), CommandError> {
        if self.gold < required {
            return Err(CommandError::InsufficientGold {
                required,
                available: self.gold,
            });
        }
        Ok(())
    }

    fn place_tower(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
        let kind = self.selected.ok_or(CommandError::NoTowerSelected)?;
        self.ensure_buildable(cell)?;
        let price = kind.price();
        self.ensure_affordable(price)?;

        self.gold -= price;
        let tower = self.insert_block(Block::tower(cell, OwnerId::PLAYER, Tower::new(kind)));
        out_events.push(Event::TowerPlaced { tower, kind, cell });
        tracing::info!(?tower, ?kind, ?cell, price, "tower placed");
        Ok(())
    }

    fn build_wall(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
        self.ensure_buildable(cell)?;
        let cost = self.config.wall_cost;
        self.ensure_affordable(cost)?;

        self.gold -= cost;
        let block = Block::wall(
            cell,
            Some(OwnerId::PLAYER),
            self.config.wall_health,
            self.config.wall_height,
        );
        let wall = self.insert_block(block);
        out_events.push(Event::WallBuilt { wall, cell });
        tracing::info!(?wall, ?cell, cost, "wall built");
        Ok(())
    }

    fn upgrade_tower(
        &mut self,
        id: EntityId,
        upgrade: UpgradeKind,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let available = self.gold;
        let tower = self
            .blocks
            .get_mut(id)
            .filter(|block| block.is_live())
            .and_then(Block::as_tower_mut)
            .ok_or(CommandError::UnknownTower(id))?;
        let cost = tower
            .next_upgrade_cost(upgrade)
            .ok_or(CommandError::UnsupportedUpgrade(upgrade))?;
        if available < cost {
            return Err(CommandError::InsufficientGold {
                required: cost,
                available,
            });
        }
        let level = tower
            .apply_upgrade(upgrade, cost)
            .ok_or(CommandError::UnsupportedUpgrade(upgrade))?;

        self.gold -= cost;
        out_events.push(Event::TowerUpgraded {
            tower: id,
            upgrade,
            level,
        });
        tracing::info!(tower = ?id, ?upgrade, level, cost, "tower upgraded");
        Ok(())
    }

    fn sell_tower(&mut self, id: EntityId, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
        let ratio = self.config.sell_refund_ratio;
        let block = self
            .blocks
            .get_mut(id)
            .filter(|block| block.is_live() && block.kind() == EntityKind::Tower)
            .ok_or(CommandError::UnknownTower(id))?;
        let refund = block.as_tower().map_or(0.0, |tower| tower.sell_value(ratio));
        block.mark_for_deletion();

        self.gold += refund;
        self.topology_dirty = true;
        out_events.push(Event::TowerSold { tower: id, refund });
        tracing::info!(tower = ?id, refund, "tower sold");
        Ok(())
    }
}

fn locator_entry<E: Entity>(kind: EntityKind, id: EntityId, entity: &E) -> LocatorEntry {
    LocatorEntry {
        handle: Handle::new(kind, id),
        position: entity.position(),
        radius: entity.radius(),
        owner: entity.owner(),
        live: entity.is_live(),
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and report
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.run_state.is_running() {
                out_events.push(Event::TimeAdvanced { dt });
                world.step(dt.as_secs_f32(), out_events);
            }
        }
        Command::SelectTowerKind { kind } => {
            world.selected = kind;
            out_events.push(Event::TowerKindSelected { kind });
        }
        Command::TogglePause => world.toggle_pause(out_events),
        command => {
            if let Err(reason) = world.execute(command, out_events) {
                tracing::warn!(%reason, "command rejected");
                out_events.push(Event::CommandRejected { reason });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bulwark_core::{
        Aabb, CellCoord, Entity, EntityId, EntityKind, Handle, OwnerFilter, Position, RunState,
        SortMode, TowerKind, UpgradeKind,
    };

    use super::{Block, BlockPayload, Mob, Projectile, World, WorldConfig};

    /// Gold held by the player.
    #[must_use]
    pub fn gold(world: &World) -> f32 {
        world.gold
    }

    /// Current run state.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.run_state
    }

    /// Simulated seconds elapsed since the world was created.
    #[must_use]
    pub fn moment(world: &World) -> f64 {
        world.moment
    }

    /// Tower type subsequent placements will build.
    #[must_use]
    pub fn selected_tower_kind(world: &World) -> Option<TowerKind> {
        world.selected
    }

    /// Parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Handles of live entities inside `region`, optionally filtered and sorted.
    ///
    /// Without a kind filter only blocks and mobs are reported; projectiles
    /// must be requested explicitly.
    #[must_use]
    pub fn visible(
        world: &World,
        region: Aabb,
        kind: Option<EntityKind>,
        owner: OwnerFilter,
        sort: SortMode,
    ) -> Vec<Handle> {
        world.capture_locator().visible_in(region, kind, owner, sort)
    }

    /// Block addressed by `id`.
    #[must_use]
    pub fn block(world: &World, id: EntityId) -> Option<&Block> {
        world.blocks.get(id)
    }

    /// Mob addressed by `id`.
    #[must_use]
    pub fn mob(world: &World, id: EntityId) -> Option<&Mob> {
        world.mobs.get(id)
    }

    /// Projectile addressed by `id`.
    #[must_use]
    pub fn projectile(world: &World, id: EntityId) -> Option<&Projectile> {
        world.projectiles.get(id)
    }

    /// Every block in collection order.
    pub fn blocks(world: &World) -> impl Iterator<Item = (EntityId, &Block)> + '_ {
        world.blocks.iter()
    }

    /// Every mob in collection order.
    pub fn mobs(world: &World) -> impl Iterator<Item = (EntityId, &Mob)> + '_ {
        world.mobs.iter()
    }

    /// Every projectile in collection order.
    pub fn projectiles(world: &World) -> impl Iterator<Item = (EntityId, &Projectile)> + '_ {
        world.projectiles.iter()
    }

    /// Live tower occupying `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<EntityId> {
        world
            .blocks
            .iter()
            .find(|(_, block)| {
                block.is_live() && block.kind() == EntityKind::Tower && block.cell() == cell
            })
            .map(|(id, _)| id)
    }

    /// Lives left across every live portal.
    #[must_use]
    pub fn portal_lives(world: &World) -> u32 {
        world
            .blocks
            .iter()
            .filter(|(_, block)| block.is_live())
            .filter_map(|(_, block)| block.as_portal())
            .map(|portal| portal.lives)
            .sum()
    }

    /// Gold the next level of `upgrade` would cost for `tower`.
    #[must_use]
    pub fn upgrade_cost(world: &World, tower: EntityId, upgrade: UpgradeKind) -> Option<f32> {
        world
            .blocks
            .get(tower)
            .and_then(Block::as_tower)
            .and_then(|tower| tower.next_upgrade_cost(upgrade))
    }

    /// Number of entities per collection.
    #[must_use]
    pub fn counts(world: &World) -> EntityCounts {
        EntityCounts {
            blocks: world.blocks.len(),
            mobs: world.mobs.len(),
            projectiles: world.projectiles.len(),
        }
    }

    /// Presentation snapshot of the entity addressed by `handle`.
    #[must_use]
    pub fn snapshot(world: &World, handle: Handle) -> Option<Snapshot> {
        match handle.kind {
            EntityKind::Mob => world.mobs.get(handle.id).map(|mob| Snapshot {
                handle,
                position: mob.position(),
                radius: mob.radius(),
                health_ratio: mob.health_ratio(),
                orientation: mob.orientation(),
                type_code: mob.kind().code(),
                path: mob.path().map(|path| path.waypoints()).unwrap_or_default(),
            }),
            EntityKind::Projectile => {
                world
                    .projectiles
                    .get(handle.id)
                    .map(|projectile| Snapshot {
                        handle,
                        position: projectile.position(),
                        radius: projectile.radius(),
                        health_ratio: projectile.health_ratio(),
                        orientation: projectile.orientation(),
                        type_code: 0,
                        path: Vec::new(),
                    })
            }
            EntityKind::Portal | EntityKind::Wall | EntityKind::Spawner | EntityKind::Tower => world
                .blocks
                .get(handle.id)
                .filter(|block| block.kind() == handle.kind)
                .map(|block| {
                    let (orientation, type_code) = match block.payload() {
                        BlockPayload::Tower(tower) => (tower.orientation(), tower.kind().code()),
                        BlockPayload::Spawner(spawner) => (0.0, spawner.difficulty().code()),
                        BlockPayload::Portal(_) | BlockPayload::Wall(_) => (0.0, 0),
                    };
                    Snapshot {
                        handle,
                        position: block.position(),
                        radius: block.radius(),
                        health_ratio: block.health_ratio(),
                        orientation,
                        type_code,
                        path: Vec::new(),
                    }
                }),
        }
    }

    /// Number of entities per collection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntityCounts {
        /// Portals, walls, spawners and towers.
        pub blocks: usize,
        /// Mobs.
        pub mobs: usize,
        /// Projectiles.
        pub projectiles: usize,
    }

    /// Immutable description of one entity for presentation.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Snapshot {
        /// Kind tag and identifier.
        pub handle: Handle,
        /// Current location.
        pub position: Position,
        /// Size.
        pub radius: f32,
        /// Remaining health fraction.
        pub health_ratio: f32,
        /// Facing in radians.
        pub orientation: f32,
        /// Catalogue code of the tower or mob kind, or the spawner difficulty.
        pub type_code: u8,
        /// Waypoints of the current route; mobs only.
        pub path: Vec<Position>,
    }
}
