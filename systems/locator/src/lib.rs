#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial query service over snapshots of the world's entity collections.
//!
//! The locator never borrows the collections it describes. The world captures
//! an owned snapshot of blocks, mobs and projectiles before each phase of a
//! tick, so spawns and purges applied after the sweep cannot invalidate a query
//! result. Entries carry generational identifiers; callers resolve them
//! against the live arenas and must treat a failed lookup as "gone".

use std::cmp::Ordering;

use bulwark_core::{
    footprint_contains, Aabb, CellCoord, EntityId, EntityKind, Handle, LocatorEntry, OwnerFilter,
    Position, SortMode,
};

/// Smallest sampling step accepted by ray obstruction tests.
const MIN_SAMPLE_STEP: f32 = 1.0e-3;

/// Snapshot-backed spatial index answering point, ray and region queries.
#[derive(Clone, Debug, Default)]
pub struct Locator {
    blocks: Vec<LocatorEntry>,
    mobs: Vec<LocatorEntry>,
    projectiles: Vec<LocatorEntry>,
}

impl Locator {
    /// Creates an empty locator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a locator from the provided entries, routing each by its kind.
    #[must_use]
    pub fn capture<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = LocatorEntry>,
    {
        let mut locator = Self::new();
        for entry in entries {
            locator.push(entry);
        }
        tracing::trace!(
            blocks = locator.blocks.len(),
            mobs = locator.mobs.len(),
            projectiles = locator.projectiles.len(),
            "captured locator snapshot"
        );
        locator
    }

    /// Appends a single entry to the collection matching its kind.
    pub fn push(&mut self, entry: LocatorEntry) {
        match entry.kind() {
            EntityKind::Mob => self.mobs.push(entry),
            EntityKind::Projectile => self.projectiles.push(entry),
            EntityKind::Portal | EntityKind::Wall | EntityKind::Spawner | EntityKind::Tower => {
                self.blocks.push(entry)
            }
        }
    }

    /// Replaces the block snapshot.
    pub fn recapture_blocks<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = LocatorEntry>,
    {
        self.blocks.clear();
        self.blocks
            .extend(entries.into_iter().filter(|entry| entry.kind().is_block()));
    }

    /// Replaces the mob snapshot.
    pub fn recapture_mobs<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = LocatorEntry>,
    {
        self.mobs.clear();
        self.mobs.extend(
            entries
                .into_iter()
                .filter(|entry| entry.kind() == EntityKind::Mob),
        );
    }

    /// Captured blocks in collection order.
    #[must_use]
    pub fn blocks(&self) -> &[LocatorEntry] {
        &self.blocks
    }

    /// Captured mobs in collection order.
    #[must_use]
    pub fn mobs(&self) -> &[LocatorEntry] {
        &self.mobs
    }

    /// Looks up the captured entry for a handle.
    #[must_use]
    pub fn entry(&self, handle: Handle) -> Option<&LocatorEntry> {
        self.collection(handle.kind)
            .iter()
            .find(|entry| entry.handle == handle)
    }

    /// First live block, then mob when `include_mobs` is set, whose footprint
    /// contains `point`.
    #[must_use]
    pub fn item_at(&self, point: Position, include_mobs: bool) -> Option<Handle> {
        let covering = |entry: &&LocatorEntry| {
            entry.live && footprint_contains(entry.position, entry.radius, point)
        };

        if let Some(block) = self.blocks.iter().find(covering) {
            return Some(block.handle);
        }
        if include_mobs {
            return self.mobs.iter().find(covering).map(|entry| entry.handle);
        }
        None
    }

    /// Reports whether a live block covers `point`.
    #[must_use]
    pub fn obstructed(&self, point: Position) -> bool {
        self.item_at(point, false).is_some()
    }

    /// Samples a ray and returns the first obstructed sample point.
    ///
    /// Samples are taken every `sample_step` units up to `distance`. Samples
    /// falling inside the origin's own cell are never considered obstructing,
    /// and the end point is always tested even when the stepping loop does not
    /// land on it exactly.
    #[must_use]
    pub fn obstruction_along(
        &self,
        origin: Position,
        direction: Position,
        distance: f32,
        sample_step: f32,
    ) -> Option<Position> {
        let direction = direction.normalize_or_zero();
        if direction == Position::ZERO || distance.is_nan() || distance <= 0.0 {
            return None;
        }

        let origin_cell = CellCoord::containing(origin);
        let blocks_path =
            |sample: Position| CellCoord::containing(sample) != origin_cell && self.obstructed(sample);

        let step = sample_step.max(MIN_SAMPLE_STEP);
        let mut travelled = step;
        while travelled < distance {
            let sample = origin + direction * travelled;
            if blocks_path(sample) {
                return Some(sample);
            }
            travelled += step;
        }

        let end = origin + direction * distance;
        blocks_path(end).then_some(end)
    }

    /// Samples the straight segment between two points for obstructions.
    #[must_use]
    pub fn segment_obstruction(
        &self,
        from: Position,
        to: Position,
        sample_step: f32,
    ) -> Option<Position> {
        self.obstruction_along(from, to - from, from.distance(to), sample_step)
    }

    /// Entities whose position lies inside `region`.
    ///
    /// A `kind` of `None` covers blocks and mobs; projectiles are only returned
    /// when requested explicitly. [`SortMode::Distance`] has no reference point
    /// for a region and falls back to collection order.
    #[must_use]
    pub fn visible_in(
        &self,
        region: Aabb,
        kind: Option<EntityKind>,
        owner: OwnerFilter,
        sort: SortMode,
    ) -> Vec<Handle> {
        let mut found = self.gather(kind, owner, |entry| region.contains(entry.position));
        match sort {
            SortMode::None | SortMode::Distance => {}
            SortMode::ZOrder => sort_by_z_order(&mut found),
        }
        found.into_iter().map(|entry| entry.handle).collect()
    }

    /// Entities whose position lies within `radius` of `center`.
    #[must_use]
    pub fn visible_around(
        &self,
        center: Position,
        radius: f32,
        kind: Option<EntityKind>,
        owner: OwnerFilter,
        sort: SortMode,
    ) -> Vec<Handle> {
        let mut found = self.gather(kind, owner, |entry| {
            entry.position.distance(center) <= radius
        });
        match sort {
            SortMode::None => {}
            SortMode::Distance => sort_by_distance(&mut found, center),
            SortMode::ZOrder => sort_by_z_order(&mut found),
        }
        found.into_iter().map(|entry| entry.handle).collect()
    }

    /// Closest live entity of `kind` to `point`, regardless of distance.
    #[must_use]
    pub fn closest(
        &self,
        point: Position,
        kind: Option<EntityKind>,
        owner: OwnerFilter,
    ) -> Option<Handle> {
        self.visible_around(point, f32::INFINITY, kind, owner, SortMode::Distance)
            .into_iter()
            .next()
    }

    /// Identifiers of up to `limit` live entities of `kind`, nearest first.
    #[must_use]
    pub fn nearest_of(
        &self,
        point: Position,
        kind: EntityKind,
        owner: OwnerFilter,
        limit: usize,
    ) -> Vec<EntityId> {
        self.visible_around(point, f32::INFINITY, Some(kind), owner, SortMode::Distance)
            .into_iter()
            .take(limit)
            .map(|handle| handle.id)
            .collect()
    }

    /// Identifiers of live mobs within `radius` of `center`, nearest first.
    #[must_use]
    pub fn mobs_around(&self, center: Position, radius: f32, owner: OwnerFilter) -> Vec<EntityId> {
        self.visible_around(
            center,
            radius,
            Some(EntityKind::Mob),
            owner,
            SortMode::Distance,
        )
        .into_iter()
        .map(|handle| handle.id)
        .collect()
    }

    fn collection(&self, kind: EntityKind) -> &[LocatorEntry] {
        match kind {
            EntityKind::Mob => &self.mobs,
            EntityKind::Projectile => &self.projectiles,
            EntityKind::Portal | EntityKind::Wall | EntityKind::Spawner | EntityKind::Tower => {
                &self.blocks
            }
        }
    }

    fn gather<F>(&self, kind: Option<EntityKind>, owner: OwnerFilter, inside: F) -> Vec<LocatorEntry>
    where
        F: Fn(&LocatorEntry) -> bool,
    {
        let accepts = |entry: &&LocatorEntry| {
            entry.live
                && kind.map_or(true, |wanted| entry.kind() == wanted)
                && owner.matches(entry.owner)
                && inside(entry)
        };

        let sources: [&[LocatorEntry]; 3] = match kind {
            None => [&self.blocks, &self.mobs, &[]],
            Some(wanted) => [self.collection(wanted), &[], &[]],
        };

        sources
            .into_iter()
            .flat_map(|source| source.iter().filter(accepts))
            .copied()
            .collect()
    }
}

fn sort_by_distance(entries: &mut [LocatorEntry], reference: Position) {
    entries.sort_by(|a, b| {
        a.position
            .distance_squared(reference)
            .total_cmp(&b.position.distance_squared(reference))
    });
}

fn sort_by_z_order(entries: &mut [LocatorEntry]) {
    entries.sort_by(|a, b| match a.position.x.total_cmp(&b.position.x) {
        Ordering::Equal => a.position.y.total_cmp(&b.position.y),
        other => other,
    });
}
