use bulwark_core::{
    EntityId, EntityKind, Handle, LocatorEntry, OwnerFilter, Position, SortMode,
};
use bulwark_system_locator::Locator;
use proptest::prelude::*;

fn wall_at(index: u32, column: i32, row: i32, live: bool) -> LocatorEntry {
    LocatorEntry {
        handle: Handle::new(EntityKind::Wall, EntityId::new(index, 0)),
        position: Position::new(column as f32 + 0.5, row as f32 + 0.5),
        radius: 1.0,
        owner: None,
        live,
    }
}

fn mob_at(index: u32, x: f32, y: f32) -> LocatorEntry {
    LocatorEntry {
        handle: Handle::new(EntityKind::Mob, EntityId::new(index, 0)),
        position: Position::new(x, y),
        radius: 0.5,
        owner: None,
        live: true,
    }
}

fn arb_locator() -> impl Strategy<Value = Locator> {
    let walls = prop::collection::vec((0i32..12, 0i32..12, any::<bool>()), 0..30);
    let mobs = prop::collection::vec((0.0f32..12.0, 0.0f32..12.0), 0..10);
    (walls, mobs).prop_map(|(walls, mobs)| {
        let mut entries = Vec::new();
        for (index, (column, row, live)) in walls.into_iter().enumerate() {
            entries.push(wall_at(index as u32, column, row, live));
        }
        for (index, (x, y)) in mobs.into_iter().enumerate() {
            entries.push(mob_at(index as u32, x, y));
        }
        Locator::capture(entries)
    })
}

proptest! {
    #[test]
    fn obstruction_matches_block_lookup(
        locator in arb_locator(),
        x in -1.0f32..13.0,
        y in -1.0f32..13.0,
    ) {
        let point = Position::new(x, y);
        prop_assert_eq!(locator.obstructed(point), locator.item_at(point, false).is_some());
    }

    #[test]
    fn point_lookup_without_mobs_never_returns_a_mob(
        locator in arb_locator(),
        x in 0.0f32..12.0,
        y in 0.0f32..12.0,
    ) {
        if let Some(handle) = locator.item_at(Position::new(x, y), false) {
            prop_assert!(handle.kind.is_block());
        }
    }

    #[test]
    fn distance_sorted_results_are_monotonic(
        locator in arb_locator(),
        x in 0.0f32..12.0,
        y in 0.0f32..12.0,
        radius in 0.0f32..20.0,
    ) {
        let center = Position::new(x, y);
        let handles = locator.visible_around(center, radius, None, OwnerFilter::Any, SortMode::Distance);
        let distances: Vec<f32> = handles
            .iter()
            .filter_map(|handle| locator.entry(*handle))
            .map(|entry| entry.position.distance(center))
            .collect();
        prop_assert_eq!(distances.len(), handles.len());
        for pair in distances.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        for distance in distances {
            prop_assert!(distance <= radius);
        }
    }
}

#[test]
fn closest_picks_nearest_live_wall() {
    let locator = Locator::capture([
        wall_at(0, 1, 1, false),
        wall_at(1, 5, 5, true),
        wall_at(2, 8, 8, true),
    ]);

    let closest = locator.closest(Position::new(0.5, 0.5), Some(EntityKind::Wall), OwnerFilter::Any);
    assert_eq!(closest.map(|handle| handle.id.index()), Some(1));
}
