use std::collections::BTreeSet;

use bulwark_core::{CellBounds, CellCoord, EntityId, EntityKind, Handle, LocatorEntry, Position};
use bulwark_system_locator::Locator;
use bulwark_system_pathfinding::{Path, PathFinder, PathFinderConfig, PathRequest};
use proptest::prelude::*;

const SIDE: i32 = 10;
const SAMPLE_STEP: f32 = 0.1;

fn locator_with(walls: &BTreeSet<(i32, i32)>) -> Locator {
    Locator::capture(walls.iter().enumerate().map(|(index, (column, row))| LocatorEntry {
        handle: Handle::new(EntityKind::Wall, EntityId::new(index as u32, 0)),
        position: CellCoord::new(*column, *row).center(),
        radius: 1.0,
        owner: None,
        live: true,
    }))
}

fn finder() -> PathFinder {
    PathFinder::new(PathFinderConfig {
        sample_step: SAMPLE_STEP,
        bounds: Some(CellBounds::new(SIDE as u32, SIDE as u32)),
        ..PathFinderConfig::default()
    })
}

fn cell() -> impl Strategy<Value = (i32, i32)> {
    (0..SIDE, 0..SIDE)
}

proptest! {
    #[test]
    fn consecutive_waypoints_are_mutually_visible(
        walls in prop::collection::btree_set(cell(), 0..40),
        start in cell(),
        end in cell(),
    ) {
        prop_assume!(!walls.contains(&start) && !walls.contains(&end));
        let locator = locator_with(&walls);
        let start = CellCoord::new(start.0, start.1).center();
        let end = CellCoord::new(end.0, end.1).center();
        let end_cell = CellCoord::containing(end);

        if let Ok(waypoints) = finder().find_waypoints(&locator, &PathRequest::new(start, end)) {
            prop_assert_eq!(waypoints.first().copied(), Some(start));
            prop_assert_eq!(waypoints.last().copied(), Some(end));
            for pair in waypoints.windows(2) {
                if let Some(hit) = locator.segment_obstruction(pair[0], pair[1], SAMPLE_STEP) {
                    prop_assert_eq!(CellCoord::containing(hit), end_cell);
                }
            }
        }
    }

    #[test]
    fn routes_on_open_ground_are_straight(
        start in cell(),
        end in cell(),
    ) {
        let start = CellCoord::new(start.0, start.1).center();
        let end = CellCoord::new(end.0, end.1).center();
        let waypoints = finder()
            .find_waypoints(&Locator::new(), &PathRequest::new(start, end))
            .expect("open ground always has a route");
        prop_assert_eq!(waypoints, vec![start, end]);
    }
}

#[test]
fn walking_a_found_route_ends_at_the_goal() {
    let walls: BTreeSet<(i32, i32)> = (0..8).map(|row| (4, row)).collect();
    let locator = locator_with(&walls);
    let start = Position::new(1.5, 2.5);
    let end = Position::new(7.5, 2.5);

    let mut path: Path = finder()
        .find(&locator, &PathRequest::new(start, end))
        .expect("route around the wall");

    let total = path.remaining_distance();
    assert!(total > start.distance(end));

    let mut ticks = 0;
    while path.en_route(0.0) && ticks < 10_000 {
        let _ = path.advance(1.0, 0.05, 0.0);
        ticks += 1;
    }
    assert!(path.has_arrived());
    assert_eq!(path.position(), end);
    assert!(!path.passage_points().is_empty());
}
