use std::time::Duration;

use bulwark_core::{
    CellCoord, Command, Entity, EntityId, EntityKind, Event, MobKind, OwnerId, Position,
    TowerKind, UpgradableFormula,
};
use bulwark_world::{
    self as world, query, Behavior, Block, Mob, NavigationTuning, Tower, TowerProfile, World,
    WorldConfig,
};

const DT: Duration = Duration::from_millis(100);

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: DT }, &mut events);
    events
}

/// Cells surrounding `center`, orthogonal neighbours first.
fn ring(center: CellCoord) -> Vec<CellCoord> {
    [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ]
    .into_iter()
    .map(|(columns, rows)| center.offset(columns, rows))
    .collect()
}

fn objective_kind(world: &World, mob: EntityId) -> Option<EntityKind> {
    let target = match query::mob(world, mob)?.behavior() {
        Behavior::Idle => return None,
        Behavior::SeekingPortal { portal } => portal,
        Behavior::BreakingDefense { target } => target,
    };
    query::block(world, target).map(Block::kind)
}

#[test]
fn crawler_walks_straight_into_the_portal() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(10, 10), 20));
    let mob = world.insert_mob(Mob::new(MobKind::Crawler, Position::new(0.5, 0.5), 10.0));

    let expected = Position::new(0.5, 0.5).distance(Position::new(10.5, 10.5));
    let mut breached_at = None;
    for _ in 0..200 {
        let events = tick(&mut world);
        let breached = events.iter().any(|event| {
            matches!(
                event,
                Event::MobBreached {
                    mob: breaching,
                    lives_remaining: 19,
                    ..
                } if *breaching == mob
            )
        });
        if breached {
            breached_at = Some(query::moment(&world));
            break;
        }
    }

    let breached_at = breached_at.expect("mob reached the portal");
    let dt = DT.as_secs_f64();
    assert!(
        breached_at >= f64::from(expected) - dt && breached_at <= f64::from(expected) + 2.0 * dt,
        "breach at {breached_at}, expected about {expected}"
    );
    assert_eq!(query::portal_lives(&world), 19);
    assert!(query::mob(&world, mob).is_none(), "breaching mob is purged");
}

#[test]
fn tower_that_cannot_turn_never_fires_at_mobs_behind_it() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(2, 12), 20));

    let profile = TowerProfile {
        rotation_speed: UpgradableFormula::constant(0.0),
        min_range: UpgradableFormula::constant(0.0),
        max_range: UpgradableFormula::constant(2.5),
        ..TowerProfile::of(TowerKind::Basic)
    };
    let tower = world.insert_block(Block::tower(
        CellCoord::new(4, 7),
        OwnerId::PLAYER,
        Tower::with_profile(TowerKind::Basic, profile).with_orientation(0.0),
    ));
    let _ = world.insert_mob(Mob::new(MobKind::Crawler, Position::new(2.5, 2.5), 50.0));

    let mut acquired = false;
    for _ in 0..150 {
        let _ = tick(&mut world);
        let state = query::block(&world, tower)
            .and_then(Block::as_tower)
            .expect("tower stays alive");
        acquired |= state.target().is_some();

        assert_eq!(state.orientation(), 0.0);
        assert_eq!(state.energy().current(), state.energy().capacity());
        assert_eq!(query::counts(&world).projectiles, 0);
    }

    assert!(acquired, "mob passed within range");
    assert_eq!(query::portal_lives(&world), 19);
}

#[test]
fn paused_world_ignores_ticks() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(10, 10), 20));
    let mob = world.insert_mob(Mob::new(MobKind::Runner, Position::new(0.5, 0.5), 10.0));

    let _ = tick(&mut world);
    let mut events = Vec::new();
    world::apply(&mut world, Command::TogglePause, &mut events);
    let before = query::mob(&world, mob).map(Entity::position);
    let moment = query::moment(&world);

    for _ in 0..10 {
        assert!(tick(&mut world).is_empty());
    }

    assert_eq!(query::mob(&world, mob).map(Entity::position), before);
    assert_eq!(query::moment(&world), moment);
}

#[test]
fn enclosed_crawler_breaks_a_wall_and_then_breaches() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(12, 2), 20));
    for cell in ring(CellCoord::new(2, 2)) {
        let _ = world.insert_block(Block::wall(cell, None, 20.0, 1.0));
    }
    let mob = world.insert_mob(Mob::new(MobKind::Crawler, Position::new(2.5, 2.5), 10.0));

    let mut target = None;
    let mut first_hit = None;
    let mut destroyed_at = None;
    let mut breached_at = None;
    let mut drained = false;

    for index in 0..600 {
        let events = tick(&mut world);

        if let Some(state) = query::mob(&world, mob) {
            if let Behavior::BreakingDefense { target: wall } = state.behavior() {
                target = Some(wall);
            }
            drained |= state.energy().current() < state.energy().capacity();
        }
        let damaged = target
            .and_then(|wall| query::block(&world, wall))
            .is_some_and(|wall| wall.vitals().current() < wall.vitals().total());
        if damaged && first_hit.is_none() {
            first_hit = Some(index);
        }

        for event in &events {
            match event {
                Event::BlockDestroyed { block } => {
                    assert_eq!(block.kind, EntityKind::Wall);
                    assert_eq!(Some(block.id), target);
                    destroyed_at = Some(index);
                }
                Event::MobBreached { mob: breaching, .. } if *breaching == mob => {
                    breached_at = Some(index);
                }
                _ => {}
            }
        }
        if breached_at.is_some() {
            break;
        }
    }

    let first_hit = first_hit.expect("crawler reached a wall");
    let destroyed_at = destroyed_at.expect("crawler broke through");
    let breached_at = breached_at.expect("crawler escaped and breached");

    assert!(drained, "attacks spend energy");
    // Four attacks against a pool of two refilling at one per second.
    assert!(
        destroyed_at - first_hit >= 15,
        "attacks are gated by energy: first hit {first_hit}, destroyed {destroyed_at}"
    );
    assert!(breached_at > destroyed_at);
    assert_eq!(query::portal_lives(&world), 19);
    assert_eq!(query::counts(&world).blocks, 8);
}

#[test]
fn unreachable_portal_falls_back_to_walls_before_towers() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(12, 2), 20));
    let center = CellCoord::new(2, 2);
    for (index, cell) in ring(center).into_iter().enumerate() {
        let block = if index < 4 {
            Block::tower(cell, OwnerId::PLAYER, Tower::new(TowerKind::Basic))
        } else {
            Block::wall(cell, None, 50.0, 1.0)
        };
        let _ = world.insert_block(block);
    }
    let mob = world.insert_mob(Mob::new(MobKind::Crawler, center.center(), 1.0e6));

    let _ = tick(&mut world);
    assert_eq!(objective_kind(&world, mob), Some(EntityKind::Wall));
}

#[test]
fn towers_are_attacked_when_nothing_else_is_reachable() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(12, 2), 20));
    let center = CellCoord::new(2, 2);
    for cell in ring(center) {
        let _ = world.insert_block(Block::tower(
            cell,
            OwnerId::PLAYER,
            Tower::new(TowerKind::Basic),
        ));
    }
    let mob = world.insert_mob(Mob::new(MobKind::Crawler, center.center(), 1.0e6));

    let _ = tick(&mut world);
    assert_eq!(objective_kind(&world, mob), Some(EntityKind::Tower));
}

#[test]
fn reachable_portal_wins_over_nearby_defences() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(12, 2), 20));
    let _ = world.insert_block(Block::wall(CellCoord::new(2, 3), None, 50.0, 1.0));
    let mob = world.insert_mob(Mob::new(MobKind::Crawler, Position::new(2.5, 2.5), 10.0));

    let _ = tick(&mut world);
    assert_eq!(objective_kind(&world, mob), Some(EntityKind::Portal));
}

#[test]
fn new_walls_reroute_a_walking_mob() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(12, 0), 20));
    let mob = world.insert_mob(Mob::new(MobKind::Crawler, Position::new(0.5, 0.5), 10.0));

    for _ in 0..5 {
        let _ = tick(&mut world);
    }
    let before = query::mob(&world, mob)
        .and_then(Mob::path)
        .map(|path| path.waypoints())
        .expect("mob is walking");
    assert_eq!(before.len(), 2, "open ground is crossed in a straight line");

    let mut events = Vec::new();
    for row in 0..3 {
        world::apply(
            &mut world,
            Command::BuildWall {
                cell: CellCoord::new(6, row),
            },
            &mut events,
        );
    }
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::WallBuilt { .. }))
            .count(),
        3
    );

    let _ = tick(&mut world);
    let state = query::mob(&world, mob).expect("mob still walking");
    assert!(matches!(state.behavior(), Behavior::SeekingPortal { .. }));
    let after = state.path().map(|path| path.waypoints()).unwrap_or_default();
    assert!(after.len() > 2, "route bends around the new walls: {after:?}");
    assert!(after
        .iter()
        .all(|point| CellCoord::containing(*point).column() != 6 || point.y >= 3.0));

    let breached = (0..400).any(|_| {
        tick(&mut world)
            .iter()
            .any(|event| matches!(event, Event::MobBreached { .. }))
    });
    assert!(breached);
    assert_eq!(query::portal_lives(&world), 19);
}

#[test]
fn portal_reports_depletion_once() {
    let mut world = World::empty(WorldConfig::default(), 0);
    let _ = world.insert_block(Block::portal(CellCoord::new(10, 4), 1));
    for row in [0.5, 4.5, 8.5] {
        let _ = world.insert_mob(Mob::new(MobKind::Runner, Position::new(0.5, row), 10.0));
    }

    let mut breaches = 0;
    let mut depletions = 0;
    for _ in 0..300 {
        for event in tick(&mut world) {
            match event {
                Event::MobBreached { .. } => breaches += 1,
                Event::PortalDepleted { .. } => depletions += 1,
                _ => {}
            }
        }
    }

    assert_eq!(breaches, 3);
    assert_eq!(depletions, 1);
    assert_eq!(query::portal_lives(&world), 0);
    assert_eq!(query::counts(&world).mobs, 0);
}

#[test]
fn candidate_limit_decides_when_a_kind_is_given_up() {
    let outcome = |candidates: usize| {
        let config = WorldConfig {
            navigation: NavigationTuning {
                objective_candidates: candidates,
                ..NavigationTuning::default()
            },
            ..WorldConfig::default()
        };
        let mut world = World::empty(config, 0);

        let sealed = CellCoord::new(3, 3);
        let _ = world.insert_block(Block::wall(sealed, None, 50.0, 1.0));
        for cell in ring(sealed) {
            let _ = world.insert_block(Block::tower(
                cell,
                OwnerId::PLAYER,
                Tower::new(TowerKind::Basic),
            ));
        }
        let _ = world.insert_block(Block::wall(CellCoord::new(20, 10), None, 50.0, 1.0));
        let mob = world.insert_mob(Mob::new(MobKind::Crawler, Position::new(10.5, 10.5), 1.0e6));

        let _ = tick(&mut world);
        objective_kind(&world, mob)
    };

    assert_eq!(outcome(1), Some(EntityKind::Tower));
    assert_eq!(outcome(2), Some(EntityKind::Wall));
}
