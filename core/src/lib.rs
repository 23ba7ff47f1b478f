#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bulwark simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the spatial and navigation systems, and the adapters driving them.
//! Adapters submit [`Command`] values describing desired mutations, the world
//! applies them strictly between ticks, and reports what happened through
//! [`Event`] values drained by the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod arena;
mod combat;
mod entity;
mod formula;
mod geometry;
mod kinds;
mod locate;

pub use arena::{Arena, EntityId};
pub use combat::DamagePayload;
pub use entity::{Energy, Entity, EntityKind, Handle, OwnerId, Vitals};
pub use formula::{Curve, LevelScale, UpgradableFormula, UpgradeCost};
pub use geometry::{
    footprint_contains, heading, normalize_angle, Aabb, CellBounds, CellCoord, Position,
};
pub use kinds::{Difficulty, MobKind, TowerKind, UpgradeKind};
pub use locate::{LocatorEntry, OwnerFilter, SortMode};

/// Simulation run state mirrored from the presentation layer's pause toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Ticks advance the simulation.
    Running,
    /// Transitional: effect timers are being frozen.
    Pausing,
    /// Ticks are ignored.
    Paused,
    /// Transitional: effect timers are being rebased.
    Resuming,
}

impl RunState {
    /// Reports whether ticks currently advance the simulation.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Commands that express every permissible mutation of the world.
///
/// Commands are applied strictly between ticks.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Selects the tower type subsequent placements will build.
    SelectTowerKind {
        /// Tower type to build, or `None` to clear the selection.
        kind: Option<TowerKind>,
    },
    /// Builds the selected tower type in the provided cell.
    PlaceTower {
        /// Cell that will host the tower.
        cell: CellCoord,
    },
    /// Builds a player wall in the provided cell.
    BuildWall {
        /// Cell that will host the wall.
        cell: CellCoord,
    },
    /// Buys the next level of an upgrade for a tower.
    UpgradeTower {
        /// Tower receiving the upgrade.
        tower: EntityId,
        /// Statistic being upgraded.
        upgrade: UpgradeKind,
    },
    /// Sells a tower, refunding part of the gold invested in it.
    SellTower {
        /// Tower being sold.
        tower: EntityId,
    },
    /// Toggles between running and paused.
    TogglePause,
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CommandError {
    /// The player cannot afford the purchase.
    #[error("insufficient gold: {required} required, {available} available")]
    InsufficientGold {
        /// Gold the purchase costs.
        required: f32,
        /// Gold the player holds.
        available: f32,
    },
    /// No tower type was selected before placing a tower.
    #[error("no tower type selected")]
    NoTowerSelected,
    /// The cell lies outside the playable grid.
    #[error("cell ({column}, {row}) is outside the grid")]
    OutOfBounds {
        /// Column of the rejected cell.
        column: i32,
        /// Row of the rejected cell.
        row: i32,
    },
    /// The cell already hosts a block or a mob.
    #[error("cell ({column}, {row}) is occupied")]
    Occupied {
        /// Column of the rejected cell.
        column: i32,
        /// Row of the rejected cell.
        row: i32,
    },
    /// The identifier does not address a live tower.
    #[error("no live tower with id {0:?}")]
    UnknownTower(EntityId),
    /// The tower does not define the requested upgrade.
    #[error("tower does not support the {0:?} upgrade")]
    UnsupportedUpgrade(UpgradeKind),
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Gold accumulated during a tick was added to the player's balance.
    GoldEarned {
        /// Gold credited by the tick.
        amount: f32,
    },
    /// A spawner released a wave.
    WaveSpawned {
        /// Spawner that released the wave.
        spawner: EntityId,
        /// Number of mobs in the wave.
        count: u32,
    },
    /// A mob reached a portal.
    MobBreached {
        /// Mob that breached.
        mob: EntityId,
        /// Portal that absorbed the mob.
        portal: EntityId,
        /// Lives the portal has left.
        lives_remaining: u32,
    },
    /// A mob was killed by a tower, a projectile, or poison.
    MobKilled {
        /// Mob that died.
        mob: EntityId,
        /// Gold credited for the kill.
        bounty: f32,
    },
    /// A portal ran out of lives.
    PortalDepleted {
        /// Portal with no lives left.
        portal: EntityId,
    },
    /// A wall or tower was destroyed by mobs.
    BlockDestroyed {
        /// Destroyed block.
        block: Handle,
    },
    /// The run state changed.
    RunStateChanged {
        /// Newly entered state.
        state: RunState,
    },
    /// The tower type to build changed.
    TowerKindSelected {
        /// Selected tower type, if any.
        kind: Option<TowerKind>,
    },
    /// A tower was placed.
    TowerPlaced {
        /// Identifier of the new tower.
        tower: EntityId,
        /// Type of the new tower.
        kind: TowerKind,
        /// Cell hosting the tower.
        cell: CellCoord,
    },
    /// A player wall was built.
    WallBuilt {
        /// Identifier of the new wall.
        wall: EntityId,
        /// Cell hosting the wall.
        cell: CellCoord,
    },
    /// A tower bought an upgrade level.
    TowerUpgraded {
        /// Upgraded tower.
        tower: EntityId,
        /// Upgraded statistic.
        upgrade: UpgradeKind,
        /// Level reached.
        level: u32,
    },
    /// A tower was sold.
    TowerSold {
        /// Sold tower.
        tower: EntityId,
        /// Gold refunded.
        refund: f32,
    },
    /// A command was rejected without mutating the world.
    CommandRejected {
        /// Why the command was rejected.
        reason: CommandError,
    },
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Difficulty, EntityId, MobKind, TowerKind, UpgradeKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&EntityId::new(42, 7));
        assert_round_trip(&CellCoord::new(-3, 9));
    }

    #[test]
    fn catalogues_round_trip_through_bincode() {
        assert_round_trip(&TowerKind::Venom);
        assert_round_trip(&MobKind::Warden);
        assert_round_trip(&UpgradeKind::StunDuration);
        assert_round_trip(&Difficulty::Hard);
    }

    #[test]
    fn command_errors_render_readable_messages() {
        let error = super::CommandError::InsufficientGold {
            required: 50.0,
            available: 10.0,
        };
        assert_eq!(
            error.to_string(),
            "insufficient gold: 50 required, 10 available"
        );
    }
}
