//! Immobile entities occupying whole cells.

use bulwark_core::{Arena, CellCoord, Entity, EntityId, EntityKind, OwnerId, Position, Vitals};

use crate::{context::StepInfo, mob::Mob, spawner::Spawner, tower::Tower};

/// Footprint size of every block.
pub const BLOCK_RADIUS: f32 = 1.0;

/// Exit mobs try to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Portal {
    /// Lives left before the portal is depleted.
    pub lives: u32,
}

/// Obstacle mobs must walk around or break through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    /// Visual height of the wall.
    pub height: f32,
}

/// Variant-specific state of a block.
#[derive(Clone, Debug)]
pub enum BlockPayload {
    /// Exit absorbing breaching mobs.
    Portal(Portal),
    /// Plain obstacle.
    Wall(Wall),
    /// Source of mob waves.
    Spawner(Spawner),
    /// Player defence.
    Tower(Tower),
}

/// Block entity: common lifecycle state plus a variant payload.
#[derive(Clone, Debug)]
pub struct Block {
    pub(crate) position: Position,
    pub(crate) radius: f32,
    pub(crate) owner: Option<OwnerId>,
    pub(crate) vitals: Vitals,
    pub(crate) payload: BlockPayload,
}

impl Block {
    /// Creates a block centred in `cell`.
    #[must_use]
    pub fn new(cell: CellCoord, owner: Option<OwnerId>, health: f32, payload: BlockPayload) -> Self {
        Self {
            position: cell.center(),
            radius: BLOCK_RADIUS,
            owner,
            vitals: Vitals::new(health),
            payload,
        }
    }

    /// Unowned portal with `lives` lives.
    #[must_use]
    pub fn portal(cell: CellCoord, lives: u32) -> Self {
        Self::new(cell, None, 1.0, BlockPayload::Portal(Portal { lives }))
    }

    /// Wall with the provided health.
    #[must_use]
    pub fn wall(cell: CellCoord, owner: Option<OwnerId>, health: f32, height: f32) -> Self {
        Self::new(cell, owner, health, BlockPayload::Wall(Wall { height }))
    }

    /// Unowned spawner.
    #[must_use]
    pub fn spawner(cell: CellCoord, spawner: Spawner) -> Self {
        Self::new(cell, None, 1.0, BlockPayload::Spawner(spawner))
    }

    /// Tower owned by `owner`, with health taken from its profile.
    #[must_use]
    pub fn tower(cell: CellCoord, owner: OwnerId, tower: Tower) -> Self {
        let health = tower.profile().health;
        Self::new(cell, Some(owner), health, BlockPayload::Tower(tower))
    }

    /// Replaces the health state, used when restoring saved blocks.
    #[must_use]
    pub(crate) fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = vitals;
        self
    }

    /// Kind tag of the block.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self.payload {
            BlockPayload::Portal(_) => EntityKind::Portal,
            BlockPayload::Wall(_) => EntityKind::Wall,
            BlockPayload::Spawner(_) => EntityKind::Spawner,
            BlockPayload::Tower(_) => EntityKind::Tower,
        }
    }

    /// Cell the block occupies.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        CellCoord::containing(self.position)
    }

    /// Variant-specific state.
    #[must_use]
    pub const fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    /// Portal state, if the block is a portal.
    #[must_use]
    pub fn as_portal(&self) -> Option<&Portal> {
        match &self.payload {
            BlockPayload::Portal(portal) => Some(portal),
            _ => None,
        }
    }

    /// Spawner state, if the block is a spawner.
    #[must_use]
    pub fn as_spawner(&self) -> Option<&Spawner> {
        match &self.payload {
            BlockPayload::Spawner(spawner) => Some(spawner),
            _ => None,
        }
    }

    /// Tower state, if the block is a tower.
    #[must_use]
    pub fn as_tower(&self) -> Option<&Tower> {
        match &self.payload {
            BlockPayload::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    pub(crate) fn as_tower_mut(&mut self) -> Option<&mut Tower> {
        match &mut self.payload {
            BlockPayload::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    /// Advances spawners and towers; portals and walls are inert.
    pub(crate) fn step(&mut self, id: EntityId, info: &mut StepInfo<'_>, mobs: &mut Arena<Mob>) {
        if !self.is_live() {
            return;
        }
        let position = self.position;
        let owner = self.owner;
        match &mut self.payload {
            BlockPayload::Portal(_) | BlockPayload::Wall(_) => {}
            BlockPayload::Spawner(spawner) => spawner.step(id, position, info),
            BlockPayload::Tower(tower) => tower.step(id, position, owner, info, mobs),
        }
    }

    pub(crate) fn pause(&mut self, now: f64) {
        if let BlockPayload::Tower(tower) = &mut self.payload {
            tower.pause(now);
        }
    }

    pub(crate) fn resume(&mut self, now: f64) {
        if let BlockPayload::Tower(tower) = &mut self.payload {
            tower.resume(now);
        }
    }
}

impl Entity for Block {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_sit_in_cell_centres() {
        let wall = Block::wall(CellCoord::new(3, 4), Some(OwnerId::PLAYER), 10.0, 1.0);
        assert_eq!(wall.position(), Position::new(3.5, 4.5));
        assert_eq!(wall.cell(), CellCoord::new(3, 4));
        assert_eq!(wall.kind(), EntityKind::Wall);
        assert_eq!(wall.owner(), Some(OwnerId::PLAYER));
    }

    #[test]
    fn payload_accessors_match_variant() {
        let portal = Block::portal(CellCoord::new(0, 0), 7);
        assert_eq!(portal.as_portal().map(|portal| portal.lives), Some(7));
        assert!(portal.as_tower().is_none());
        assert!(portal.as_spawner().is_none());
        assert!(portal.is_live());
    }
}
