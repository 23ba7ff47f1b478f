//! Contracts shared by the locator and the code that captures its snapshots.

use crate::{EntityKind, Handle, OwnerId, Position};

/// Positional snapshot of a single entity taken when a locator is captured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocatorEntry {
    /// Kind tag and identifier of the entity.
    pub handle: Handle,
    /// Location of the entity at capture time.
    pub position: Position,
    /// Size of the entity at capture time.
    pub radius: f32,
    /// Owner of the entity, if any.
    pub owner: Option<OwnerId>,
    /// Whether the entity was alive and not flagged for deletion at capture time.
    pub live: bool,
}

impl LocatorEntry {
    /// Kind tag of the captured entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.handle.kind
    }
}

/// Ordering applied to visibility query results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    /// Collection order.
    #[default]
    None,
    /// Ascending distance to the query's reference point.
    Distance,
    /// Ascending by `x`, then `y`, for back-to-front layering.
    ZOrder,
}

/// Include/exclude filter on entity ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OwnerFilter {
    /// Every entity matches.
    #[default]
    Any,
    /// Only entities owned by the provided owner match.
    Include(OwnerId),
    /// Every entity not owned by the provided owner matches.
    Exclude(OwnerId),
}

impl OwnerFilter {
    /// Reports whether an entity with the provided owner passes the filter.
    #[must_use]
    pub fn matches(&self, owner: Option<OwnerId>) -> bool {
        match self {
            Self::Any => true,
            Self::Include(wanted) => owner == Some(*wanted),
            Self::Exclude(unwanted) => owner != Some(*unwanted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_filter_keeps_unowned_entities() {
        let filter = OwnerFilter::Exclude(OwnerId::PLAYER);
        assert!(filter.matches(None));
        assert!(filter.matches(Some(OwnerId::new(3))));
        assert!(!filter.matches(Some(OwnerId::PLAYER)));
    }

    #[test]
    fn include_filter_rejects_unowned_entities() {
        let filter = OwnerFilter::Include(OwnerId::PLAYER);
        assert!(!filter.matches(None));
        assert!(filter.matches(Some(OwnerId::PLAYER)));
    }
}
