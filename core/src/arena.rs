//! Generational arena used for every entity collection in the world.
//!
//! Entities reference each other through [`EntityId`] values. An identifier
//! carries the generation of the slot it was issued for, so a lookup through
//! an identifier whose entity was purged (and whose slot may have been reused)
//! resolves to `None` instead of aliasing the new occupant.

use serde::{Deserialize, Serialize};

/// Stable identifier of an entity stored inside an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates an identifier from raw parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index addressed by the identifier.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time the identifier was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with generation-checked identifiers and slot reuse.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live values stored in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the arena holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a value and returns the identifier allocated for it.
    pub fn insert(&mut self, value: T) -> EntityId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return EntityId::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        EntityId::new(index, 0)
    }

    /// Removes the value addressed by the identifier, if it is still present.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    /// Reports whether the identifier still addresses a stored value.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Borrows the value addressed by the identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Mutably borrows the value addressed by the identifier.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Identifiers of every stored value in slot order.
    ///
    /// The returned list is detached from the arena so callers may mutate
    /// values while walking it.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Iterates over stored values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (EntityId::new(index as u32, slot.generation), value))
        })
    }

    /// Mutably iterates over stored values in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (EntityId::new(index as u32, generation), value))
        })
    }

    /// Removes every value rejected by the predicate and returns the removed identifiers.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<EntityId>
    where
        F: FnMut(&T) -> bool,
    {
        let doomed: Vec<EntityId> = self
            .iter()
            .filter(|(_, value)| !keep(value))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            let _ = self.remove(*id);
        }
        doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_identifier_does_not_alias_reused_slot() {
        let mut arena = Arena::new();
        let first = arena.insert("wall");
        assert_eq!(arena.remove(first), Some("wall"));

        let second = arena.insert("tower");
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&"tower"));
    }

    #[test]
    fn retain_reports_removed_identifiers_in_slot_order() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);

        let removed = arena.retain(|value| value % 2 == 0);

        assert_eq!(removed, vec![a, c]);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.ids(), vec![b]);
    }

    #[test]
    fn iteration_skips_empty_slots() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let _ = arena.insert('b');
        let _ = arena.remove(a);

        let values: Vec<char> = arena.iter().map(|(_, value)| *value).collect();
        assert_eq!(values, vec!['b']);
        assert!(!arena.is_empty());
    }
}
