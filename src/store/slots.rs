use std::fmt;

use log::debug;

use crate::error::{CoreError, CoreResult};
use crate::models::Entry;

/// Position of a slot, 0-based. Displayed 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub fn new(index: usize) -> Self {
        SlotIndex(index)
    }

    /// From the 1-based number shown to users. `0` has no slot.
    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).map(SlotIndex)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn number(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.number())
    }
}

/// Fixed number of slots, each either empty or owning one entry.
///
/// Allocation is first-fit by index. Releasing a slot leaves a hole that the
/// next allocation fills; nothing is ever shifted.
#[derive(Debug, Clone)]
pub struct EntrySlotStore {
    slots: Vec<Option<Entry>>,
}

impl EntrySlotStore {
    pub fn with_capacity(capacity: usize) -> Self {
        EntrySlotStore {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn allocate(&mut self, entry: Entry) -> CoreResult<SlotIndex> {
        let Some(free) = self.slots.iter().position(Option::is_none) else {
            return Err(CoreError::NoCapacity {
                capacity: self.capacity(),
            });
        };
        debug!("slot {} <- '{}'", SlotIndex(free), entry.name);
        self.slots[free] = Some(entry);
        Ok(SlotIndex(free))
    }

    /// Free a slot. Releasing an empty or unknown slot does nothing.
    pub fn release(&mut self, index: SlotIndex) -> Option<Entry> {
        let released = self.slots.get_mut(index.get()).and_then(Option::take);
        if let Some(entry) = &released {
            debug!("slot {} released ('{}')", index, entry.name);
        }
        released
    }

    pub fn get(&self, index: SlotIndex) -> Option<&Entry> {
        self.slots.get(index.get()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Entry> {
        self.slots.get_mut(index.get()).and_then(Option::as_mut)
    }

    #[allow(dead_code)]
    pub fn is_occupied(&self, index: SlotIndex) -> bool {
        self.get(index).is_some()
    }

    /// Occupied slots in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, &Entry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (SlotIndex(i), e)))
    }

    /// The entries in slot order, without their positions. This is the
    /// sequence that gets persisted.
    pub fn active_entries(&self) -> Vec<Entry> {
        self.occupied().map(|(_, e)| e.clone()).collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}
