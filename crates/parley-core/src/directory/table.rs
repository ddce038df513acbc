//! Slot table
//!
//! Manages every connected session using a single `parking_lot::Mutex`.

use super::{Slot, SlotId, SlotLease};
use crate::error::{DomainError, DomainResult};
use crate::text::normalize_name;
use parking_lot::Mutex;
use std::sync::Arc;

/// Maximum number of concurrent sessions
pub const DIRECTORY_CAPACITY: usize = 1024;

struct Table<C> {
    slots: Vec<Slot<C>>,
    /// Number of occupied slots
    live: usize,
}

/// Fixed-capacity table of client slots
///
/// Generic over the connection handle `C` so the directory can be exercised
/// without a network. Handles are cloned out of the table so callers can write
/// to them after the lock is released.
pub struct UserDirectory<C> {
    table: Mutex<Table<C>>,
}

impl<C: Clone> UserDirectory<C> {
    /// Create a directory with the default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DIRECTORY_CAPACITY)
    }

    /// Create a directory with a custom capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| Slot::empty()).collect();
        Self {
            table: Mutex::new(Table { slots, live: 0 }),
        }
    }

    /// Create a new directory wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Claim the first empty slot for `connection`
    ///
    /// The slot starts inactive (naming pending).
    pub fn allocate(&self, connection: C) -> DomainResult<SlotId> {
        let mut table = self.table.lock();

        let Some(index) = table.slots.iter().position(Slot::is_empty) else {
            tracing::warn!(capacity = table.slots.len(), "User directory is full");
            return Err(DomainError::DirectoryFull);
        };

        let slot = &mut table.slots[index];
        slot.connection = Some(connection);
        slot.name.clear();
        slot.active = false;
        table.live += 1;

        tracing::debug!(slot = index, live = table.live, "Slot allocated");

        Ok(SlotId::new(index))
    }

    /// Claim a slot and wrap it in a guard that releases it on drop
    pub fn lease(self: &Arc<Self>, connection: C) -> DomainResult<SlotLease<C>> {
        let slot = self.allocate(connection)?;
        Ok(SlotLease::new(self.clone(), slot))
    }

    /// Store the display name and mark the slot active
    ///
    /// Returns false if the slot is not owned by anyone.
    pub fn activate(&self, slot: SlotId, name: &str) -> bool {
        let name = normalize_name(name);
        let mut table = self.table.lock();

        match table.slots.get_mut(slot.index()) {
            Some(entry) if !entry.is_empty() => {
                entry.name = name;
                entry.active = true;
                tracing::debug!(slot = %slot, name = %entry.name, "Slot activated");
                true
            }
            _ => false,
        }
    }

    /// Free a slot
    ///
    /// Calling it again on an already-empty slot is a no-op that returns false.
    pub fn release(&self, slot: SlotId) -> bool {
        let mut table = self.table.lock();

        let Some(entry) = table.slots.get_mut(slot.index()) else {
            return false;
        };
        if entry.is_empty() {
            return false;
        }

        entry.clear();
        table.live -= 1;

        tracing::debug!(slot = %slot, live = table.live, "Slot released");

        true
    }

    /// Find the lowest-index active slot with exactly this name
    pub fn find_by_name(&self, name: &str) -> Option<SlotId> {
        self.find_connection(name).map(|(slot, _)| slot)
    }

    /// Find the lowest-index active slot with this name and copy its handle
    pub fn find_connection(&self, name: &str) -> Option<(SlotId, C)> {
        let table = self.table.lock();

        table
            .slots
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.active && entry.name == name)
            .and_then(|(index, entry)| {
                entry
                    .connection
                    .clone()
                    .map(|connection| (SlotId::new(index), connection))
            })
    }

    /// Names of all active slots, in ascending slot order
    pub fn snapshot_active_names(&self) -> Vec<String> {
        let table = self.table.lock();

        table
            .slots
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Handles of all active slots, in ascending slot order, optionally skipping one
    pub fn active_connections(&self, except: Option<SlotId>) -> Vec<(SlotId, C)> {
        let table = self.table.lock();

        table
            .slots
            .iter()
            .enumerate()
            .filter(|(index, entry)| entry.active && Some(SlotId::new(*index)) != except)
            .filter_map(|(index, entry)| {
                entry
                    .connection
                    .clone()
                    .map(|connection| (SlotId::new(index), connection))
            })
            .collect()
    }

    /// Get the handle stored in a slot
    pub fn connection_of(&self, slot: SlotId) -> Option<C> {
        let table = self.table.lock();
        table
            .slots
            .get(slot.index())
            .and_then(|entry| entry.connection.clone())
    }

    /// Get the display name of an active slot
    pub fn name_of(&self, slot: SlotId) -> Option<String> {
        let table = self.table.lock();
        table
            .slots
            .get(slot.index())
            .filter(|entry| entry.active)
            .map(|entry| entry.name.clone())
    }

    /// Check if a slot is active
    pub fn is_active(&self, slot: SlotId) -> bool {
        let table = self.table.lock();
        table
            .slots
            .get(slot.index())
            .is_some_and(|entry| entry.active)
    }

    /// Number of occupied slots (named or not)
    pub fn live_count(&self) -> usize {
        self.table.lock().live
    }

    /// Number of active (named) slots
    pub fn active_count(&self) -> usize {
        let table = self.table.lock();
        table.slots.iter().filter(|entry| entry.active).count()
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.table.lock().slots.len()
    }
}

impl<C: Clone> Default for UserDirectory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for UserDirectory<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.lock();
        f.debug_struct("UserDirectory")
            .field("capacity", &table.slots.len())
            .field("live", &table.live)
            .finish()
    }
}
