//! Scoped slot ownership

use super::{SlotId, UserDirectory};
use std::sync::Arc;

/// Owns one directory slot for the lifetime of a session
///
/// The slot is released exactly once: either by [`SlotLease::release`] or
/// when the lease is dropped, whichever comes first.
pub struct SlotLease<C: Clone> {
    directory: Arc<UserDirectory<C>>,
    slot: SlotId,
    released: bool,
}

impl<C: Clone> SlotLease<C> {
    pub(crate) fn new(directory: Arc<UserDirectory<C>>, slot: SlotId) -> Self {
        Self {
            directory,
            slot,
            released: false,
        }
    }

    /// The leased slot
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// The directory the slot belongs to
    pub fn directory(&self) -> &UserDirectory<C> {
        &self.directory
    }

    /// Store the display name and mark the slot active
    pub fn activate(&self, name: &str) -> bool {
        !self.released && self.directory.activate(self.slot, name)
    }

    /// Check if the slot is still active
    pub fn is_active(&self) -> bool {
        !self.released && self.directory.is_active(self.slot)
    }

    /// Release the slot now
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.directory.release(self.slot);
        }
    }
}

impl<C: Clone> Drop for SlotLease<C> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<C: Clone> std::fmt::Debug for SlotLease<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotLease")
            .field("slot", &self.slot)
            .field("released", &self.released)
            .finish()
    }
}
