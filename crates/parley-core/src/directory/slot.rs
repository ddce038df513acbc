//! Directory slots

use serde::Serialize;
use std::fmt;

/// Index of a slot in the user directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotId(usize);

impl SlotId {
    /// Create a slot id from a raw index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One directory entry
///
/// `connection` is `Some` iff a session owns the slot; `active` is only ever
/// true while `connection` is `Some`.
#[derive(Debug)]
pub(crate) struct Slot<C> {
    pub(crate) connection: Option<C>,
    pub(crate) name: String,
    pub(crate) active: bool,
}

impl<C> Slot<C> {
    pub(crate) fn empty() -> Self {
        Self {
            connection: None,
            name: String::new(),
            active: false,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.connection.is_none()
    }

    pub(crate) fn clear(&mut self) {
        self.connection = None;
        self.name.clear();
        self.active = false;
    }
}
