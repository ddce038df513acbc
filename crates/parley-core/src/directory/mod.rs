//! User directory
//!
//! Fixed-capacity slot table shared by every session. All reads and writes go
//! through one exclusive lock whose critical sections never perform I/O.

mod lease;
mod slot;
mod table;

use slot::Slot;

pub use lease::SlotLease;
pub use slot::SlotId;
pub use table::{UserDirectory, DIRECTORY_CAPACITY};
