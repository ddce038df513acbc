//! Fan-out delivery
//!
//! Writes one line to many sessions, and announces poll results when a poll
//! expires.

mod expiry;
mod fanout;

pub use expiry::spawn_expiry_watcher;
pub use fanout::fan_out;
