//! # parley-server
//!
//! Line-oriented TCP chat server: connection handles, the per-client session
//! state machine, command handlers, timed poll announcements and the admin
//! HTTP surface.

pub mod broadcast;
pub mod connection;
pub mod gate;
pub mod handlers;
pub mod server;
pub mod session;

pub use gate::ChatGate;
pub use server::{run, ChatServer, ServerState};
