//! Connection handles
//!
//! The outbound half of a client socket is a bounded queue drained by a
//! writer task; the inbound half is a bounded line reader.

mod connection;
mod reader;

pub use connection::{Connection, OUTBOUND_BUFFER};
pub use reader::LineReader;
