use crate::server::ChatDirectory;
use parley_core::SlotId;

/// Deliver `line` to every active session except `except`
///
/// Handles are copied out under the directory lock; the writes happen after
/// it is released. Returns how many sessions accepted the line.
pub fn fan_out(directory: &ChatDirectory, except: Option<SlotId>, line: &str) -> usize {
    let targets = directory.active_connections(except);

    targets
        .iter()
        .filter(|(slot, connection)| {
            let delivered = connection.deliver(line);
            if !delivered {
                tracing::debug!(slot = %slot, "Fan-out line not delivered");
            }
            delivered
        })
        .count()
}
