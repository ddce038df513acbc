use super::{generate_id, Session};
use crate::connection::{Connection, LineReader};
use crate::server::ServerState;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};

/// Run one client session over `stream` until it ends
///
/// Claims a directory slot first; if none is free the client is told so and
/// the connection is closed. The slot is released and the connection closed
/// on every exit path.
pub async fn serve<S>(state: ServerState, stream: S, peer: Option<SocketAddr>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let session_id = generate_id();
    let (read_half, write_half) = tokio::io::split(stream);
    let (connection, writer) =
        Connection::open(session_id.clone(), peer, write_half, state.shutdown_token());

    let lease = match state.directory().lease(connection.clone()) {
        Ok(lease) => lease,
        Err(e) => {
            tracing::warn!(
                session_id = %session_id,
                peer = ?peer,
                code = e.code(),
                error = %e,
                "Rejecting connection"
            );
            let _ = connection.send(e.to_string()).await;
            connection.close();
            let _ = writer.await;
            return;
        }
    };

    tracing::info!(
        session_id = %session_id,
        slot = %lease.slot(),
        peer = ?peer,
        "Connection established"
    );

    let mut session = Session::new(state, connection, lease, LineReader::new(read_half));

    match session.run().await {
        Ok(()) => {}
        Err(e) if e.is_disconnect() => {
            tracing::debug!(session_id = %session_id, error = %e, "Client disconnected");
        }
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Session failed");
        }
    }

    tracing::info!(
        session_id = %session_id,
        slot = %session.slot(),
        name = %session.name(),
        age_ms = session.connection().age().as_millis() as u64,
        "Cleaning up connection"
    );
    session.close();
    drop(session);

    let _ = writer.await;
}
