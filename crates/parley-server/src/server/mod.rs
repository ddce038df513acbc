//! Chat server setup
//!
//! Binds the chat listener (scanning for a free port), serves the admin
//! router, and accepts connections until shutdown.

mod admin;
mod state;

pub use admin::{create_app, create_router};
pub use state::{ChatDirectory, ServerState, ServerStats};

use crate::session::serve;
use parley_common::{AppConfig, AppError, AppResult, ChatConfig};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

/// How long sessions get to wind down after shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound, not yet running, chat server
pub struct ChatServer {
    listener: TcpListener,
    admin: Option<TcpListener>,
    state: ServerState,
}

impl ChatServer {
    /// Bind the chat listener and, if enabled, the admin listener
    pub async fn bind(config: AppConfig) -> AppResult<Self> {
        let listener = bind_chat_listener(&config.chat).await?;

        let admin = if config.admin.enabled {
            let addr = config.admin.listen.address();
            let admin = TcpListener::bind(&addr)
                .await
                .map_err(|e| AppError::bind(addr, e))?;
            Some(admin)
        } else {
            None
        };

        Ok(Self {
            listener,
            admin,
            state: ServerState::new(config),
        })
    }

    /// Address the chat listener is bound to
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Address the admin listener is bound to, if enabled
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Shared state (for triggering start or shutdown from outside)
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Accept connections until the shutdown token is cancelled
    pub async fn run(self) -> AppResult<()> {
        let Self {
            listener,
            admin,
            state,
        } = self;

        tracing::info!(addr = %listener.local_addr()?, "Chat listening");

        if state.config().chat.auto_start {
            state.gate().open();
        } else {
            tracing::info!("Chat will start on POST /admin/start");
        }

        let admin_task = admin.map(|admin| {
            let app = create_app(state.clone());
            let token = state.shutdown_token().clone();
            tokio::spawn(async move {
                if let Ok(addr) = admin.local_addr() {
                    tracing::info!(addr = %addr, "Admin listening");
                }
                let result = axum::serve(admin, app)
                    .with_graceful_shutdown(async move { token.cancelled().await })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Admin server failed");
                }
            })
        });

        let mut sessions = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                () = state.shutdown_token().cancelled() => break,
                Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            tracing::debug!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
                        }
                        sessions.spawn(serve(state.clone(), stream, Some(peer)));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        drop(listener);
        tracing::info!(sessions = sessions.len(), "Waiting for sessions to finish");

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while sessions.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!(remaining = sessions.len(), "Aborting sessions that did not finish");
            sessions.abort_all();
        }

        if let Some(task) = admin_task {
            let _ = task.await;
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl std::fmt::Debug for ChatServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatServer")
            .field("addr", &self.listener.local_addr().ok())
            .field("admin_addr", &self.admin_addr())
            .finish()
    }
}

/// Bind the first free port in `port..port + port_scan`
///
/// Port 0 asks the OS for any free port and skips the scan.
async fn bind_chat_listener(chat: &ChatConfig) -> AppResult<TcpListener> {
    let host = chat.listen.host.as_str();
    let first = chat.listen.port;

    if first == 0 || chat.port_scan <= 1 {
        let addr = chat.listen.address();
        return TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::bind(addr, e));
    }

    let last = first.saturating_add(chat.port_scan - 1);
    for port in first..=last {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port in use, trying next");
            }
            Err(e) => return Err(AppError::bind(format!("{host}:{port}"), e)),
        }
    }

    Err(AppError::NoFreePort {
        host: host.to_string(),
        first,
        last,
    })
}

/// Resolve on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Run the complete chat server with configuration
///
/// Returns once Ctrl-C, SIGTERM or `POST /admin/shutdown` has stopped it.
pub async fn run(config: AppConfig) -> AppResult<()> {
    let server = ChatServer::bind(config).await?;
    let state = server.state().clone();

    tokio::spawn(async move {
        tokio::select! {
            () = shutdown_signal() => state.shutdown(),
            () = state.shutdown_token().cancelled() => {}
        }
    });

    server.run().await
}
