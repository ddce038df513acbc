//! Parley chat server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p parley-server
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use parley_common::{try_init_tracing_with_config, AppConfig, AppResult, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(code = e.error_code(), error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    // Configuration first: the environment decides the log format
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        chat = %config.chat.listen.address(),
        admin_enabled = config.admin.enabled,
        poll_secs = config.poll.duration().as_secs(),
        "Configuration loaded"
    );

    parley_server::run(config).await
}
