//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers on loopback ports and
//! checking admin responses.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use parley_common::AppConfig;
use parley_server::{ChatServer, ServerState};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::ChatClient;

/// Test server instance that manages lifecycle
///
/// The server is shut down when this value is dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub admin_addr: Option<SocketAddr>,
    pub client: Client,
    state: ServerState,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a new test server with the chat already started
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let server = ChatServer::bind(config).await?;
        let addr = server.local_addr()?;
        let admin_addr = server.admin_addr();
        let state = server.state().clone();

        let handle = tokio::spawn(async move {
            server.run().await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            admin_addr,
            client,
            state,
            handle: Some(handle),
        })
    }

    /// Shared server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Open a raw chat connection
    pub async fn connect(&self) -> Result<ChatClient> {
        ChatClient::connect(self.addr).await
    }

    /// Connect and complete naming
    pub async fn join(&self, name: &str) -> Result<ChatClient> {
        let mut client = self.connect().await?;
        client.register(name).await?;
        Ok(client)
    }

    /// Get base URL for the admin server
    pub fn base_url(&self) -> Result<String> {
        let addr = self
            .admin_addr
            .ok_or_else(|| anyhow::anyhow!("admin surface disabled"))?;
        Ok(format!("http://{addr}"))
    }

    /// Make a GET request to the admin server
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url()?, path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make an empty POST request to the admin server
    pub async fn post(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url()?, path);
        Ok(self.client.post(&url).send().await?)
    }

    /// Shut the server down and wait for it to finish
    pub async fn stop(mut self) -> Result<()> {
        self.state.shutdown();
        if let Some(handle) = self.handle.take() {
            tokio::time::timeout(Duration::from_secs(10), handle).await??;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}

/// Create a test configuration: loopback, OS-assigned ports, chat started
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.chat.listen.host = "127.0.0.1".to_string();
    config.chat.listen.port = 0;
    config.chat.auto_start = true;
    config.admin.enabled = true;
    config.admin.listen.host = "127.0.0.1".to_string();
    config.admin.listen.port = 0;
    config
}

/// Test configuration with a short poll lifetime
pub fn test_config_with_poll(duration: Duration) -> AppConfig {
    let mut config = test_config();
    config.poll.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    config
}

/// Poll `check` until it holds or `timeout` passes
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !check() {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
