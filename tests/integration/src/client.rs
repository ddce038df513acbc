//! TCP chat client for tests

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use parley_server::session::{COMMAND_PROMPT, NAME_PROMPT};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// How long a read waits before the test fails
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// A line-oriented chat client
pub struct ChatClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl ChatClient {
    /// Connect to a chat server
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(read).lines(),
            writer,
        })
    }

    /// Send one line
    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    /// Read the next line; `None` once the server closed the connection
    pub async fn recv(&mut self) -> Result<Option<String>> {
        let line = tokio::time::timeout(READ_TIMEOUT, self.lines.next_line())
            .await
            .context("timed out waiting for a line")??;
        Ok(line)
    }

    /// Read the next line, failing if the connection closed
    pub async fn line(&mut self) -> Result<String> {
        self.recv().await?.context("connection closed")
    }

    /// Read the next line that is not a command prompt
    pub async fn reply(&mut self) -> Result<String> {
        loop {
            let line = self.line().await?;
            if line != COMMAND_PROMPT {
                return Ok(line);
            }
        }
    }

    /// Read the next `count` non-prompt lines
    pub async fn replies(&mut self, count: usize) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.reply().await?);
        }
        Ok(lines)
    }

    /// Skip lines until one equals `expected`
    pub async fn expect_line(&mut self, expected: &str) -> Result<()> {
        loop {
            if self.line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Answer the name prompt and wait for the welcome line
    pub async fn register(&mut self, name: &str) -> Result<()> {
        let prompt = self.line().await?;
        anyhow::ensure!(prompt == NAME_PROMPT, "expected name prompt, got {prompt:?}");

        self.send(name).await?;
        let welcome = self.line().await?;
        anyhow::ensure!(
            welcome == format!("Welcome to the chat, {name}!"),
            "unexpected welcome {welcome:?}"
        );
        Ok(())
    }

    /// Send a command and return the first reply line
    pub async fn command(&mut self, line: &str) -> Result<String> {
        self.send(line).await?;
        self.reply().await
    }

    /// Wait until the server closes the connection
    pub async fn expect_closed(&mut self) -> Result<()> {
        while self.recv().await?.is_some() {}
        Ok(())
    }
}
