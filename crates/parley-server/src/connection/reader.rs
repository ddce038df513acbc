//! Bounded line reader

use parley_core::text::truncate;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Reads `\n`-terminated lines, keeping at most `max_len` bytes of each
///
/// The rest of an over-long line is read and discarded. A trailing `\r` is
/// removed, and invalid UTF-8 is replaced rather than rejected.
///
/// `next_line` is not cancel-safe: a partially read line is lost if the
/// future is dropped.
pub struct LineReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }

    /// Read the next line, or `None` once the peer has closed the stream
    ///
    /// Bytes after the last newline are returned as a final line.
    pub async fn next_line(&mut self, max_len: usize) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        let mut seen_any = false;

        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                return Ok(seen_any.then(|| finish(&line, max_len)));
            }
            seen_any = true;

            let newline = available.iter().position(|b| *b == b'\n');
            let content_len = newline.unwrap_or(available.len());
            let room = max_len.saturating_sub(line.len());
            line.extend_from_slice(&available[..content_len.min(room)]);

            let consumed = newline.map_or(available.len(), |i| i + 1);
            self.inner.consume(consumed);

            if newline.is_some() {
                return Ok(Some(finish(&line, max_len)));
            }
        }
    }
}

fn finish(bytes: &[u8], max_len: usize) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    truncate(&text, max_len).to_string()
}

impl<R> std::fmt::Debug for LineReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader").finish_non_exhaustive()
    }
}
