//! Line-delimited transport
//!
//! One JSON-RPC message per line. Generic over the byte streams so tests can
//! drive it from memory; `stdio()` is what the binary uses.

use super::protocol::JsonRpcResponse;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Async line transport
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next non-blank line; `None` at EOF
    pub async fn read_message(&mut self) -> io::Result<Option<String>> {
        loop {
            let mut line = String::new();
            let bytes_read = self.reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                return Ok(None);
            }

            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    /// Write a JSON-RPC response followed by a newline
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Consume the transport, returning the writer
    pub fn into_writer(self) -> W {
        self.writer
    }
}
