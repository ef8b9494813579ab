//! TCP transport.
//!
//! Owns the socket and the line framer for one physical connection. Reads
//! hand raw chunks to the framer and return whole protocol lines; writes
//! take encoded commands. The transport is dropped and rebuilt on
//! reconnect, so no buffered partial line ever crosses connections.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{trace, warn};

use crate::command::Command;
use crate::error::{ClientError, Result};
use crate::framer::LineFramer;

/// Read buffer size per receive call.
const READ_CHUNK: usize = 4096;

/// One connection's socket plus its framing state.
#[derive(Debug)]
pub struct Transport {
    stream: TcpStream,
    framer: LineFramer,
}

impl Transport {
    /// Connect to `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] on socket-level failure; the
    /// reconnection supervisor treats this as retryable.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(ClientError::Connect)?;

        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        Ok(Self {
            stream,
            framer: LineFramer::new(),
        })
    }

    fn enable_keepalive(stream: &TcpStream) -> anyhow::Result<()> {
        use socket2::{SockRef, TcpKeepalive};
        use std::time::Duration;

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)?;
        Ok(())
    }

    /// Receive once and return the complete lines it produced.
    ///
    /// `Ok(None)` means the peer closed the connection in an orderly
    /// fashion. An `Ok(Some(vec))` may be empty when the chunk ended
    /// mid-line; the partial stays buffered in the framer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on a read error.
    pub async fn read_lines(&mut self) -> Result<Option<Vec<String>>> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        let lines = self.framer.feed(&chunk[..n]);
        for line in &lines {
            trace!(target: "slirc_client::wire", "<- {}", line);
        }
        Ok(Some(lines))
    }

    /// Write one encoded command.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on a write error.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        trace!(target: "slirc_client::wire", "-> {}", command);
        self.stream.write_all(&command.to_bytes()).await?;
        Ok(())
    }
}
