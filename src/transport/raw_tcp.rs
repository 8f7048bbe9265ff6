//! # Raw TCP Transport (port 9100)
//!
//! Opens a socket to the printer, writes the ZPL bytes, and closes it. A
//! clean shutdown with no socket error is success; the printer sends nothing
//! back.
//!
//! Connect and write each get the full timeout. A timeout is final: the
//! socket is dropped and nothing is retried.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::{EtiketError, Result};

/// Conventional raw print port.
pub const RAW_PORT: u16 = 9100;

/// Connect and write timeout.
pub const RAW_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct RawTcpClient {
    timeout: Duration,
}

impl Default for RawTcpClient {
    fn default() -> Self {
        Self {
            timeout: RAW_TIMEOUT,
        }
    }
}

impl RawTcpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `data` to `host:port` and close the connection.
    pub async fn send(&self, host: &str, port: u16, data: &[u8]) -> Result<()> {
        let addr = format!("{}:{}", host, port);
        info!(addr = %addr, bytes = data.len(), "connecting via raw TCP");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| self.timed_out(&addr))?
            .map_err(|e| {
                EtiketError::TransportConnection(format!("Failed to connect to {}: {}", addr, e))
            })?;

        let write = async {
            stream.write_all(data).await?;
            stream.flush().await?;
            stream.shutdown().await
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| self.timed_out(&addr))?
            .map_err(|e| {
                EtiketError::TransportConnection(format!("Failed to send to {}: {}", addr, e))
            })?;

        debug!(addr = %addr, "raw TCP connection closed");
        info!(addr = %addr, bytes = data.len(), "raw TCP print job sent");
        Ok(())
    }

    fn timed_out(&self, addr: &str) -> EtiketError {
        warn!(addr, secs = self.timeout.as_secs(), "raw TCP timed out");
        EtiketError::TransportTimeout {
            addr: addr.to_string(),
            secs: self.timeout.as_secs(),
        }
    }
}
