//! OS print spooler access for `/printers` and `/print-local`.
//!
//! On hosts with CUPS the command-line tools are used: `lpstat -e` lists
//! destinations and `lp -d <printer> -o raw` takes the job on stdin. Where
//! they are missing the agent still runs, with [`UnavailableSpooler`]
//! answering every call with [`EtiketError::CapabilityUnavailable`].

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{EtiketError, Result};

#[async_trait]
pub trait Spooler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Installed printer names.
    async fn printers(&self) -> Result<Vec<String>>;

    /// Submit bytes as a raw job, bypassing any driver filter.
    async fn submit_raw(&self, printer: &str, data: &[u8]) -> Result<()>;
}

/// Pick the spooler for this host.
pub async fn detect() -> Box<dyn Spooler> {
    let cups = CupsSpooler::default();
    match cups.printers().await {
        Err(EtiketError::CapabilityUnavailable(reason)) => {
            warn!(reason = %reason, "print spooler not available");
            Box::new(UnavailableSpooler::new(reason))
        }
        _ => {
            info!(spooler = cups.name(), "print spooler detected");
            Box::new(cups)
        }
    }
}

// ============================================================================
// CUPS
// ============================================================================

#[derive(Debug, Clone)]
pub struct CupsSpooler {
    lpstat: String,
    lp: String,
}

impl Default for CupsSpooler {
    fn default() -> Self {
        Self {
            lpstat: "lpstat".into(),
            lp: "lp".into(),
        }
    }
}

impl CupsSpooler {
    /// Use other binaries, e.g. absolute paths.
    pub fn with_commands(lpstat: impl Into<String>, lp: impl Into<String>) -> Self {
        Self {
            lpstat: lpstat.into(),
            lp: lp.into(),
        }
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> EtiketError {
    if e.kind() == std::io::ErrorKind::NotFound {
        EtiketError::CapabilityUnavailable(format!("{} not found", program))
    } else {
        EtiketError::TransportConnection(format!("Failed to run {}: {}", program, e))
    }
}

fn failure_detail(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    format!("exited with {}", output.status)
}

#[async_trait]
impl Spooler for CupsSpooler {
    fn name(&self) -> &'static str {
        "cups"
    }

    async fn printers(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.lpstat)
            .arg("-e")
            .output()
            .await
            .map_err(|e| spawn_error(&self.lpstat, e))?;
        if !output.status.success() {
            return Err(EtiketError::TransportConnection(failure_detail(&output)));
        }
        let printers: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        debug!(count = printers.len(), "listed printers");
        Ok(printers)
    }

    async fn submit_raw(&self, printer: &str, data: &[u8]) -> Result<()> {
        let mut child = Command::new(&self.lp)
            .args(["-d", printer, "-o", "raw"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.lp, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(data).await?;
            stdin.shutdown().await?;
        }
        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(EtiketError::TransportConnection(failure_detail(&output)));
        }
        info!(printer, bytes = data.len(), "submitted raw job to spooler");
        Ok(())
    }
}

// ============================================================================
// UNAVAILABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct UnavailableSpooler {
    reason: String,
}

impl UnavailableSpooler {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Spooler for UnavailableSpooler {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn printers(&self) -> Result<Vec<String>> {
        Err(EtiketError::CapabilityUnavailable(self.reason.clone()))
    }

    async fn submit_raw(&self, _printer: &str, _data: &[u8]) -> Result<()> {
        Err(EtiketError::CapabilityUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binaries_are_capability_errors() {
        let cups = CupsSpooler::with_commands(
            "/nonexistent/etiket-lpstat",
            "/nonexistent/etiket-lp",
        );
        assert!(matches!(
            cups.printers().await,
            Err(EtiketError::CapabilityUnavailable(_))
        ));
        assert!(matches!(
            cups.submit_raw("zebra", b"^XA^XZ").await,
            Err(EtiketError::CapabilityUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lp_exiting_before_reading_job_is_error() {
        // `false` exits without reading stdin, so the job write hits a closed pipe
        let cups = CupsSpooler::with_commands("lpstat", "false");
        let job = vec![b'A'; 8 * 1024 * 1024];
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            cups.submit_raw("zebra", &job),
        )
        .await
        .unwrap();
        assert!(matches!(
            result,
            Err(EtiketError::Io(_)) | Err(EtiketError::TransportConnection(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_spooler() {
        let spooler = UnavailableSpooler::new("no CUPS");
        let err = spooler.printers().await.unwrap_err();
        assert_eq!(err.to_string(), "Print spooler unavailable: no CUPS");
    }
}
