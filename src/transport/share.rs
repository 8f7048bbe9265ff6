//! Server-side print proxy: ZPL goes to a temp file, an OS command copies the
//! file to the printer, and the temp file is removed whatever the outcome.

use std::io::Write;
use std::path::Path;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{EtiketError, Result, ValidationIssue};

/// Printer names accepted by the proxy: ASCII letters, digits, space, `_`,
/// `.` and `-`, not starting with `-`. The name ends up on a `cmd /C` command
/// line on Windows, where `& | < > ^ %` and quotes would be interpreted.
pub fn check_printer_name(name: &str) -> std::result::Result<(), ValidationIssue> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-');
    if name.trim().is_empty() || name.starts_with('-') || !name.chars().all(allowed) {
        return Err(ValidationIssue::InvalidPrinterName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// How the temp file reaches the printer.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyCommand {
    /// `cmd /C copy /B <file> \\<host>\<printer>`
    WindowsShare { host: String },
    /// `lp -d <printer> -o raw <file>`
    Lp,
    /// Any program; `{file}` and `{printer}` in `args` are substituted.
    Custom { program: String, args: Vec<String> },
}

impl CopyCommand {
    /// The platform default for a share host.
    pub fn for_host(share_host: &str) -> Self {
        if cfg!(windows) {
            Self::WindowsShare {
                host: share_host.to_string(),
            }
        } else {
            Self::Lp
        }
    }

    /// Program and arguments for one job.
    pub fn argv(&self, file: &Path, printer: &str) -> (String, Vec<String>) {
        let file = file.display().to_string();
        match self {
            Self::WindowsShare { host } => (
                "cmd".into(),
                vec![
                    "/C".into(),
                    "copy".into(),
                    "/B".into(),
                    file,
                    format!("\\\\{}\\{}", host, printer),
                ],
            ),
            Self::Lp => (
                "lp".into(),
                vec![
                    "-d".into(),
                    printer.into(),
                    "-o".into(),
                    "raw".into(),
                    file,
                ],
            ),
            Self::Custom { program, args } => (
                program.clone(),
                args.iter()
                    .map(|a| a.replace("{file}", &file).replace("{printer}", printer))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShareProxy {
    command: CopyCommand,
}

impl ShareProxy {
    pub fn new(command: CopyCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &CopyCommand {
        &self.command
    }

    /// Print `zpl` on `printer`. The error carries the command's own
    /// failure text; a printer name outside [`check_printer_name`] is
    /// rejected with [`EtiketError::Validation`] before anything runs.
    pub async fn print(&self, zpl: &str, printer: &str) -> Result<()> {
        check_printer_name(printer).map_err(EtiketError::Validation)?;

        let mut file = tempfile::Builder::new()
            .prefix("etiket-")
            .suffix(".zpl")
            .tempfile()?;
        file.write_all(zpl.as_bytes())?;
        file.flush()?;

        let result = self.run(file.path(), printer).await;

        if let Err(e) = file.close() {
            warn!(error = %e, "failed to remove print temp file");
        }
        result
    }

    async fn run(&self, path: &Path, printer: &str) -> Result<()> {
        let (program, args) = self.command.argv(path, printer);
        info!(program = %program, printer, "running print copy command");

        let output = Command::new(&program).args(&args).output().await.map_err(|e| {
            EtiketError::TransportConnection(format!("Failed to run {}: {}", program, e))
        })?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let detail = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            format!("{} exited with {}", program, output.status)
        };
        warn!(program = %program, detail = %detail, "print copy command failed");
        Err(EtiketError::TransportConnection(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_windows_argv() {
        let cmd = CopyCommand::WindowsShare {
            host: "localhost".into(),
        };
        let (program, args) = cmd.argv(Path::new("C:\\t\\a.zpl"), "ZDesigner");
        assert_eq!(program, "cmd");
        assert_eq!(
            args,
            vec!["/C", "copy", "/B", "C:\\t\\a.zpl", "\\\\localhost\\ZDesigner"]
        );
    }

    #[test]
    fn test_printer_names() {
        for ok in ["ZDesigner", "ZDesigner GK420t", "zebra_2.lab-1"] {
            assert_eq!(check_printer_name(ok), Ok(()), "{}", ok);
        }
        for bad in ["Z&calc", "a|b", "x>y", "p^q", "%PATH%", "\"q\"", "-h", "", "  ", "a\\b"] {
            assert!(check_printer_name(bad).is_err(), "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_rejected_name_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let proxy = ShareProxy::new(CopyCommand::Custom {
            program: "touch".into(),
            args: vec![marker.display().to_string()],
        });
        let err = proxy.print("^XA^XZ", "Z&calc").await.unwrap_err();
        assert!(matches!(
            err,
            EtiketError::Validation(ValidationIssue::InvalidPrinterName { .. })
        ));
        assert!(!marker.exists());
    }

    #[test]
    fn test_lp_argv() {
        let (program, args) = CopyCommand::Lp.argv(Path::new("/tmp/a.zpl"), "zebra");
        assert_eq!(program, "lp");
        assert_eq!(args, vec!["-d", "zebra", "-o", "raw", "/tmp/a.zpl"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_succeeds_and_temp_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("{printer}.out");
        let proxy = ShareProxy::new(CopyCommand::Custom {
            program: "cp".into(),
            args: vec!["{file}".into(), dest.display().to_string()],
        });
        proxy.print("^XA^XZ", "zebra").await.unwrap();
        let written = std::fs::read_to_string(dir.path().join("zebra.out")).unwrap();
        assert_eq!(written, "^XA^XZ");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_carries_detail_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        // Record the temp path, then fail
        let proxy = ShareProxy::new(CopyCommand::Custom {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                format!("echo {{file}} > {}; echo offline >&2; exit 1", seen.display()),
            ],
        });
        let err = proxy.print("^XA^XZ", "zebra").await.unwrap_err();
        assert_eq!(err.to_string(), "offline");

        let temp_path = std::fs::read_to_string(&seen).unwrap();
        assert!(!Path::new(temp_path.trim()).exists());
    }
}
