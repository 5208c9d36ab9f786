//! External command execution.
//!
//! Every external process the pipeline touches (git, gox, docker, 7z) runs
//! through [`Exec`], so exit-status handling, output streaming, and
//! timeout/kill behavior stay consistent across call sites.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::{ReleaseError, Result};

/// Builder for a single external command invocation.
///
/// # Examples
///
/// ```no_run
/// use gin_release::exec::Exec;
///
/// # async fn example() -> gin_release::Result<()> {
/// let commit = Exec::new("git")
///     .args(["rev-parse", "HEAD"])
///     .capture()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Exec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Exec {
    /// Creates a new invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
        }
    }

    /// Appends a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the command.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets a hard deadline. On expiry the process is killed and reaped
    /// before an error is returned.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    fn command_error(&self, reason: impl Into<String>) -> ReleaseError {
        ReleaseError::Command {
            command: self.describe(),
            reason: reason.into(),
        }
    }

    /// Runs the command, streaming stdout and stderr line by line through
    /// the logger, and returns whether it exited successfully.
    pub async fn status(self) -> Result<bool> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.command_error(e.to_string()))?;

        // Drain both pipes concurrently so the child never blocks on a full
        // one. Both streams must complete before the exit status is checked.
        tokio::join!(
            async {
                if let Some(stdout) = child.stdout.take() {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log::info!("[{}] {}", self.program, line);
                    }
                }
            },
            async {
                if let Some(stderr) = child.stderr.take() {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log::info!("[{}] {}", self.program, line);
                    }
                }
            }
        );

        let status = if let Some(limit) = self.timeout {
            let waited = tokio::time::timeout(limit, child.wait()).await;
            match waited {
                Ok(result) => result.map_err(|e| self.command_error(e.to_string()))?,
                Err(_elapsed) => {
                    log::warn!("{} timed out, terminating", self.describe());
                    if let Err(e) = child.kill().await {
                        log::warn!("failed to kill {}: {}", self.program, e);
                    }
                    // Reap the killed child so it does not linger as a zombie.
                    let _ = tokio::time::timeout(Duration::from_secs(10), child.wait()).await;
                    return Err(self.command_error(format!(
                        "timed out after {} seconds",
                        limit.as_secs()
                    )));
                }
            }
        } else {
            child
                .wait()
                .await
                .map_err(|e| self.command_error(e.to_string()))?
        };

        Ok(status.success())
    }

    /// Runs the command and fails unless it exits with status zero.
    pub async fn checked(self) -> Result<()> {
        let description = self.describe();
        if self.status().await? {
            Ok(())
        } else {
            Err(ReleaseError::Command {
                command: description,
                reason: "exited with non-zero status".into(),
            })
        }
    }

    /// Runs the command and returns its trimmed stdout.
    ///
    /// Output is captured rather than streamed. A non-zero exit is an error
    /// carrying the command's stderr as the reason.
    pub async fn capture(self) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.command_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(self.command_error(if stderr.is_empty() {
                format!(
                    "exited with status {}",
                    output.status.code().unwrap_or(-1)
                )
            } else {
                stderr
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
