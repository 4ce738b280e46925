use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::CollectError;

/// Default bound for any external tool we shell out to
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured result of a finished external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout of a successful run, or `Failed` carrying the exit status
    pub fn into_success(self, program: &str) -> Result<String, CollectError> {
        if self.status.success() {
            Ok(self.stdout)
        } else {
            Err(CollectError::Failed {
                program: program.to_string(),
                status: self.status.to_string(),
            })
        }
    }
}

/// An external program invocation with a mandatory timeout.
///
/// The child is killed when the timeout elapses, so a hung tool never
/// outlives the refresh cycle that started it.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    timeout: Duration,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    #[cfg(test)]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Run to completion. A non-zero exit is not an error here; some tools
    /// (`npm outdated`) report their data with exit status 1.
    pub async fn output(&self) -> Result<CommandOutput, CollectError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        let child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => CollectError::NotFound {
                program: self.program.clone(),
            },
            ErrorKind::PermissionDenied => CollectError::PermissionDenied {
                what: self.program.clone(),
            },
            _ => CollectError::Io(e),
        })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                debug!(program = %self.program, timeout_ms = self.timeout.as_millis() as u64, "command timed out");
                return Err(CollectError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
        };

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    /// Run and require a zero exit status
    pub async fn stdout(&self) -> Result<String, CollectError> {
        self.output().await?.into_success(&self.program)
    }
}
