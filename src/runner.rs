//! Command execution boundary
//!
//! Every git or generator invocation goes through [`CommandRunner`], so the
//! backport engine never spawns processes on its own and tests can substitute
//! a scripted fake.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout and stderr
    pub output: String,
}

/// A command that could not be started or exited unsuccessfully
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be spawned
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Spawn error
        source: std::io::Error,
    },

    /// The process ran and exited with a non-zero status
    #[error("`{command}` exited with {}: {}", format_status(*status), output.trim())]
    Failed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` if terminated by a signal
        status: Option<i32>,
        /// Combined stdout and stderr
        output: String,
    },
}

impl CommandError {
    /// Exit code of a failed command, if it exited normally
    pub const fn status(&self) -> Option<i32> {
        match self {
            Self::Failed { status, .. } => *status,
            Self::Spawn { .. } => None,
        }
    }
}

fn format_status(status: Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |code| format!("status {code}"))
}

/// Render a program and its arguments as a single command line
pub fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs external programs against the current working tree
///
/// Implementations must execute one command at a time and report a non-zero
/// exit as [`CommandError::Failed`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and capture its output
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as child processes using tokio
///
/// Children are killed when the returned future is dropped, so cancelling a
/// backport aborts the command that is currently blocking.
#[derive(Debug, Clone, Default)]
pub struct ShellCommandRunner {
    dir: Option<PathBuf>,
}

impl ShellCommandRunner {
    /// Runner that uses the process working directory
    pub const fn new() -> Self {
        Self { dir: None }
    }

    /// Runner that executes every command in `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let command = render_command(program, args);
        debug!(command = %command, "running command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        let out = cmd.output().await.map_err(|source| CommandError::Spawn {
            command: command.clone(),
            source,
        })?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));
        trace!(command = %command, output = %output, "command output");

        if out.status.success() {
            Ok(CommandOutput { output })
        } else {
            debug!(command = %command, status = ?out.status.code(), "command failed");
            Err(CommandError::Failed {
                command,
                status: out.status.code(),
                output,
            })
        }
    }
}
