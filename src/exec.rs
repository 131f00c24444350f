//! External process execution
//!
//! Every git and gh invocation goes through [`Executor`]. Children are spawned
//! with `kill_on_drop`, so dropping an in-flight future (for example when the
//! run is cancelled) terminates the subprocess.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Raw stdout
    pub stdout: Vec<u8>,
    /// Raw stderr
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Stdout as trimmed UTF-8 (lossy)
    pub fn stdout_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

/// Runs external programs and maps their exit status to [`Error`]
///
/// Failure modes:
/// - program not found → [`Error::ToolMissing`]
/// - non-zero exit → [`Error::Execution`] carrying exit code and stderr
#[derive(Debug, Clone, Default)]
pub struct Executor {
    cwd: Option<PathBuf>,
    programs: HashMap<String, PathBuf>,
}

impl Executor {
    /// Executor running in the current directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command inside `dir`
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Use `path` whenever `program` is requested
    #[must_use]
    pub fn with_program(mut self, program: &str, path: impl Into<PathBuf>) -> Self {
        self.programs.insert(program.to_string(), path.into());
        self
    }

    /// Working directory, if one was set
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn resolve(&self, program: &str) -> PathBuf {
        self.programs
            .get(program)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(program))
    }

    /// Run `program args...` and capture its output
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.run_with_stdin(program, args, None).await
    }

    /// Run `program args...`, feeding `stdin` to the child
    pub async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&[u8]>,
    ) -> Result<CommandOutput> {
        let exe = self.resolve(program);
        let command_line = render_command(program, args);
        debug!(command = %command_line, exe = %exe.display(), "running command");

        let mut cmd = Command::new(&exe);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ToolMissing {
                    program: program.to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let pipe = child.stdin.take();
        let write_stdin = async move {
            if let (Some(mut pipe), Some(data)) = (pipe, stdin) {
                match pipe.write_all(data).await {
                    // The child may exit before reading everything; its exit
                    // status tells the real story.
                    Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
                drop(pipe);
            }
            Ok(())
        };

        let (written, output) = tokio::join!(write_stdin, child.wait_with_output());
        written?;
        let output = output?;

        if output.status.success() {
            debug!(command = %command_line, "command succeeded");
            Ok(CommandOutput {
                stdout: output.stdout,
                stderr: output.stderr,
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!(
                command = %command_line,
                code = ?output.status.code(),
                stderr = %stderr.trim(),
                "command failed"
            );
            Err(Error::Execution {
                command: command_line,
                code: output.status.code(),
                stderr,
            })
        }
    }
}

fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
