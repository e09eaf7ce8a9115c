//! External process invocation
//!
//! Every build tool call (`make`, `cargo metadata`) goes through the
//! [`CommandRunner`] trait so extractors can be exercised against canned
//! output in tests. [`SystemRunner`] is the real implementation: it blocks
//! until the child exits and returns its stdout and stderr as one stream, in
//! the order the child wrote them, trimmed of surrounding whitespace.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to capture output of `{command}`: {source}")]
    Capture {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with code {code}. Output was:\n{output}")]
    Failed {
        command: String,
        code: i32,
        output: String,
    },
}

/// A single external command, run from `cwd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Return captured output even when the command exits non-zero
    pub allow_failure: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            allow_failure: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Runs external commands and captures their combined output
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, RunError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<String, RunError> {
        (**self).run(invocation)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, RunError> {
        let command = invocation.command_line();
        info!(cwd = %invocation.cwd.display(), "Running: {}", command);

        let capture_err = |source| RunError::Capture {
            command: command.clone(),
            source,
        };
        let (mut reader, writer) = io::pipe().map_err(capture_err)?;

        // One pipe for both streams keeps the child's write order
        let mut child_cmd = Command::new(&invocation.program);
        child_cmd
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(writer.try_clone().map_err(capture_err)?)
            .stderr(writer);
        let mut child = child_cmd.spawn().map_err(|source| RunError::Spawn {
            command: command.clone(),
            source,
        })?;
        // The command still holds write ends; the read below only sees EOF once they close
        drop(child_cmd);

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw).map_err(capture_err)?;
        let status = child.wait().map_err(capture_err)?;
        let combined = String::from_utf8_lossy(&raw).into_owned();

        if !status.success() && !invocation.allow_failure {
            let code = status.code().unwrap_or(-1);
            error!(code, "Error raised while running cmd: {}", command);
            error!("Output was:\n{}", combined);
            return Err(RunError::Failed {
                command,
                code,
                output: combined,
            });
        }

        debug!(command = %command, "Output:\n{}", combined);
        Ok(combined.trim().to_string())
    }
}
