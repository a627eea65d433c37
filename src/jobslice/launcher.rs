//! # Launchers
//!
//! Submission hands each chunk to a [`Launcher`]. Commands are built as an
//! argument vector ([`Invocation`]) and never pass through a shell, so option
//! values and paths need no quoting.
//!
//! - [`ProcessLauncher`]: runs the program and waits for it
//! - [`DryRunLauncher`]: runs nothing, used by `submit --dry-run`
//!
//! A launcher reports how the call went instead of failing: one rejected
//! chunk must not keep the remaining chunks from being submitted.

use crate::script::shell_quote;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
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

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Success,
    /// Non-zero exit; `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
    SpawnFailed(String),
    /// Nothing was run.
    Skipped,
}

impl LaunchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LaunchOutcome::Failed { .. } | LaunchOutcome::SpawnFailed(_)
        )
    }
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchOutcome::Success => write!(f, "submitted"),
            LaunchOutcome::Failed { code: Some(code) } => write!(f, "exit code {}", code),
            LaunchOutcome::Failed { code: None } => write!(f, "terminated by signal"),
            LaunchOutcome::SpawnFailed(reason) => write!(f, "could not run: {}", reason),
            LaunchOutcome::Skipped => write!(f, "dry run"),
        }
    }
}

pub trait Launcher {
    fn launch(&self, invocation: &Invocation) -> LaunchOutcome;

    /// True when nothing is executed, so callers leave the filesystem alone.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs the invocation as a child process, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, invocation: &Invocation) -> LaunchOutcome {
        debug!(program = %invocation.program, args = ?invocation.args, "spawn");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        match cmd.status() {
            Ok(status) if status.success() => LaunchOutcome::Success,
            Ok(status) => LaunchOutcome::Failed {
                code: status.code(),
            },
            Err(e) => LaunchOutcome::SpawnFailed(format!("{}: {}", invocation.program, e)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunLauncher;

impl Launcher for DryRunLauncher {
    fn launch(&self, invocation: &Invocation) -> LaunchOutcome {
        debug!(command = %invocation, "dry run");
        LaunchOutcome::Skipped
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
