//! External command invocation wrapper

use crate::host::HostError;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, warn};

/// Specification of one external command invocation
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program to execute
    pub program: String,

    /// Arguments, in order
    pub args: Vec<String>,

    /// Working directory, if different from the caller's
    pub cwd: Option<PathBuf>,

    /// Whether the command needs elevated privilege
    pub elevate: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            elevate: false,
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn elevated(mut self) -> Self {
        self.elevate = true;
        self
    }

    /// Effective program and argument list with privilege escalation applied
    pub fn resolved(&self) -> (String, Vec<String>) {
        if self.elevate {
            let mut args = Vec::with_capacity(self.args.len() + 1);
            args.push(self.program.clone());
            args.extend(self.args.iter().cloned());
            ("sudo".to_string(), args)
        } else {
            (self.program.clone(), self.args.clone())
        }
    }

    /// One-line rendering for logs and diagnostics
    pub fn display(&self) -> String {
        let (program, args) = self.resolved();
        if args.is_empty() {
            program
        } else {
            format!("{} {}", program, args.join(" "))
        }
    }
}

/// Spawns external commands and maps their exit status.
///
/// Each invocation blocks the calling step until the process
/// terminates; later steps assume the side effects are in place before
/// they run, so there is no background execution.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run one command to completion and return its captured stdout.
    ///
    /// # Errors
    /// - `CommandNotFound` if the program cannot be located
    /// - `PermissionDenied` if the OS refuses to spawn it
    /// - `NonZeroExit` with the captured stderr for any other failure
    pub async fn run(&self, spec: &CommandSpec) -> Result<String, HostError> {
        let (program, args) = spec.resolved();
        debug!("Running: {}", spec.display());

        let mut command = Command::new(&program);
        command.args(&args).kill_on_drop(true);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => HostError::CommandNotFound(program.clone()),
            std::io::ErrorKind::PermissionDenied => HostError::PermissionDenied(program.clone()),
            _ => HostError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", spec.display(), code, stderr);
            return Err(HostError::NonZeroExit {
                program: spec.program.clone(),
                code,
                stderr,
            });
        }

        debug!(
            "{} finished with {} bytes of output",
            spec.program,
            output.stdout.len()
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
