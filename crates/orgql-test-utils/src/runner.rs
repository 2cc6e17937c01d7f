//! Command execution against a session.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::HarnessError;
use crate::session::SessionState;

/// Captured result of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal or timed out.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful invocation that printed `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Executes a command line against a session and captures its output.
pub trait CommandRunner {
    fn run(
        &self,
        session: &SessionState,
        command_line: &str,
    ) -> Result<CommandOutput, HarnessError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        session: &SessionState,
        command_line: &str,
    ) -> Result<CommandOutput, HarnessError> {
        (**self).run(session, command_line)
    }
}

fn split_command_line(command_line: &str) -> Result<Vec<String>, HarnessError> {
    shell_words::split(command_line).map_err(|e| HarnessError::InvalidCommandLine {
        command: command_line.to_string(),
        reason: e.to_string(),
    })
}

/// Runs a binary as a child process in the session's project directory.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// The command line passed to [`CommandRunner::run`] becomes the
    /// arguments of `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }

    /// Kill the child after `timeout`; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        session: &SessionState,
        command_line: &str,
    ) -> Result<CommandOutput, HarnessError> {
        let args = split_command_line(command_line)?;
        tracing::debug!(
            program = %self.program.display(),
            command = command_line,
            cwd = %session.project_dir().display(),
            "running command"
        );

        let mut cmd = assert_cmd::Command::new(&self.program);
        cmd.args(&args).current_dir(session.project_dir());
        for key in session.env_remove() {
            cmd.env_remove(key);
        }
        for (key, value) in session.env() {
            cmd.env(key, value);
        }
        if let Some(timeout) = self.timeout {
            cmd.timeout(timeout);
        }

        let output = cmd.output().map_err(|e| HarnessError::Spawn {
            command: command_line.to_string(),
            source: e,
        })?;
        let output = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            status = ?output.status,
            stdout_bytes = output.stdout.len(),
            "command finished"
        );
        Ok(output)
    }
}

/// Runs command lines through a closure, without spawning anything.
pub struct InProcessRunner<F> {
    handler: F,
}

impl<F> InProcessRunner<F>
where
    F: Fn(&SessionState, &[String]) -> CommandOutput,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> CommandRunner for InProcessRunner<F>
where
    F: Fn(&SessionState, &[String]) -> CommandOutput,
{
    fn run(
        &self,
        session: &SessionState,
        command_line: &str,
    ) -> Result<CommandOutput, HarnessError> {
        let args = split_command_line(command_line)?;
        Ok((self.handler)(session, &args))
    }
}
