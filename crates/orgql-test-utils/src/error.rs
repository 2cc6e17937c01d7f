//! Harness errors.
//!
//! Provisioning errors abort a whole scenario group; everything else is
//! local to the scenario that hit it.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum HarnessError {
    /// The session could not be created.
    Provisioning(String),
    /// The session could not be released cleanly.
    Teardown(String),
    /// A command line could not be split into arguments.
    InvalidCommandLine { command: String, reason: String },
    /// The command could not be started.
    Spawn {
        command: String,
        source: std::io::Error,
    },
    /// The command exited unsuccessfully. `status` is `None` when it was
    /// killed, including by the runner's timeout.
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    /// A file the scenario expected could not be read.
    ReadOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Captured output is not valid JSON.
    Parse {
        excerpt: String,
        source: serde_json::Error,
    },
    /// Output parsed, but is not an object with at least one key.
    EmptyDocument(String),
    /// An expected key or index is absent from the document.
    ShapeMismatch { path: String },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisioning(msg) => write!(f, "Session provisioning failed: {}", msg),
            Self::Teardown(msg) => write!(f, "Session teardown failed: {}", msg),
            Self::InvalidCommandLine { command, reason } => {
                write!(f, "Invalid command line `{}`: {}", command, reason)
            }
            Self::Spawn { command, source } => {
                write!(f, "Could not run `{}`: {}", command, source)
            }
            Self::CommandFailed {
                command,
                status,
                stderr,
            } => {
                let status = status.map_or_else(|| "signal".to_string(), |c| c.to_string());
                write!(
                    f,
                    "`{}` exited with status {}: {}",
                    command,
                    status,
                    stderr.trim()
                )
            }
            Self::ReadOutput { path, source } => {
                write!(f, "Could not read output file {}: {}", path.display(), source)
            }
            Self::Parse { excerpt, source } => {
                write!(f, "Output is not valid JSON ({}): {}", source, excerpt)
            }
            Self::EmptyDocument(found) => {
                write!(f, "Expected a non-empty JSON object, got {}", found)
            }
            Self::ShapeMismatch { path } => write!(f, "Missing path in response: {}", path),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } | Self::ReadOutput { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
