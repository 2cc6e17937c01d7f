//! Running commands and asserting on the JSON they produce.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::HarnessError;
use crate::runner::{CommandOutput, CommandRunner};
use crate::session::SessionState;

const EXCERPT_LEN: usize = 200;

/// Runs commands against one session and parses their output.
pub struct Verifier<'a, R> {
    runner: &'a R,
    session: &'a SessionState,
}

impl<'a, R: CommandRunner> Verifier<'a, R> {
    pub fn new(runner: &'a R, session: &'a SessionState) -> Self {
        Self { runner, session }
    }

    pub fn session(&self) -> &SessionState {
        self.session
    }

    /// Run a command and return its captured output, whatever the exit status.
    pub fn run(&self, command_line: &str) -> Result<CommandOutput, HarnessError> {
        self.runner.run(self.session, command_line)
    }

    /// Run a command, require success, and parse stdout as a non-empty JSON object.
    pub fn run_and_parse(&self, command_line: &str) -> Result<Value, HarnessError> {
        let output = self.run_successfully(command_line)?;
        parse_document(&output.stdout)
    }

    /// Run a command that writes its result to `output_path` (relative to the
    /// project directory), then parse that file instead of stdout.
    pub fn run_to_file_and_parse(
        &self,
        command_line: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<Value, HarnessError> {
        self.run_successfully(command_line)?;
        let path = self.session.project_path(output_path);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| HarnessError::ReadOutput { path, source: e })?;
        parse_document(&text)
    }

    /// A relative output file name no other scenario will use.
    pub fn unique_output_path(&self, stem: &str, extension: &str) -> PathBuf {
        PathBuf::from(format!("{}-{}.{}", stem, uuid::Uuid::new_v4().simple(), extension))
    }

    fn run_successfully(&self, command_line: &str) -> Result<CommandOutput, HarnessError> {
        let output = self.run(command_line)?;
        if !output.success() {
            return Err(HarnessError::CommandFailed {
                command: command_line.to_string(),
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

/// Parse `text` as JSON and require a non-empty object.
pub fn parse_document(text: &str) -> Result<Value, HarnessError> {
    let doc: Value = serde_json::from_str(text).map_err(|e| HarnessError::Parse {
        excerpt: excerpt(text),
        source: e,
    })?;
    check_non_empty_object(&doc)?;
    Ok(doc)
}

fn check_non_empty_object(doc: &Value) -> Result<(), HarnessError> {
    match doc.as_object() {
        Some(map) if !map.is_empty() => Ok(()),
        _ => Err(HarnessError::EmptyDocument(excerpt(&doc.to_string()))),
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// `data.uiapi.query.<entity>.edges`
pub fn edge_path(entity: &str) -> [&str; 5] {
    ["data", "uiapi", "query", entity, "edges"]
}

/// Follow `path` through objects (by key) and arrays (by index).
/// A missing step is a shape mismatch naming the path up to and including it.
pub fn lookup<'v, S: AsRef<str>>(doc: &'v Value, path: &[S]) -> Result<&'v Value, HarnessError> {
    let mut current = doc;
    for (depth, segment) in path.iter().enumerate() {
        let segment = segment.as_ref();
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| HarnessError::ShapeMismatch {
            path: join_path(&path[..=depth]),
        })?;
    }
    Ok(current)
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(".")
}

/// Length of the array at `path`.
pub fn edge_count<S: AsRef<str>>(doc: &Value, path: &[S]) -> Result<usize, HarnessError> {
    match lookup(doc, path)? {
        Value::Array(items) => Ok(items.len()),
        _ => Err(HarnessError::ShapeMismatch {
            path: format!("{} (not an array)", join_path(path)),
        }),
    }
}

/// Assert the array at `path` has exactly `expected` entries.
#[track_caller]
pub fn assert_edge_count<S: AsRef<str>>(doc: &Value, path: &[S], expected: usize) {
    match edge_count(doc, path) {
        Ok(count) => assert_eq!(
            count,
            expected,
            "edge count at {} should be {}",
            join_path(path),
            expected
        ),
        Err(e) => panic!("shape mismatch: {}", e),
    }
}

/// Assert `doc.errors`, if present, is an empty array.
#[track_caller]
pub fn assert_no_errors(doc: &Value) {
    if let Some(errors) = doc.get("errors") {
        assert_eq!(
            errors,
            &Value::Array(Vec::new()),
            "response-level failure: the endpoint reported errors"
        );
    }
}

/// Assert `doc` is a JSON object with at least one key.
#[track_caller]
pub fn assert_non_empty_object(doc: &Value) {
    if let Err(e) = check_non_empty_object(doc) {
        panic!("{}", e);
    }
}
