//! Ephemeral sessions backing a group of command scenarios.
//!
//! A [`TestSession`] is provisioned once per group and released exactly once,
//! either through [`TestSession::clean`] or on drop.

use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

use orgql_sdk::auth::{self, OrgCredentials};
use orgql_sdk::Client;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::HarnessError;

/// How the session obtains org credentials for the commands it runs.
#[derive(Debug, Clone, Default)]
pub enum AuthStrategy {
    /// Resolve credentials the way the CLI does (env vars, then `~/.orgql/auth.json`).
    #[default]
    Auto,
    /// Read credentials from a specific auth file.
    File(PathBuf),
    /// Use the given credentials.
    Explicit(OrgCredentials),
    /// Run commands unauthenticated: `ORGQL_*` is scrubbed and `HOME` points
    /// at the project directory.
    None,
}

/// Provisioning options for one session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Fixture project copied into the session.
    pub project_source_dir: PathBuf,
    pub auth_strategy: AuthStrategy,
    /// Auxiliary environment definitions, relative to the fixture project.
    pub env_definitions: Vec<PathBuf>,
}

impl SessionOptions {
    pub fn new(project_source_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_source_dir: project_source_dir.into(),
            auth_strategy: AuthStrategy::Auto,
            env_definitions: Vec::new(),
        }
    }

    pub fn auth(mut self, strategy: AuthStrategy) -> Self {
        self.auth_strategy = strategy;
        self
    }

    pub fn env_definition(mut self, relative_path: impl Into<PathBuf>) -> Self {
        self.env_definitions.push(relative_path.into());
        self
    }
}

/// A loaded auxiliary environment definition.
#[derive(Debug, Clone)]
pub struct EnvDefinition {
    /// Location inside the session's project directory.
    pub path: PathBuf,
    pub contents: serde_json::Value,
}

/// Everything a runner needs to execute commands inside a session.
#[derive(Debug)]
pub struct SessionState {
    project_dir: PathBuf,
    env: Vec<(String, String)>,
    env_remove: Vec<String>,
    env_definitions: Vec<EnvDefinition>,
    scratch: Option<TempDir>,
}

impl SessionState {
    /// State rooted at an existing directory, for custom provisioners.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            env: Vec::new(),
            env_remove: Vec::new(),
            env_definitions: Vec::new(),
            scratch: None,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Absolute path of `relative` inside the project directory.
    pub fn project_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.project_dir.join(relative)
    }

    /// [`Self::project_path`], shell-quoted for use in a command line.
    pub fn quoted_project_path(&self, relative: impl AsRef<Path>) -> String {
        shell_words::quote(&self.project_path(relative).to_string_lossy()).into_owned()
    }

    /// Variables set for every command run in this session.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Variables removed for every command run in this session.
    pub fn env_remove(&self) -> &[String] {
        &self.env_remove
    }

    pub fn env_definitions(&self) -> &[EnvDefinition] {
        &self.env_definitions
    }
}

/// Creates and destroys the environment behind a session.
pub trait EnvironmentProvisioner {
    fn create(&self, options: &SessionOptions) -> Result<SessionState, HarnessError>;
    fn destroy(&self, state: &mut SessionState) -> Result<(), HarnessError>;
}

/// Provisions sessions as scratch copies of a fixture project on local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvisioner;

impl EnvironmentProvisioner for LocalProvisioner {
    fn create(&self, options: &SessionOptions) -> Result<SessionState, HarnessError> {
        let source = &options.project_source_dir;
        if !source.is_dir() {
            return Err(HarnessError::Provisioning(format!(
                "Fixture project {} is not a directory",
                source.display()
            )));
        }

        let scratch = tempfile::Builder::new()
            .prefix("orgql-session-")
            .tempdir()
            .map_err(|e| {
                HarnessError::Provisioning(format!("Could not create scratch directory: {}", e))
            })?;
        let project_dir = scratch.path().join("project");
        copy_tree(source, &project_dir)?;

        let env_definitions = options
            .env_definitions
            .iter()
            .map(|rel| load_env_definition(&project_dir, rel))
            .collect::<Result<Vec<_>, _>>()?;

        let (env, env_remove) = auth_env(&options.auth_strategy, &project_dir)?;

        Ok(SessionState {
            project_dir,
            env,
            env_remove,
            env_definitions,
            scratch: Some(scratch),
        })
    }

    fn destroy(&self, state: &mut SessionState) -> Result<(), HarnessError> {
        match state.scratch.take() {
            Some(dir) => dir.close().map_err(|e| {
                HarnessError::Teardown(format!(
                    "Could not remove {}: {}",
                    state.project_dir.display(),
                    e
                ))
            }),
            None => Ok(()),
        }
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), HarnessError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            HarnessError::Provisioning(format!("Could not walk {}: {}", src.display(), e))
        })?;
        let relative = entry.path().strip_prefix(src).map_err(|e| {
            HarnessError::Provisioning(format!("{}: {}", entry.path().display(), e))
        })?;
        let target = dst.join(relative);
        let result = if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
        } else {
            std::fs::copy(entry.path(), &target).map(|_| ())
        };
        result.map_err(|e| {
            HarnessError::Provisioning(format!(
                "Could not copy {} to {}: {}",
                entry.path().display(),
                target.display(),
                e
            ))
        })?;
    }
    Ok(())
}

fn load_env_definition(project_dir: &Path, relative: &Path) -> Result<EnvDefinition, HarnessError> {
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(HarnessError::Provisioning(format!(
            "Environment definition {} must be a path inside the fixture project",
            relative.display()
        )));
    }

    let path = project_dir.join(relative);
    let text = std::fs::read_to_string(&path).map_err(|e| {
        HarnessError::Provisioning(format!(
            "Could not read environment definition {}: {}",
            relative.display(),
            e
        ))
    })?;
    let contents: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        HarnessError::Provisioning(format!(
            "Environment definition {} is not valid JSON: {}",
            relative.display(),
            e
        ))
    })?;
    if !contents.is_object() {
        return Err(HarnessError::Provisioning(format!(
            "Environment definition {} must be a JSON object",
            relative.display()
        )));
    }
    Ok(EnvDefinition { path, contents })
}

type EnvSets = (Vec<(String, String)>, Vec<String>);

fn auth_env(strategy: &AuthStrategy, project_dir: &Path) -> Result<EnvSets, HarnessError> {
    let creds = match strategy {
        AuthStrategy::Auto => auth::auto_credentials().map_err(|e| {
            HarnessError::Provisioning(format!("Automatic authentication failed: {}", e))
        })?,
        AuthStrategy::File(path) => auth::credentials_from_path(path)
            .map_err(|e| HarnessError::Provisioning(e.to_string()))?,
        AuthStrategy::Explicit(creds) => creds.clone(),
        AuthStrategy::None => {
            let env = vec![(
                "HOME".to_string(),
                project_dir.to_string_lossy().into_owned(),
            )];
            let remove = [
                auth::ACCESS_TOKEN_ENV,
                auth::INSTANCE_URL_ENV,
                auth::API_VERSION_ENV,
            ]
            .iter()
            .map(|k| k.to_string())
            .collect();
            return Ok((env, remove));
        }
    };

    // Reject unusable credentials now rather than in every scenario.
    Client::from_credentials(creds.clone())
        .map_err(|e| HarnessError::Provisioning(e.to_string()))?;

    let mut env = vec![
        (auth::ACCESS_TOKEN_ENV.to_string(), creds.access_token),
        (auth::INSTANCE_URL_ENV.to_string(), creds.instance_url),
    ];
    let mut remove = Vec::new();
    match creds.api_version {
        Some(version) => env.push((auth::API_VERSION_ENV.to_string(), version)),
        None => remove.push(auth::API_VERSION_ENV.to_string()),
    }
    Ok((env, remove))
}

/// A provisioned session, released exactly once.
#[derive(Debug)]
pub struct TestSession<P: EnvironmentProvisioner> {
    provisioner: P,
    state: SessionState,
    released: bool,
}

impl<P: EnvironmentProvisioner> TestSession<P> {
    /// Provision a session. Failure here is fatal for the whole group.
    pub fn create(provisioner: P, options: &SessionOptions) -> Result<Self, HarnessError> {
        let state = provisioner.create(options)?;
        tracing::info!(project_dir = %state.project_dir.display(), "session provisioned");
        Ok(Self {
            provisioner,
            state,
            released: false,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Release the session now and report teardown errors.
    pub fn clean(mut self) -> Result<(), HarnessError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), HarnessError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        tracing::info!(project_dir = %self.state.project_dir.display(), "releasing session");
        self.provisioner.destroy(&mut self.state)
    }
}

impl<P: EnvironmentProvisioner> Deref for TestSession<P> {
    type Target = SessionState;

    fn deref(&self) -> &SessionState {
        &self.state
    }
}

impl<P: EnvironmentProvisioner> Drop for TestSession<P> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "session teardown failed");
        }
    }
}
