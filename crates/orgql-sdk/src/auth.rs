//! Credential resolution for org GraphQL requests.
//!
//! Precedence, highest first: explicit values (CLI flags), the `ORGQL_*`
//! environment variables, then `~/.orgql/auth.json`. Each field is resolved
//! on its own, so a token flag can pair with an instance URL from the env.

use crate::error::OrgApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const ACCESS_TOKEN_ENV: &str = "ORGQL_ACCESS_TOKEN";
pub const INSTANCE_URL_ENV: &str = "ORGQL_INSTANCE_URL";
pub const API_VERSION_ENV: &str = "ORGQL_API_VERSION";

/// API version used when neither the environment nor the auth file pins one.
pub const DEFAULT_API_VERSION: &str = "62.0";

/// Everything needed to reach one org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgCredentials {
    pub instance_url: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl OrgCredentials {
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            api_version: None,
        }
    }
}

/// Credential values from a single source. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialLayer {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub instance_url: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

impl CredentialLayer {
    /// Values given explicitly, e.g. as CLI flags.
    pub fn explicit(access_token: Option<String>, instance_url: Option<String>) -> Self {
        Self {
            access_token: non_empty(access_token),
            instance_url: non_empty(instance_url),
            api_version: None,
        }
    }

    /// The `ORGQL_*` variables, read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            access_token: non_empty(lookup(ACCESS_TOKEN_ENV)),
            instance_url: non_empty(lookup(INSTANCE_URL_ENV)),
            api_version: non_empty(lookup(API_VERSION_ENV)),
        }
    }

    /// The `ORGQL_*` variables of this process.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Values from the auth file at `path`; `Ok(None)` if there is no such file.
    pub fn from_path(path: &Path) -> Result<Option<Self>, OrgApiError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OrgApiError::AuthConfig(format!(
                    "Could not read auth file {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let layer: Self = serde_json::from_str(&text).map_err(|e| {
            OrgApiError::AuthConfig(format!("Malformed auth file {}: {}", path.display(), e))
        })?;
        Ok(Some(Self {
            access_token: non_empty(layer.access_token),
            instance_url: non_empty(layer.instance_url),
            api_version: non_empty(layer.api_version),
        }))
    }

    fn has_required(&self) -> bool {
        self.access_token.is_some() && self.instance_url.is_some()
    }

    /// Fill every field still missing here from `lower`.
    fn or_from(self, lower: Self) -> Self {
        Self {
            access_token: self.access_token.or(lower.access_token),
            instance_url: self.instance_url.or(lower.instance_url),
            api_version: self.api_version.or(lower.api_version),
        }
    }
}

/// Read credentials from a JSON auth file at `path`. Both `instanceUrl` and
/// `accessToken` must be set.
pub fn credentials_from_path(path: &Path) -> Result<OrgCredentials, OrgApiError> {
    let layer = CredentialLayer::from_path(path)?.ok_or_else(|| {
        OrgApiError::AuthConfig(format!("Auth file {} does not exist", path.display()))
    })?;
    match layer {
        CredentialLayer {
            access_token: Some(access_token),
            instance_url: Some(instance_url),
            api_version,
        } => Ok(OrgCredentials {
            instance_url,
            access_token,
            api_version,
        }),
        _ => Err(OrgApiError::AuthConfig(format!(
            "Auth file {} must set both instanceUrl and accessToken",
            path.display()
        ))),
    }
}

/// Resolve each field on its own: `explicit`, then `env`, then the auth file.
///
/// The file is only required when the higher layers leave the token or the
/// instance URL unset; otherwise an unreadable file is logged and skipped.
pub fn resolve_layers(
    explicit: CredentialLayer,
    env: CredentialLayer,
    auth_file: &Path,
) -> Result<OrgCredentials, OrgApiError> {
    let upper = explicit.or_from(env);
    let file = match CredentialLayer::from_path(auth_file) {
        Ok(file) => file.unwrap_or_default(),
        Err(e) if upper.has_required() => {
            tracing::warn!(error = %e, "ignoring auth file");
            CredentialLayer::default()
        }
        Err(e) => return Err(e),
    };
    let merged = upper.or_from(file);

    let access_token = merged.access_token.ok_or_else(|| {
        OrgApiError::AuthConfig(format!(
            "No access token: pass --access-token, set {}, or add accessToken to {}",
            ACCESS_TOKEN_ENV,
            auth_file.display()
        ))
    })?;
    let instance_url = merged.instance_url.ok_or_else(|| {
        OrgApiError::AuthConfig(format!(
            "No instance URL: pass --instance-url, set {}, or add instanceUrl to {}",
            INSTANCE_URL_ENV,
            auth_file.display()
        ))
    })?;
    Ok(OrgCredentials {
        instance_url,
        access_token,
        api_version: merged.api_version,
    })
}

/// Resolve credentials from the environment and `~/.orgql/auth.json`.
pub fn auto_credentials() -> Result<OrgCredentials, OrgApiError> {
    resolve_credentials(None, None)
}

/// Resolve credentials with explicit values (CLI flags) taking precedence
/// over the environment and the auth file, field by field.
pub fn resolve_credentials(
    access_token: Option<String>,
    instance_url: Option<String>,
) -> Result<OrgCredentials, OrgApiError> {
    resolve_layers(
        CredentialLayer::explicit(access_token, instance_url),
        CredentialLayer::from_env(),
        &auth_file_path(),
    )
}

/// Parse and check an instance URL. Only absolute http(s) URLs are accepted.
pub fn normalize_instance_url(raw: &str) -> Result<Url, OrgApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| OrgApiError::AuthConfig(format!("Invalid instance URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(OrgApiError::AuthConfig(format!(
                "Instance URL '{}' must use http or https, not {}",
                raw, other
            )))
        }
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(OrgApiError::AuthConfig(format!(
            "Instance URL '{}' has no host",
            raw
        )));
    }
    Ok(url)
}

/// Accept `62.0` or `v62.0`, reject anything that isn't `<major>.<minor>`.
pub fn normalize_api_version(raw: &str) -> Result<String, OrgApiError> {
    let version = raw.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    let valid = version
        .split_once('.')
        .is_some_and(|(major, minor)| is_digits(major) && is_digits(minor));
    if !valid {
        return Err(OrgApiError::AuthConfig(format!(
            "Invalid API version '{}' (expected e.g. {})",
            raw, DEFAULT_API_VERSION
        )));
    }
    Ok(version.to_string())
}

pub fn auth_file_path() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".orgql")
        .join("auth.json")
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
