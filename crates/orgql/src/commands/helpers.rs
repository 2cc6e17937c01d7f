use std::path::Path;

use orgql_sdk::{auth, Client};

/// Connection overrides collected from global CLI flags.
#[derive(Debug, Default)]
pub struct ConnectOpts {
    pub access_token: Option<String>,
    pub instance_url: Option<String>,
    pub api_version: Option<String>,
}

/// Build a client: flags first, then env vars, then the auth file.
pub fn connect(opts: &ConnectOpts) -> anyhow::Result<Client> {
    let creds = auth::resolve_credentials(opts.access_token.clone(), opts.instance_url.clone())?;
    let client = Client::from_credentials(creds)?;
    let client = match opts.api_version.as_deref() {
        Some(version) => client.with_api_version(version)?,
        None => client,
    };
    tracing::debug!(endpoint = %client.graphql_endpoint(), "resolved org connection");
    Ok(client)
}

/// Resolve a `--body` argument: the contents of the file it names, or the
/// argument itself when it is query text.
pub async fn read_body_source(arg: &str) -> anyhow::Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        tracing::debug!(path = %path.display(), "reading body from file");
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Could not read body file {}: {}", path.display(), e));
    }
    if !arg.contains('{') && !arg.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "'{}' is neither an existing file nor a GraphQL query",
            arg
        ));
    }
    Ok(arg.to_string())
}
