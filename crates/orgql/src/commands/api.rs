use std::path::PathBuf;

use clap::{Args, Subcommand};
use orgql_sdk::GraphQLBody;

use super::helpers::{self, ConnectOpts};
use crate::output::{self, Format};

/// Make authenticated requests against org APIs.
#[derive(Debug, Args)]
pub struct ApiCmd {
    #[command(subcommand)]
    pub action: ApiAction,
}

#[derive(Debug, Subcommand)]
pub enum ApiAction {
    /// Send a raw request to an org API.
    Request(RequestCmd),
}

#[derive(Debug, Args)]
pub struct RequestCmd {
    #[command(subcommand)]
    pub action: RequestAction,
}

#[derive(Debug, Subcommand)]
pub enum RequestAction {
    /// Execute a GraphQL query or mutation against the UI API.
    ///
    /// The response document is printed as-is, including any `errors` the
    /// endpoint reports.
    ///
    /// Examples:
    ///   orgql api request graphql --body ./standard.txt
    ///   orgql api request graphql --body "query accounts { uiapi { query { Account { edges { node { Id } } } } } }"
    ///   orgql api request graphql --body ./standard.txt --stream-to-file out.json
    Graphql(GraphqlArgs),
}

#[derive(Debug, Args)]
pub struct GraphqlArgs {
    /// GraphQL body: a path to a file containing the query, or the query text itself.
    #[arg(long)]
    pub body: String,
    /// Write the response body to this file instead of stdout (overwrites existing files).
    #[arg(long, value_name = "PATH", conflicts_with = "include")]
    pub stream_to_file: Option<PathBuf>,
    /// Print the HTTP status line and response headers before the body.
    #[arg(short, long)]
    pub include: bool,
}

pub async fn run(cmd: ApiCmd, connect: &ConnectOpts, format: Format) -> anyhow::Result<()> {
    match cmd.action {
        ApiAction::Request(request) => match request.action {
            RequestAction::Graphql(args) => run_graphql(args, connect, format).await,
        },
    }
}

async fn run_graphql(
    args: GraphqlArgs,
    connect: &ConnectOpts,
    format: Format,
) -> anyhow::Result<()> {
    // Validate locally before touching credentials or the network.
    let text = helpers::read_body_source(&args.body).await?;
    let body = GraphQLBody::parse(text)?;

    let client = helpers::connect(connect)?;
    tracing::info!(
        endpoint = %client.graphql_endpoint(),
        operation = body.operation_name().unwrap_or("<anonymous>"),
        "executing GraphQL request"
    );
    let response = client.request_graphql(&body).await?;

    match args.stream_to_file {
        Some(path) => {
            output::write_body(&path, &response.body).await?;
            tracing::info!(
                path = %path.display(),
                bytes = response.body.len(),
                "wrote response body"
            );
            eprintln!("Wrote response body to {}.", path.display());
        }
        None => {
            if args.include {
                output::print_response_head(response.status, &response.headers);
            }
            output::print_body(&response.body, format)?;
        }
    }
    Ok(())
}
