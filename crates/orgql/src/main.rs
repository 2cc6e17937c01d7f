mod commands;
mod output;
mod telemetry;

use clap::{ArgAction, Parser, Subcommand};

/// orgql — raw GraphQL requests against an org's UI API
#[derive(Debug, Parser)]
#[command(name = "orgql", version, about)]
struct Cli {
    /// Access token (overrides $ORGQL_ACCESS_TOKEN and ~/.orgql/auth.json).
    #[arg(long, global = true)]
    access_token: Option<String>,

    /// Instance URL, e.g. https://example.my.salesforce.com (overrides $ORGQL_INSTANCE_URL).
    #[arg(long, global = true)]
    instance_url: Option<String>,

    /// API version, e.g. 62.0 (overrides $ORGQL_API_VERSION).
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Output format. Auto-detected if not specified (human for terminal, json for pipe).
    #[arg(long, global = true)]
    format: Option<output::Format>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Make authenticated requests against org APIs.
    Api(commands::api::ApiCmd),
    /// Print a compact LLM-friendly command reference.
    Usage,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);
    let format = output::resolve_format(cli.format);

    let cmd = match cli.command {
        Command::Usage => {
            commands::usage::run();
            return;
        }
        Command::Api(cmd) => cmd,
    };

    let connect = commands::helpers::ConnectOpts {
        access_token: cli.access_token,
        instance_url: cli.instance_url,
        api_version: cli.api_version,
    };

    if let Err(e) = commands::api::run(cmd, &connect, format).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
