use orgql_sdk::auth;

/// Print a compact LLM-friendly command reference.
pub fn run() {
    let env_hint = if std::env::var(auth::ACCESS_TOKEN_ENV).is_ok()
        && std::env::var(auth::INSTANCE_URL_ENV).is_ok()
    {
        " (set)"
    } else {
        ""
    };
    let file_hint = if auth::auth_file_path().exists() {
        " (found)"
    } else {
        ""
    };

    print!(
        r#"orgql — raw GraphQL requests against an org's UI API

COMMANDS:
  orgql api request graphql --body <FILE|QUERY>    Run a GraphQL query, print the response JSON
    [--stream-to-file PATH]                        Write the response body to PATH instead
    [--include]                                    Print HTTP status and headers first
  orgql usage                                      This reference

GLOBAL OPTIONS:
  --access-token <TOKEN>   Override access token
  --instance-url <URL>     Override instance URL
  --api-version <VER>      Override API version (default {default_version})
  --format human|json      Force output format (auto-detected by default)
  -v, -vv, -vvv            Log to stderr (RUST_LOG is honored otherwise)

AUTH (in precedence order):
  1. --access-token / --instance-url flags
  2. ${token_env} + ${url_env} env vars{env_hint}
  3. ~/.orgql/auth.json {{"instanceUrl", "accessToken", "apiVersion"}}{file_hint}
"#,
        default_version = auth::DEFAULT_API_VERSION,
        token_env = auth::ACCESS_TOKEN_ENV,
        url_env = auth::INSTANCE_URL_ENV,
    );
}
