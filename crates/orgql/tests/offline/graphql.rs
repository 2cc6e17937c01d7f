use super::*;

#[test]
fn api_help_shows_request_subcommand() {
    orgql()
        .args(["api", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("request"));
}

#[test]
fn graphql_help_shows_flags() {
    orgql()
        .args(["api", "request", "graphql", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--body"))
        .stdout(predicate::str::contains("--stream-to-file"))
        .stdout(predicate::str::contains("--include"));
}

#[test]
fn graphql_requires_body() {
    orgql()
        .args(["api", "request", "graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--body"));
}

#[test]
fn include_conflicts_with_stream_to_file() {
    orgql()
        .args([
            "api",
            "request",
            "graphql",
            "--body",
            "{ uiapi { query { Account { edges { node { Id } } } } } }",
            "--include",
            "--stream-to-file",
            "out.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn syntax_error_rejected_before_auth() {
    orgql()
        .args([
            "api",
            "request",
            "graphql",
            "--body",
            "query broken { uiapi { query { Account {",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("GraphQL syntax error"))
        .stderr(predicate::str::contains("Auth configuration").not());
}

#[test]
fn empty_body_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "\n").unwrap();
    orgql()
        .args(["api", "request", "graphql", "--body"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GraphQL body is empty"));
}

#[test]
fn missing_body_file_reported() {
    orgql()
        .args(["api", "request", "graphql", "--body", "missing/standard.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "neither an existing file nor a GraphQL query",
        ));
}

#[test]
fn missing_credentials_reported() {
    let home = tempfile::tempdir().unwrap();
    orgql()
        .env("HOME", home.path())
        .args([
            "api",
            "request",
            "graphql",
            "--body",
            "{ uiapi { query { Account { edges { node { Id } } } } } }",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Auth configuration error"));
}

#[test]
fn invalid_api_version_reported() {
    orgql()
        .args([
            "--access-token",
            "tok",
            "--instance-url",
            "https://example.my.site",
            "--api-version",
            "latest",
            "api",
            "request",
            "graphql",
            "--body",
            "{ uiapi { query { Account { edges { node { Id } } } } } }",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API version"));
}
