//! End-to-end `api request graphql` runs against a local mock org.

use super::*;
use orgql_test_utils::mock_org::MockOrg;
use orgql_test_utils::{assert_edge_count, assert_no_errors, edge_path};

const ACCOUNTS: &str =
    "query accounts { uiapi { query { Account { edges { node { Id Name { value } } } } } } }";
const ADDRESSES: &str = "query Address { uiapi { query { Address { edges { node { Id } } } } } }";

fn orgql_for(org: &MockOrg) -> Command {
    let mut cmd = orgql();
    cmd.env("ORGQL_ACCESS_TOKEN", MockOrg::ACCESS_TOKEN)
        .env("ORGQL_INSTANCE_URL", org.uri());
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[tokio::test(flavor = "multi_thread")]
async fn prints_response_json() {
    let org = MockOrg::start().await;
    let output = orgql_for(&org)
        .args(["--format", "json", "api", "request", "graphql", "--body", ACCOUNTS])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_edge_count(&doc, &edge_path("Account"), 1);
    assert_no_errors(&doc);
    assert_eq!(org.received_queries().await, vec![ACCOUNTS.to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn reads_body_from_file() {
    let org = MockOrg::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noResults.txt");
    std::fs::write(&path, format!("{}\n", ADDRESSES)).unwrap();

    let output = orgql_for(&org)
        .args(["--format", "json", "api", "request", "graphql", "--body"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_edge_count(&stdout_json(&output), &edge_path("Address"), 0);
    // Surrounding whitespace is trimmed before sending.
    assert_eq!(org.received_queries().await, vec![ADDRESSES.to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn flags_override_env_credentials() {
    let org = MockOrg::start().await;
    let output = orgql()
        .env("ORGQL_ACCESS_TOKEN", "stale-token")
        .env("ORGQL_INSTANCE_URL", "http://127.0.0.1:9")
        .args(["--access-token", MockOrg::ACCESS_TOKEN, "--instance-url"])
        .arg(org.uri())
        .args(["api", "request", "graphql", "--body", ACCOUNTS])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[tokio::test(flavor = "multi_thread")]
async fn token_flag_pairs_with_env_instance_url() {
    let org = MockOrg::start().await;
    let home = tempfile::tempdir().unwrap();
    let output = orgql()
        .env("HOME", home.path())
        .env("ORGQL_INSTANCE_URL", org.uri())
        .args(["--access-token", MockOrg::ACCESS_TOKEN])
        .args(["api", "request", "graphql", "--body", ACCOUNTS])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_edge_count(&stdout_json(&output), &edge_path("Account"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn include_prints_status_and_headers() {
    let org = MockOrg::start().await;
    let output = orgql_for(&org)
        .args(["--format", "json", "api", "request", "graphql", "-i", "--body", ACCOUNTS])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("HTTP/1.1 200"));
    assert!(stdout.to_lowercase().contains("content-type: application/json"));
    let (_, body) = stdout.split_once("\n\n").expect("blank line after headers");
    let doc: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_edge_count(&doc, &edge_path("Account"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn stream_to_file_writes_body_only() {
    let org = MockOrg::start().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("out.json");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();
    std::fs::write(&out, "stale contents that are longer than nothing").unwrap();

    let output = orgql_for(&org)
        .args(["api", "request", "graphql", "--body", ADDRESSES, "--stream-to-file"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Wrote response body to"));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written, MockOrg::addresses_response());
}

#[tokio::test(flavor = "multi_thread")]
async fn stream_to_file_creates_parent_dirs() {
    let org = MockOrg::start().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b").join("out.txt");

    orgql_for(&org)
        .args(["api", "request", "graphql", "--body", ACCOUNTS, "--stream-to-file"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn graphql_errors_are_printed_verbatim() {
    let org = MockOrg::start().await;
    let output = orgql_for(&org)
        .args([
            "--format",
            "json",
            "api",
            "request",
            "graphql",
            "--body",
            "query c { uiapi { query { Contact { edges { node { Id } } } } } }",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["errors"].as_array().map(Vec::len), Some(1));
    assert!(doc["data"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_token_exits_nonzero() {
    let org = MockOrg::start().await;
    let output = orgql()
        .env("ORGQL_ACCESS_TOKEN", "wrong-token")
        .env("ORGQL_INSTANCE_URL", org.uri())
        .args(["api", "request", "graphql", "--body", ACCOUNTS])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Authentication error"), "stderr: {}", stderr);
    assert!(stderr.contains("INVALID_SESSION_ID"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_token_does_not_write_file() {
    let org = MockOrg::start().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");
    orgql()
        .env("ORGQL_ACCESS_TOKEN", "wrong-token")
        .env("ORGQL_INSTANCE_URL", org.uri())
        .args(["api", "request", "graphql", "--body", ACCOUNTS, "--stream-to-file"])
        .arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn human_format_is_still_json() {
    let org = MockOrg::start().await;
    let output = orgql_for(&org)
        .args(["--format", "human", "api", "request", "graphql", "--body", ACCOUNTS])
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_edge_count(&stdout_json(&output), &edge_path("Account"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn api_version_flag_selects_endpoint() {
    let org = MockOrg::start().await;
    orgql_for(&org)
        .args(["--api-version", "v59.0", "api", "request", "graphql", "--body", ACCOUNTS])
        .assert()
        .success();

    let requests = org.received_paths().await;
    assert_eq!(requests, vec!["/services/data/v59.0/graphql".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn verbose_logs_go_to_stderr() {
    let org = MockOrg::start().await;
    let output = orgql_for(&org)
        .args(["-vv", "--format", "json", "api", "request", "graphql", "--body", ACCOUNTS])
        .output()
        .unwrap();
    assert!(output.status.success());
    stdout_json(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("executing GraphQL request"));
}
