//! `api request graphql` output scenarios, shared by the mock-org and online suites.

use std::path::{Path, PathBuf};

use orgql_test_utils::{
    assert_edge_count, assert_no_errors, assert_non_empty_object, edge_path, CommandRunner,
    EnvironmentProvisioner, HarnessError, ScenarioGroup, Verifier,
};
use serde_json::Value;

pub const ACCOUNTS_QUERY: &str =
    "query accounts { uiapi { query { Account { edges { node { Id Name { value } } } } } } }";
pub const NO_ADDRESSES_QUERY: &str =
    "query Address {  uiapi {   query {Address { edges {  node {    Id }  }  }  } }}";

pub fn orgql_bin() -> PathBuf {
    #[allow(deprecated)]
    assert_cmd::cargo::cargo_bin("orgql")
}

pub fn fixture_project() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("data-project")
}

/// Unwrap a harness result, panicking with its display message.
pub fn must<T>(result: Result<T, HarnessError>) -> T {
    result.unwrap_or_else(|e| panic!("{}", e))
}

fn body_file<R: CommandRunner>(v: &Verifier<'_, R>, fixture: &str) -> String {
    format!(
        "api request graphql --body {}",
        v.session().quoted_project_path(fixture)
    )
}

fn body_inline(query: &str) -> String {
    format!("api request graphql --body \"{}\"", query)
}

fn check_edges(doc: &Value, entity: &str, expected: usize) {
    assert_non_empty_object(doc);
    assert_edge_count(doc, &edge_path(entity), expected);
    assert_no_errors(doc);
}

pub fn register_graphql_scenarios<P, R>(group: &mut ScenarioGroup<P, R>)
where
    P: EnvironmentProvisioner,
    R: CommandRunner,
{
    group
        .scenario("std out: result from --body file", |v| {
            let doc = must(v.run_and_parse(&body_file(v, "standard.txt")));
            check_edges(&doc, "Account", 1);
        })
        .scenario("std out: result from inline --body", |v| {
            let doc = must(v.run_and_parse(&body_inline(ACCOUNTS_QUERY)));
            check_edges(&doc, "Account", 1);
        })
        .scenario("std out: no results from inline --body", |v| {
            let doc = must(v.run_and_parse(&body_inline(NO_ADDRESSES_QUERY)));
            check_edges(&doc, "Address", 0);
        })
        .scenario("std out: no results from --body file", |v| {
            let doc = must(v.run_and_parse(&body_file(v, "noResults.txt")));
            check_edges(&doc, "Address", 0);
        })
        .scenario("stream-to-file: result from --body file", |v| {
            let out = v.unique_output_path("out", "txt");
            let command = format!(
                "{} --stream-to-file {}",
                body_file(v, "standard.txt"),
                out.display()
            );
            let doc = must(v.run_to_file_and_parse(&command, &out));
            check_edges(&doc, "Account", 1);
        })
        .scenario("stream-to-file: no results from --body file", |v| {
            let out = v.unique_output_path("empty", "txt");
            let command = format!(
                "{} --stream-to-file {}",
                body_file(v, "noResults.txt"),
                out.display()
            );
            let doc = must(v.run_to_file_and_parse(&command, &out));
            check_edges(&doc, "Address", 0);
        })
        .scenario("stream-to-file: same document as std out", |v| {
            let stdout_doc = must(v.run_and_parse(&body_file(v, "standard.txt")));
            let out = v.unique_output_path("compare", "json");
            let command = format!(
                "{} --stream-to-file {}",
                body_file(v, "standard.txt"),
                out.display()
            );
            let file_doc = must(v.run_to_file_and_parse(&command, &out));
            assert_eq!(stdout_doc, file_doc);
        })
        .scenario("stream-to-file: prints nothing on std out", |v| {
            let out = v.unique_output_path("quiet", "txt");
            let command = format!(
                "{} --stream-to-file {}",
                body_file(v, "noResults.txt"),
                out.display()
            );
            let output = must(v.run(&command));
            assert!(output.success(), "command failed: {}", output.stderr);
            assert!(output.stdout.trim().is_empty(), "unexpected stdout: {}", output.stdout);
            assert!(output.stderr.contains("Wrote response body to"));
        })
        .scenario("repeated runs are identical", |v| {
            let first = must(v.run_and_parse(&body_file(v, "standard.txt")));
            let second = must(v.run_and_parse(&body_file(v, "standard.txt")));
            assert_eq!(first, second);
        });
}
