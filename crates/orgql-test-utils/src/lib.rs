//! Black-box harness for orgql command output tests.
//!
//! Provision a [`TestSession`] from a fixture project, run command lines
//! through a [`CommandRunner`], and assert on the JSON they print or write.
//! [`ScenarioGroup`] ties these together: one session, many independent
//! scenarios, guaranteed teardown.

pub mod error;
pub mod mock_org;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod verify;

pub use error::HarnessError;
pub use runner::{CommandOutput, CommandRunner, InProcessRunner, ProcessRunner};
pub use scenario::{GroupReport, ScenarioFailure, ScenarioGroup};
pub use session::{
    AuthStrategy, EnvDefinition, EnvironmentProvisioner, LocalProvisioner, SessionOptions,
    SessionState, TestSession,
};
pub use verify::{
    assert_edge_count, assert_no_errors, assert_non_empty_object, edge_count, edge_path, lookup,
    parse_document, Verifier,
};
