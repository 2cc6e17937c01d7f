//! Groups of independent scenarios sharing one session.
//!
//! A failing scenario only fails itself: its panic is caught, recorded, and
//! the next scenario runs. The session is released before results are
//! reported.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::HarnessError;
use crate::runner::CommandRunner;
use crate::session::{EnvironmentProvisioner, SessionOptions, TestSession};
use crate::verify::Verifier;

/// One scenario that did not pass.
#[derive(Debug, Clone)]
pub struct ScenarioFailure {
    pub scenario: String,
    pub message: String,
}

/// Runs scenarios sequentially against a shared session.
pub struct ScenarioGroup<P: EnvironmentProvisioner, R: CommandRunner> {
    name: String,
    session: TestSession<P>,
    runner: R,
    passed: Vec<String>,
    failed: Vec<ScenarioFailure>,
}

impl<P: EnvironmentProvisioner, R: CommandRunner> ScenarioGroup<P, R> {
    /// Provision the group's session. An error here means no scenario runs.
    pub fn setup(
        name: impl Into<String>,
        provisioner: P,
        options: &SessionOptions,
        runner: R,
    ) -> Result<Self, HarnessError> {
        let name = name.into();
        let session = TestSession::create(provisioner, options)?;
        tracing::info!(group = %name, "scenario group ready");
        Ok(Self {
            name,
            session,
            runner,
            passed: Vec::new(),
            failed: Vec::new(),
        })
    }

    pub fn session(&self) -> &TestSession<P> {
        &self.session
    }

    /// Run one scenario to completion, catching its panic if it fails.
    pub fn scenario<F>(&mut self, name: &str, body: F) -> &mut Self
    where
        F: FnOnce(&Verifier<'_, R>),
    {
        let verifier = Verifier::new(&self.runner, self.session.state());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&verifier)));
        match outcome {
            Ok(()) => {
                tracing::info!(group = %self.name, scenario = name, "scenario passed");
                self.passed.push(name.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(group = %self.name, scenario = name, %message, "scenario failed");
                self.failed.push(ScenarioFailure {
                    scenario: name.to_string(),
                    message,
                });
            }
        }
        self
    }

    /// Release the session and summarize the results.
    pub fn finish(self) -> GroupReport {
        let teardown = self.session.clean();
        GroupReport {
            group: self.name,
            passed: self.passed,
            failed: self.failed,
            teardown,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scenario panicked".to_string()
    }
}

/// Outcome of a finished scenario group.
#[derive(Debug)]
pub struct GroupReport {
    pub group: String,
    pub passed: Vec<String>,
    pub failed: Vec<ScenarioFailure>,
    pub teardown: Result<(), HarnessError>,
}

impl GroupReport {
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty() && self.teardown.is_ok()
    }

    /// Panic with every failure if any scenario (or the teardown) failed.
    #[track_caller]
    pub fn assert_all_passed(&self) {
        if !self.all_passed() {
            panic!("{}", self);
        }
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} passed, {} failed",
            self.group,
            self.passed.len(),
            self.failed.len()
        )?;
        for failure in &self.failed {
            writeln!(f, "  FAILED {}: {}", failure.scenario, failure.message)?;
        }
        if let Err(e) = &self.teardown {
            writeln!(f, "  {}", e)?;
        }
        Ok(())
    }
}
