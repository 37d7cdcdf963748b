use crate::format;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Final state of one test unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The body completed without a failing assertion or a skip.
    Passed,
    /// An assertion failed.
    Failed,
    /// The test skipped itself.
    Skipped,
    /// The test terminated abnormally. Counted as a failure.
    Crashed,
}

/// Time spent in the test body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub wall: Duration,
    /// Process CPU time, when the platform reports it.
    pub cpu: Option<Duration>,
}

/// Store information related to one test execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub status: Status,
    /// Failure diagnostic, skip reason or crash description.
    pub message: Option<String>,
    pub timing: Option<Timing>,
}

impl TestResult {
    fn new(status: Status, message: Option<String>) -> Self {
        Self {
            status,
            message: message.map(format::clamp),
            timing: None,
        }
    }

    pub fn passed() -> Self {
        Self::new(Status::Passed, None)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(Status::Failed, Some(message.into()))
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(Status::Skipped, Some(message.into()))
    }

    pub fn crashed(message: impl Into<String>) -> Self {
        Self::new(Status::Crashed, Some(message.into()))
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }
}
