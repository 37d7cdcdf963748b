//! An executor runs the registered test units and produces their results.

mod context;
pub mod isolation;
pub mod results;

pub use context::{run_child, Executor, RunContext};
pub use test::{recover_unit, run_unit};

use crate::errors::Error;
use serde::Deserialize;

/// Where a test unit's lifecycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Isolation {
    /// A child process per unit. Crashes are contained.
    Process,
    /// The controlling process. Only unwinding is contained; a signal or an
    /// abort ends the whole run.
    InProcess,
}

impl Default for Isolation {
    fn default() -> Self {
        Isolation::Process
    }
}

impl std::str::FromStr for Isolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Isolation::Process),
            "in-process" => Ok(Isolation::InProcess),
            _ => Err(Error::UnknownIsolation(s.to_string())),
        }
    }
}
