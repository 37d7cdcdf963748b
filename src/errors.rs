use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Lifecycle slot of a fixture that an override replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Setup,
    Teardown,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Slot::Setup => write!(f, "setup"),
            Slot::Teardown => write!(f, "teardown"),
        }
    }
}

/// An error from isotest.
///
/// Test outcomes (failed assertions, skips, crashes) are never errors; they
/// are recorded as results. This type covers configuration mistakes in the
/// registration phase and failures of the runner's own plumbing.
#[derive(Error, Debug)]
pub enum Error {
    /// A fixture name was declared twice.
    #[error("fixture `{0}` is declared more than once")]
    DuplicateFixture(String),

    /// A fixture lifecycle slot was overridden twice.
    #[error("fixture `{fixture}` already has a {slot} override")]
    DuplicateOverride {
        /// Name of the fixture.
        fixture: String,
        /// Slot that was overridden again.
        slot: Slot,
    },

    /// A test or override referenced a fixture that was never declared.
    #[error("fixture `{0}` was never declared")]
    UndeclaredFixture(String),

    /// A fixture was referenced with a data type other than its declared one.
    #[error("fixture `{fixture}` holds `{declared}`, not `{requested}`")]
    FixtureTypeMismatch {
        fixture: String,
        declared: &'static str,
        requested: &'static str,
    },

    /// An isolated child was asked to run a unit that does not exist.
    #[error("no test unit #{index} named `{name}` is registered")]
    UnknownUnit { index: usize, name: String },

    /// The isolated child and the controller disagree about the channel.
    #[error("{name}: {reason}")]
    ChildProtocol { name: String, reason: String },

    /// `--isolation` named a mode that does not exist.
    #[error("isolation must be `process` or `in-process`, not `{0}`")]
    UnknownIsolation(String),

    /// The configuration file could not be read or parsed.
    #[error("failed to load {}: {}", path.display(), reason)]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
