//! Error types for the reelpipe orchestrator.
//!
//! Unit-level failures are not errors: they are captured as
//! [`ExecutionOutcome`](crate::core::ExecutionOutcome) data and decided on
//! by policy. The types here cover the conditions that are allowed to
//! surface as `Err`: registry misuse, configuration problems, and the
//! workspace failing to reach a known-clean state.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for orchestrator operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The workspace could not be brought to a known-clean state.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// A required file, directory, or credential is absent.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// A stage index outside the registry's range was requested.
    #[error("stage {index} not found (registry holds {len} stage(s))")]
    StageNotFound {
        /// The requested 1-based stage index.
        index: usize,
        /// Number of stages in the registry.
        len: usize,
    },

    /// A partial-range request with invalid bounds.
    #[error("invalid stage range {start}..={end} (registry holds {len} stage(s))")]
    InvalidRange {
        /// Inclusive 1-based range start.
        start: usize,
        /// Inclusive 1-based range end.
        end: usize,
        /// Number of stages in the registry.
        len: usize,
    },

    /// A registry was built with no stages.
    #[error("stage registry is empty")]
    EmptyRegistry,

    /// Two stages were registered under the same name.
    #[error("duplicate stage name '{0}'")]
    DuplicateStageName(String),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when the workspace reset cannot establish the clean-start
/// invariant. Fatal to the run; never retried within it.
#[derive(Debug, Clone, Error)]
#[error("workspace reset failed at {}: {message}", .path.display())]
pub struct EnvironmentError {
    /// The filesystem location the reset failed on.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

impl EnvironmentError {
    /// Creates a new environment error.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an environment error from an IO error.
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
