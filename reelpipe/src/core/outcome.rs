//! Execution outcome type with factory methods.

use super::{UnitKind, UnitStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The result of running one unit (primary or fallback) for a stage.
///
/// `ExecutionOutcome` is immutable once created and is retained only for
/// the current run's report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// 1-based index of the stage the unit ran for.
    pub stage_index: usize,

    /// Name of the stage the unit ran for.
    pub stage_name: String,

    /// Name of the unit that produced this outcome.
    pub unit_name: String,

    /// Whether the unit was the stage's primary or a fallback.
    pub unit_kind: UnitKind,

    /// The result status.
    pub status: UnitStatus,

    /// Wall-clock duration of the attempt, including forced termination.
    pub duration: Duration,

    /// Bounded tail of the unit's standard output.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stdout_tail: String,

    /// Bounded tail of the unit's standard error.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stderr_tail: String,

    /// Process exit code, or the unit's equivalent (e.g. an HTTP status
    /// for remote-call units). `None` when the unit was killed or never
    /// reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ExecutionOutcome {
    fn base(
        stage_index: usize,
        stage_name: impl Into<String>,
        unit_name: impl Into<String>,
        unit_kind: UnitKind,
        status: UnitStatus,
        duration: Duration,
    ) -> Self {
        Self {
            stage_index,
            stage_name: stage_name.into(),
            unit_name: unit_name.into(),
            unit_kind,
            status,
            duration,
            stdout_tail: String::new(),
            stderr_tail: String::new(),
            exit_code: None,
        }
    }

    /// Creates a success outcome.
    #[must_use]
    pub fn success(
        stage_index: usize,
        stage_name: impl Into<String>,
        unit_name: impl Into<String>,
        unit_kind: UnitKind,
        duration: Duration,
    ) -> Self {
        Self::base(
            stage_index,
            stage_name,
            unit_name,
            unit_kind,
            UnitStatus::Success,
            duration,
        )
    }

    /// Creates a failure outcome.
    #[must_use]
    pub fn failure(
        stage_index: usize,
        stage_name: impl Into<String>,
        unit_name: impl Into<String>,
        unit_kind: UnitKind,
        duration: Duration,
    ) -> Self {
        Self::base(
            stage_index,
            stage_name,
            unit_name,
            unit_kind,
            UnitStatus::Failure,
            duration,
        )
    }

    /// Creates a timeout outcome.
    #[must_use]
    pub fn timeout(
        stage_index: usize,
        stage_name: impl Into<String>,
        unit_name: impl Into<String>,
        unit_kind: UnitKind,
        duration: Duration,
    ) -> Self {
        Self::base(
            stage_index,
            stage_name,
            unit_name,
            unit_kind,
            UnitStatus::Timeout,
            duration,
        )
    }

    /// Attaches captured output tails.
    #[must_use]
    pub fn with_output(
        mut self,
        stdout_tail: impl Into<String>,
        stderr_tail: impl Into<String>,
    ) -> Self {
        self.stdout_tail = stdout_tail.into();
        self.stderr_tail = stderr_tail.into();
        self
    }

    /// Attaches the exit code.
    #[must_use]
    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Returns true if the outcome is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
