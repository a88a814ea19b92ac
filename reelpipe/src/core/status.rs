//! Unit and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of a stage's units produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// The stage's primary provider.
    Primary,
    /// One of the stage's declared fallback providers.
    Fallback,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// The result status of running one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// The unit completed and signalled success.
    Success,
    /// The unit completed with a failure condition (non-zero exit or
    /// reported failure).
    Failure,
    /// The unit exceeded its allotted time and was forcibly terminated.
    Timeout,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

impl UnitStatus {
    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if this outcome makes the stage eligible for a
    /// fallback attempt. Timeout is treated the same as failure here; the
    /// distinct status only matters for reporting.
    #[must_use]
    pub fn is_fallback_eligible(self) -> bool {
        !self.is_success()
    }
}

/// The run-level state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Run created, nothing executed yet.
    Initializing,
    /// Pre-flight dependency verification in progress.
    VerifyingDependencies,
    /// Workspace reset in progress.
    ResettingWorkspace,
    /// Iterating stages.
    RunningStages,
    /// All planned stages processed without a required failure.
    Completed,
    /// Run stopped early; see the report's abort cause.
    Aborted,
}

impl Default for RunPhase {
    fn default() -> Self {
        Self::Initializing
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::VerifyingDependencies => write!(f, "verifying_dependencies"),
            Self::ResettingWorkspace => write!(f, "resetting_workspace"),
            Self::RunningStages => write!(f, "running_stages"),
            Self::Completed => write!(f, "completed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

impl RunPhase {
    /// Returns true if the phase is a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_kind_display() {
        assert_eq!(UnitKind::Primary.to_string(), "primary");
        assert_eq!(UnitKind::Fallback.to_string(), "fallback");
    }

    #[test]
    fn test_unit_status_success() {
        assert!(UnitStatus::Success.is_success());
        assert!(!UnitStatus::Failure.is_success());
        assert!(!UnitStatus::Timeout.is_success());
    }

    #[test]
    fn test_timeout_is_fallback_eligible() {
        assert!(UnitStatus::Timeout.is_fallback_eligible());
        assert!(UnitStatus::Failure.is_fallback_eligible());
        assert!(!UnitStatus::Success.is_fallback_eligible());
    }

    #[test]
    fn test_run_phase_terminal() {
        assert!(RunPhase::Completed.is_terminal());
        assert!(RunPhase::Aborted.is_terminal());
        assert!(!RunPhase::RunningStages.is_terminal());
        assert!(!RunPhase::Initializing.is_terminal());
    }

    #[test]
    fn test_status_serialize() {
        let json = serde_json::to_string(&UnitStatus::Timeout).unwrap();
        assert_eq!(json, r#""timeout""#);

        let back: UnitStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UnitStatus::Timeout);
    }
}
