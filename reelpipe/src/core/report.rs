//! Run report: the aggregate record of one orchestrator invocation.

use super::{ExecutionOutcome, RunPhase, UnitKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a run was aborted.
///
/// Only three conditions stop a run early; everything else is recorded
/// and stepped past.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum AbortCause {
    /// The workspace could not be brought to a known-clean state.
    Environment {
        /// The reset error, rendered.
        message: String,
    },
    /// Strict verification found a required item missing.
    MissingDependency {
        /// The missing items, rendered.
        detail: String,
    },
    /// A required stage exhausted its primary and all fallbacks.
    RequiredStageFailure {
        /// 1-based index of the exhausted stage.
        stage_index: usize,
        /// Name of the exhausted stage.
        stage_name: String,
    },
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment { message } => {
                write!(f, "environment error: {message}")
            }
            Self::MissingDependency { detail } => {
                write!(f, "missing dependency: {detail}")
            }
            Self::RequiredStageFailure {
                stage_index,
                stage_name,
            } => {
                write!(
                    f,
                    "required stage {stage_index} '{stage_name}' exhausted all units"
                )
            }
        }
    }
}

/// Aggregate of all [`ExecutionOutcome`]s for one run, plus run identity
/// and final state.
///
/// Outcomes are appended in strict stage order (every attempt, primary
/// and fallback); the report is finalized exactly once via
/// [`RunReport::complete`] or [`RunReport::abort`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run ended; `None` while in progress.
    pub finished_at: Option<DateTime<Utc>>,

    /// The run-level state machine position.
    pub phase: RunPhase,

    /// 1-based indices of the stages this run planned to execute.
    pub planned_stages: Vec<usize>,

    /// Every unit attempt, in append order.
    pub outcomes: Vec<ExecutionOutcome>,

    /// Set when the run was aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort: Option<AbortCause>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    /// Creates a new in-progress report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            phase: RunPhase::Initializing,
            planned_stages: Vec::new(),
            outcomes: Vec::new(),
            abort: None,
        }
    }

    /// Appends a unit attempt outcome.
    pub fn record(&mut self, outcome: ExecutionOutcome) {
        self.outcomes.push(outcome);
    }

    /// Finalizes the report as completed.
    pub fn complete(&mut self) {
        self.phase = RunPhase::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Finalizes the report as aborted with the given cause.
    pub fn abort(&mut self, cause: AbortCause) {
        self.phase = RunPhase::Aborted;
        self.abort = Some(cause);
        self.finished_at = Some(Utc::now());
    }

    /// Returns true if the run was aborted.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.phase == RunPhase::Aborted
    }

    /// Returns true if the run completed without a required failure.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == RunPhase::Completed
    }

    /// The final (last-attempt) outcome per attempted stage, in stage
    /// order.
    ///
    /// Attempts for one stage are contiguous in `outcomes`, so the last
    /// entry for each index wins.
    #[must_use]
    pub fn final_outcomes(&self) -> Vec<&ExecutionOutcome> {
        let mut finals: Vec<&ExecutionOutcome> = Vec::new();
        for outcome in &self.outcomes {
            match finals.last() {
                Some(last) if last.stage_index == outcome.stage_index => {
                    let end = finals.len() - 1;
                    finals[end] = outcome;
                }
                _ => finals.push(outcome),
            }
        }
        finals
    }

    /// Indices of stages whose final outcome was a success.
    #[must_use]
    pub fn succeeded_stages(&self) -> Vec<usize> {
        self.final_outcomes()
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.stage_index)
            .collect()
    }

    /// Indices of stages whose final outcome was a failure or timeout.
    #[must_use]
    pub fn failed_stages(&self) -> Vec<usize> {
        self.final_outcomes()
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.stage_index)
            .collect()
    }

    /// Indices of planned stages that were never attempted (run aborted
    /// before reaching them).
    #[must_use]
    pub fn skipped_stages(&self) -> Vec<usize> {
        let attempted: Vec<usize> =
            self.final_outcomes().iter().map(|o| o.stage_index).collect();
        self.planned_stages
            .iter()
            .copied()
            .filter(|i| !attempted.contains(i))
            .collect()
    }

    /// Renders the human-readable end-of-run summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut lines = Vec::new();

        let headline = match &self.abort {
            None if self.is_completed() => format!("run {} completed", self.run_id),
            None => format!("run {} in progress", self.run_id),
            Some(cause) => format!("run {} aborted: {cause}", self.run_id),
        };
        lines.push(headline);

        for outcome in self.final_outcomes() {
            lines.push(format!(
                "  [{}] {:<20} {:<8} {} via {} ({})",
                outcome.stage_index,
                outcome.stage_name,
                outcome.status.to_string(),
                outcome.unit_kind,
                outcome.unit_name,
                format_duration(outcome.duration),
            ));
        }
        for index in self.skipped_stages() {
            lines.push(format!("  [{index}] skipped"));
        }

        lines.push(format!(
            "{} succeeded, {} failed, {} skipped",
            self.succeeded_stages().len(),
            self.failed_stages().len(),
            self.skipped_stages().len(),
        ));
        lines.join("\n")
    }

    /// Total number of fallback attempts across the run.
    #[must_use]
    pub fn fallback_attempts(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.unit_kind == UnitKind::Fallback)
            .count()
    }
}

fn format_duration(duration: std::time::Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnitKind;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn outcome(
        stage_index: usize,
        name: &str,
        kind: UnitKind,
        success: bool,
    ) -> ExecutionOutcome {
        let duration = Duration::from_millis(100);
        if success {
            ExecutionOutcome::success(stage_index, name, format!("{name}-unit"), kind, duration)
        } else {
            ExecutionOutcome::failure(stage_index, name, format!("{name}-unit"), kind, duration)
        }
    }

    #[test]
    fn test_final_outcome_is_last_attempt_per_stage() {
        let mut report = RunReport::new();
        report.planned_stages = vec![1, 2];
        report.record(outcome(1, "prompts", UnitKind::Primary, true));
        report.record(outcome(2, "video", UnitKind::Primary, false));
        report.record(outcome(2, "video", UnitKind::Fallback, true));

        let finals = report.final_outcomes();
        assert_eq!(finals.len(), 2);
        assert_eq!(finals[1].unit_kind, UnitKind::Fallback);
        assert!(finals[1].is_success());
    }

    #[test]
    fn test_succeeded_and_failed_stages() {
        let mut report = RunReport::new();
        report.planned_stages = vec![1, 2, 3];
        report.record(outcome(1, "prompts", UnitKind::Primary, true));
        report.record(outcome(2, "images", UnitKind::Primary, false));
        report.record(outcome(3, "video", UnitKind::Primary, true));
        report.complete();

        assert_eq!(report.succeeded_stages(), vec![1, 3]);
        assert_eq!(report.failed_stages(), vec![2]);
        assert!(report.skipped_stages().is_empty());
    }

    #[test]
    fn test_skipped_stages_after_abort() {
        let mut report = RunReport::new();
        report.planned_stages = vec![1, 2, 3];
        report.record(outcome(1, "prompts", UnitKind::Primary, true));
        report.record(outcome(2, "video", UnitKind::Primary, false));
        report.abort(AbortCause::RequiredStageFailure {
            stage_index: 2,
            stage_name: "video".to_string(),
        });

        assert!(report.aborted());
        assert_eq!(report.skipped_stages(), vec![3]);
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_render_summary_lists_stages() {
        let mut report = RunReport::new();
        report.planned_stages = vec![1, 2];
        report.record(outcome(1, "prompts", UnitKind::Primary, true));
        report.record(outcome(2, "video", UnitKind::Fallback, true));
        report.complete();

        let summary = report.render_summary();
        assert!(summary.contains("completed"));
        assert!(summary.contains("prompts"));
        assert!(summary.contains("fallback"));
        assert!(summary.contains("2 succeeded, 0 failed, 0 skipped"));
    }

    #[test]
    fn test_abort_cause_display() {
        let cause = AbortCause::RequiredStageFailure {
            stage_index: 4,
            stage_name: "generate-video".to_string(),
        };
        assert_eq!(
            cause.to_string(),
            "required stage 4 'generate-video' exhausted all units"
        );
    }

    #[test]
    fn test_fallback_attempts_counted() {
        let mut report = RunReport::new();
        report.record(outcome(1, "video", UnitKind::Primary, false));
        report.record(outcome(1, "video", UnitKind::Fallback, false));
        report.record(outcome(1, "video", UnitKind::Fallback, true));

        assert_eq!(report.fallback_attempts(), 2);
    }
}
