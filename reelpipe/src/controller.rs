//! Run controller: drives a full or partial pipeline run to completion
//! or abort.
//!
//! Per-stage flow: `PENDING → RUNNING(primary) → [RUNNING(fallback_i)]*
//! → DONE(success) | DONE(failure)`. Run-level flow is tracked as
//! [`RunPhase`] on the report: `Initializing → [VerifyingDependencies] →
//! ResettingWorkspace → RunningStages → {Completed | Aborted}`.
//!
//! Unit failures never unwind the controller: every attempt becomes an
//! [`ExecutionOutcome`](crate::core::ExecutionOutcome) in the report, and
//! policy (the fallback selector, the stage's `required` flag) decides
//! what happens next. Only an environment-reset failure, a strict-mode
//! missing dependency, and a required stage exhausting its units end a
//! run early.

use crate::config::DEFAULT_UNIT_TIMEOUT;
use crate::core::{AbortCause, ExecutionOutcome, RunPhase, RunReport, UnitKind, UnitStatus};
use crate::errors::PipelineError;
use crate::executor::StepExecutor;
use crate::fallback::FallbackSelector;
use crate::registry::{Stage, StageRegistry};
use crate::verify::VerificationScanner;
use crate::workspace::Workspace;
use std::time::Duration;
use tracing::{error, info, warn};

/// Which stages a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// All stages in registry order.
    Full,
    /// An inclusive 1-based index range.
    Range {
        /// First stage to run.
        start: usize,
        /// Last stage to run.
        end: usize,
    },
    /// Exactly one stage.
    Single(usize),
}

impl RunMode {
    /// Resolves the mode to an ordered stage slice.
    ///
    /// This is the whole of run-mode selection; any interactive step
    /// picking lives outside the orchestrator and ends up here.
    pub fn resolve<'a>(&self, registry: &'a StageRegistry) -> Result<&'a [Stage], PipelineError> {
        match *self {
            Self::Full => Ok(registry.all_stages()),
            Self::Range { start, end } => registry.slice(start, end),
            Self::Single(index) => {
                Ok(std::slice::from_ref(registry.get_stage(index)?))
            }
        }
    }
}

/// Drives the stage registry through the step executor, applying
/// fallback and required/optional policy, and produces a [`RunReport`].
#[derive(Debug)]
pub struct RunController {
    registry: StageRegistry,
    executor: StepExecutor,
    workspace: Workspace,
    scanner: Option<VerificationScanner>,
    strict_verification: bool,
    unit_timeout: Duration,
}

impl RunController {
    /// Creates a controller with default executor settings and no
    /// pre-flight gate.
    #[must_use]
    pub fn new(registry: StageRegistry, workspace: Workspace) -> Self {
        Self {
            registry,
            executor: StepExecutor::new(),
            workspace,
            scanner: None,
            strict_verification: false,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
        }
    }

    /// Replaces the step executor.
    #[must_use]
    pub fn with_executor(mut self, executor: StepExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Attaches a pre-flight verification scanner. Missing critical items
    /// are warnings unless strict verification is enabled.
    #[must_use]
    pub fn with_scanner(mut self, scanner: VerificationScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Enables or disables the strict verification gate.
    #[must_use]
    pub fn with_strict_verification(mut self, strict: bool) -> Self {
        self.strict_verification = strict;
        self
    }

    /// Sets the per-unit timeout.
    #[must_use]
    pub fn with_unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = timeout;
        self
    }

    /// Runs the selected stages to completion or abort.
    ///
    /// # Errors
    ///
    /// Only mode resolution can return `Err`: an invalid range or an
    /// unknown stage index, surfaced before any work starts. Once a run
    /// is underway every failure is data in the returned report.
    pub async fn run(&self, mode: RunMode) -> Result<RunReport, PipelineError> {
        let plan = mode.resolve(&self.registry)?;
        let mut report = RunReport::new();
        report.planned_stages = plan.iter().map(|s| s.index).collect();

        info!(
            run_id = %report.run_id,
            stages = plan.len(),
            "starting pipeline run"
        );

        if let Some(scanner) = &self.scanner {
            report.phase = RunPhase::VerifyingDependencies;
            let verification = scanner.scan();
            if verification.has_missing_critical() {
                let detail = verification
                    .missing_critical()
                    .iter()
                    .map(|i| i.item.path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                if self.strict_verification {
                    error!(missing = %detail, "strict verification failed, aborting run");
                    report.abort(AbortCause::MissingDependency { detail });
                    return Ok(report);
                }
                warn!(missing = %detail, "verification found missing items, continuing");
            }
        }

        report.phase = RunPhase::ResettingWorkspace;
        if let Err(err) = self.workspace.reset() {
            error!(error = %err, "workspace reset failed, aborting run");
            report.abort(AbortCause::Environment {
                message: err.to_string(),
            });
            return Ok(report);
        }

        report.phase = RunPhase::RunningStages;
        for stage in plan {
            let final_status = self.run_stage(stage, &mut report).await;

            if !final_status.is_success() && stage.required {
                error!(
                    stage = %stage.name,
                    index = stage.index,
                    "required stage exhausted all units, aborting run"
                );
                report.abort(AbortCause::RequiredStageFailure {
                    stage_index: stage.index,
                    stage_name: stage.name.clone(),
                });
                return Ok(report);
            }
        }

        report.complete();
        info!(run_id = %report.run_id, "pipeline run completed");
        Ok(report)
    }

    /// Runs one stage: the primary unit, then fallbacks as selected,
    /// recording every attempt. Returns the stage's final status.
    async fn run_stage(&self, stage: &Stage, report: &mut RunReport) -> UnitStatus {
        info!(
            stage = %stage.name,
            index = stage.index,
            "running stage"
        );

        let mut attempts: Vec<ExecutionOutcome> = Vec::new();
        let outcome = self
            .executor
            .run_unit(
                stage.index,
                &stage.name,
                UnitKind::Primary,
                &stage.primary,
                self.unit_timeout,
            )
            .await;
        attempts.push(outcome);

        while let Some((ordinal, unit)) =
            FallbackSelector::select_fallback(stage, &attempts)
        {
            warn!(
                stage = %stage.name,
                fallback = ordinal + 1,
                unit = unit.name(),
                "substituting fallback provider"
            );
            let outcome = self
                .executor
                .run_unit(
                    stage.index,
                    &stage.name,
                    UnitKind::Fallback,
                    unit,
                    self.unit_timeout,
                )
                .await;
            attempts.push(outcome);
        }

        let final_status = attempts
            .last()
            .map_or(UnitStatus::Failure, |o| o.status);
        match final_status {
            UnitStatus::Success => info!(
                stage = %stage.name,
                attempts = attempts.len(),
                "stage succeeded"
            ),
            _ => warn!(
                stage = %stage.name,
                status = %final_status,
                attempts = attempts.len(),
                "stage failed"
            ),
        }

        for outcome in attempts {
            report.record(outcome);
        }
        final_status
    }
}
