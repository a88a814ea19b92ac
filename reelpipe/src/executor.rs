//! Step executor: runs exactly one unit and normalizes its result.

use crate::core::{ExecutionOutcome, UnitKind};
use crate::units::StageUnit;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default bound on captured stdout/stderr tails, in characters.
pub const DEFAULT_TAIL_CHARS: usize = 2000;

/// Executes one unit (primary or a specific fallback) as an isolated
/// operation and normalizes its result into an [`ExecutionOutcome`].
///
/// Side effects are entirely those of the invoked unit; the executor only
/// captures output and enforces the timeout. A unit panic is captured as
/// a failure outcome; nothing a unit does unwinds past this boundary.
#[derive(Debug, Clone)]
pub struct StepExecutor {
    tail_chars: usize,
}

impl Default for StepExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StepExecutor {
    /// Creates an executor with the default output-tail bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tail_chars: DEFAULT_TAIL_CHARS,
        }
    }

    /// Sets the output-tail bound in characters.
    #[must_use]
    pub fn with_tail_chars(mut self, tail_chars: usize) -> Self {
        self.tail_chars = tail_chars;
        self
    }

    /// Runs the unit under `timeout` and returns its normalized outcome.
    ///
    /// On expiry the unit's task is aborted; a `ProcessUnit` child is
    /// killed through `kill_on_drop`. The outcome then carries
    /// `UnitStatus::Timeout` so operators can tell a hung provider from a
    /// rejecting one.
    pub async fn run_unit(
        &self,
        stage_index: usize,
        stage_name: &str,
        unit_kind: UnitKind,
        unit: &Arc<dyn StageUnit>,
        timeout: Duration,
    ) -> ExecutionOutcome {
        let unit_name = unit.name().to_string();
        debug!(
            stage = stage_name,
            unit = %unit_name,
            kind = %unit_kind,
            timeout_secs = timeout.as_secs(),
            "running unit"
        );

        let started = Instant::now();
        let mut task = {
            let unit = Arc::clone(unit);
            tokio::spawn(async move { unit.invoke().await })
        };

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(output)) => {
                let duration = started.elapsed();
                let outcome = if output.success {
                    ExecutionOutcome::success(
                        stage_index,
                        stage_name,
                        &unit_name,
                        unit_kind,
                        duration,
                    )
                } else {
                    ExecutionOutcome::failure(
                        stage_index,
                        stage_name,
                        &unit_name,
                        unit_kind,
                        duration,
                    )
                };
                outcome
                    .with_output(
                        tail(&output.stdout, self.tail_chars),
                        tail(&output.stderr, self.tail_chars),
                    )
                    .with_exit_code(output.exit_code)
            }
            Ok(Err(join_err)) => {
                let duration = started.elapsed();
                warn!(stage = stage_name, unit = %unit_name, error = %join_err, "unit task failed");
                ExecutionOutcome::failure(
                    stage_index,
                    stage_name,
                    &unit_name,
                    unit_kind,
                    duration,
                )
                .with_output("", format!("unit task failed: {join_err}"))
            }
            Err(_) => {
                task.abort();
                let duration = started.elapsed();
                warn!(
                    stage = stage_name,
                    unit = %unit_name,
                    timeout_secs = timeout.as_secs(),
                    "unit timed out, terminating"
                );
                ExecutionOutcome::timeout(
                    stage_index,
                    stage_name,
                    &unit_name,
                    unit_kind,
                    duration,
                )
            }
        }
    }
}

/// Returns the last `limit` characters of `text`, trimmed of trailing
/// whitespace and cut on a char boundary.
fn tail(text: &str, limit: usize) -> String {
    let trimmed = text.trim_end();
    if trimmed.len() <= limit {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - limit;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnitStatus;
    use crate::units::{FnUnit, ProcessUnit, UnitOutput};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct SlowUnit {
        delay: Duration,
    }

    #[async_trait]
    impl StageUnit for SlowUnit {
        fn name(&self) -> &str {
            "slow"
        }

        async fn invoke(&self) -> UnitOutput {
            tokio::time::sleep(self.delay).await;
            UnitOutput::ok()
        }
    }

    fn arc(unit: impl StageUnit + 'static) -> Arc<dyn StageUnit> {
        Arc::new(unit)
    }

    #[tokio::test]
    async fn test_successful_unit_outcome() {
        let executor = StepExecutor::new();
        let unit = arc(FnUnit::new("promptgen", || {
            UnitOutput::from_exit(Some(0), "wrote 3 prompts", "")
        }));

        let outcome = executor
            .run_unit(2, "generate-prompts", UnitKind::Primary, &unit, Duration::from_secs(5))
            .await;

        assert_eq!(outcome.status, UnitStatus::Success);
        assert_eq!(outcome.stage_index, 2);
        assert_eq!(outcome.unit_name, "promptgen");
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.stdout_tail.contains("3 prompts"));
    }

    #[tokio::test]
    async fn test_failed_unit_outcome() {
        let executor = StepExecutor::new();
        let unit = arc(FnUnit::new("videogen", || {
            UnitOutput::fail("content policy rejection")
        }));

        let outcome = executor
            .run_unit(4, "generate-video", UnitKind::Primary, &unit, Duration::from_secs(5))
            .await;

        assert_eq!(outcome.status, UnitStatus::Failure);
        assert!(outcome.stderr_tail.contains("rejection"));
    }

    #[tokio::test]
    async fn test_timeout_produces_timeout_status() {
        let executor = StepExecutor::new();
        let unit = arc(SlowUnit {
            delay: Duration::from_secs(30),
        });

        let outcome = executor
            .run_unit(4, "generate-video", UnitKind::Primary, &unit, Duration::from_millis(50))
            .await;

        assert_eq!(outcome.status, UnitStatus::Timeout);
        assert_eq!(outcome.exit_code, None);
        assert!(outcome.duration >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_timed_out_process_is_killed() {
        let executor = StepExecutor::new();
        let unit: Arc<dyn StageUnit> =
            Arc::new(ProcessUnit::new("sleeper", "sh").with_args(["-c", "sleep 30"]));

        let started = Instant::now();
        let outcome = executor
            .run_unit(1, "post-process", UnitKind::Primary, &unit, Duration::from_millis(100))
            .await;

        assert_eq!(outcome.status, UnitStatus::Timeout);
        // The run_unit call itself must return promptly, not after 30s.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_panicking_unit_is_captured_as_failure() {
        let executor = StepExecutor::new();
        let unit = arc(FnUnit::new("broken", || panic!("provider client bug")));

        let outcome = executor
            .run_unit(3, "generate-images", UnitKind::Fallback, &unit, Duration::from_secs(5))
            .await;

        assert_eq!(outcome.status, UnitStatus::Failure);
        assert!(outcome.stderr_tail.contains("unit task failed"));
    }

    #[tokio::test]
    async fn test_output_tails_are_bounded() {
        let executor = StepExecutor::new().with_tail_chars(16);
        let unit = arc(FnUnit::new("chatty", || {
            UnitOutput::from_exit(Some(0), "x".repeat(5000), "y".repeat(5000))
        }));

        let outcome = executor
            .run_unit(1, "analyze-trends", UnitKind::Primary, &unit, Duration::from_secs(5))
            .await;

        assert_eq!(outcome.stdout_tail.len(), 16);
        assert_eq!(outcome.stderr_tail.len(), 16);
    }

    #[test]
    fn test_tail_keeps_short_text_and_respects_char_boundaries() {
        assert_eq!(tail("short", 100), "short");
        assert_eq!(tail("tail only\n", 100), "tail only");

        // 'é' is two bytes; the cut must not split it.
        let text = "aéééé";
        let tailed = tail(text, 5);
        assert!(text.ends_with(&tailed));
    }
}
