//! Fallback selection policy.
//!
//! Substitution is provider-level, not pipeline-level: downstream stages
//! proceed unaware of which provider actually produced the artifact.

use crate::core::ExecutionOutcome;
use crate::registry::Stage;
use crate::units::StageUnit;
use std::sync::Arc;

/// Pure decision function over a stage's declared fallbacks and the
/// attempts already captured for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSelector;

impl FallbackSelector {
    /// Decides whether a fallback should be tried next, and which one.
    ///
    /// Policy: fallbacks are tried strictly in declaration order; a
    /// fallback is attempted only when the immediately preceding attempt
    /// (primary or an earlier fallback) was not a success; once a unit
    /// succeeds no further fallback is attempted; once all fallbacks are
    /// exhausted the stage's final outcome is the last attempt.
    ///
    /// `attempts` must be the outcomes recorded for this stage so far, in
    /// order. Returns the 0-based fallback ordinal together with the
    /// unit.
    #[must_use]
    pub fn select_fallback<'a>(
        stage: &'a Stage,
        attempts: &[ExecutionOutcome],
    ) -> Option<(usize, &'a Arc<dyn StageUnit>)> {
        let last = attempts.last()?;
        if !last.status.is_fallback_eligible() {
            return None;
        }
        // The primary accounts for the first attempt; everything after it
        // consumed one declared fallback each.
        let next_ordinal = attempts.len() - 1;
        stage
            .fallbacks
            .get(next_ordinal)
            .map(|unit| (next_ordinal, unit))
    }
}
