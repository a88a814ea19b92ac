//! Stable exit codes for the reelpipe CLI.
//!
//! Calling automation (e.g. a scheduler) uses these to distinguish
//! infrastructure problems from content-generation problems.

/// Run completed, or verification found nothing critical missing.
pub const OK: i32 = 0;
/// Usage error or internal failure.
pub const FAILURE: i32 = 1;
/// The workspace could not be brought to a known-clean state.
pub const ENVIRONMENT: i32 = 2;
/// A required stage exhausted its primary and all fallbacks.
pub const STAGE_FAILED: i32 = 3;
/// A required file, directory, or credential is missing.
pub const MISSING_DEPENDENCY: i32 = 4;
