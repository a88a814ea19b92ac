//! Stage unit trait and implementations.
//!
//! A unit is one invocable implementation of a stage's work (a specific
//! provider, script, or call). Units satisfy a single capability
//! contract: invocable with no interactive input, terminate on their own
//! or be forcibly terminable, and signal success or failure through their
//! exit status or returned flag. The shipped variants are an external
//! process ([`ProcessUnit`]), a remote API call ([`HttpCallUnit`]), and a
//! library call ([`FnUnit`]).

use async_trait::async_trait;
use std::fmt::Debug;

mod http;
mod process;

pub use http::HttpCallUnit;
pub use process::ProcessUnit;

/// The raw result a unit reports back, before the executor normalizes it
/// into an [`ExecutionOutcome`](crate::core::ExecutionOutcome).
#[derive(Debug, Clone)]
pub struct UnitOutput {
    /// Whether the unit signalled success.
    pub success: bool,
    /// Process exit code, or the unit's equivalent.
    pub exit_code: Option<i32>,
    /// Captured standard output (untruncated; the executor bounds it).
    pub stdout: String,
    /// Captured standard error (untruncated; the executor bounds it).
    pub stderr: String,
}

impl UnitOutput {
    /// Creates a successful output with no captured streams.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Creates a successful output with captured stdout.
    #[must_use]
    pub fn ok_with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: None,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Creates a failure output with a diagnostic on stderr.
    #[must_use]
    pub fn fail(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Creates an output from a process exit code: zero is success,
    /// anything else (including a missing code after a signal kill) is
    /// failure.
    #[must_use]
    pub fn from_exit(
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            success: exit_code == Some(0),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for stage units.
///
/// Implementations must never require interactive input and must report
/// failure through the returned [`UnitOutput`], not by panicking: the
/// executor treats a panic as a unit failure, but the unit loses the
/// chance to attach diagnostics.
#[async_trait]
pub trait StageUnit: Send + Sync + Debug {
    /// Returns the name of the unit.
    fn name(&self) -> &str;

    /// Invokes the unit and reports its raw result.
    async fn invoke(&self) -> UnitOutput;
}

/// A closure-backed unit, for library-call stages and tests.
pub struct FnUnit<F>
where
    F: Fn() -> UnitOutput + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnUnit<F>
where
    F: Fn() -> UnitOutput + Send + Sync,
{
    /// Creates a new closure-backed unit.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnUnit<F>
where
    F: Fn() -> UnitOutput + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnUnit").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> StageUnit for FnUnit<F>
where
    F: Fn() -> UnitOutput + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self) -> UnitOutput {
        (self.func)()
    }
}
