//! # Reelpipe
//!
//! A pipeline orchestrator for automated short-form video production.
//!
//! Reelpipe drives an ordered sequence of heterogeneous, failure-prone
//! stages (trend analysis, prompt generation, image and video synthesis,
//! post-processing, platform upload) with support for:
//!
//! - **Sequential stage execution**: stages run strictly in index order,
//!   each producing a recorded outcome before the next begins
//! - **Provider fallback**: a stage's primary provider can be substituted
//!   by declared fallbacks, tried in order, without aborting the run
//! - **Bounded unit execution**: every unit runs under a timeout with
//!   captured, tail-truncated output
//! - **Workspace reset**: a clean, idempotent filesystem baseline is
//!   established before every run
//! - **Pre-flight verification**: required files, directories, and
//!   credentials can be checked without starting a run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reelpipe::prelude::*;
//!
//! let config = OrchestratorConfig::default();
//! let registry = catalog::default_registry(&config)?;
//! let workspace = Workspace::at(&config.workspace_root);
//!
//! let controller = RunController::new(registry, workspace);
//! let report = controller.run(RunMode::Full).await?;
//! println!("{}", report.render_summary());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod catalog;
pub mod config;
pub mod controller;
pub mod core;
pub mod errors;
pub mod executor;
pub mod exit_codes;
pub mod fallback;
pub mod observability;
pub mod registry;
pub mod units;
pub mod verify;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::OrchestratorConfig;
    pub use crate::controller::{RunController, RunMode};
    pub use crate::core::{
        AbortCause, ExecutionOutcome, RunPhase, RunReport, UnitKind, UnitStatus,
    };
    pub use crate::errors::{EnvironmentError, PipelineError};
    pub use crate::executor::StepExecutor;
    pub use crate::fallback::FallbackSelector;
    pub use crate::registry::{Stage, StageDef, StageRegistry, StageRegistryBuilder};
    pub use crate::units::{FnUnit, HttpCallUnit, ProcessUnit, StageUnit, UnitOutput};
    pub use crate::verify::{
        ItemGroup, RequiredItem, VerificationReport, VerificationScanner,
    };
    pub use crate::workspace::Workspace;
}
