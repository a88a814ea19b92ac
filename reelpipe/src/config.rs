//! Orchestrator configuration.
//!
//! Configuration is an explicit object passed into the verification
//! scanner, the workspace, and unit constructors; no ambient globals.

use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default per-unit timeout. Video synthesis providers routinely take
/// minutes per clip.
pub const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(900);

/// Default bound on captured output tails, in characters.
pub const DEFAULT_OUTPUT_TAIL_CHARS: usize = 2000;

/// Explicit configuration for one orchestrator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Base directory for media and session state.
    pub workspace_root: PathBuf,

    /// Location of provider credentials.
    pub credentials_path: PathBuf,

    /// Directory holding the stage tools the default catalog invokes.
    pub tools_dir: PathBuf,

    /// Abort on a missing critical dependency instead of warning.
    pub strict_verification: bool,

    /// Per-unit execution timeout.
    pub unit_timeout: Duration,

    /// Bound on captured stdout/stderr tails, in characters.
    pub output_tail_chars: usize,

    /// Alternate hosted render endpoint used as a last-resort video
    /// generation fallback, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_render_endpoint: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("workspace"),
            credentials_path: PathBuf::from("credentials.json"),
            tools_dir: PathBuf::from("tools"),
            strict_verification: false,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            output_tail_chars: DEFAULT_OUTPUT_TAIL_CHARS,
            remote_render_endpoint: None,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workspace root.
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Sets the credentials location.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Sets the tools directory.
    #[must_use]
    pub fn with_tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = dir.into();
        self
    }

    /// Enables or disables strict verification.
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

    /// Sets the output-tail bound.
    #[must_use]
    pub fn with_output_tail_chars(mut self, chars: usize) -> Self {
        self.output_tail_chars = chars;
        self
    }

    /// Sets the alternate hosted render endpoint.
    #[must_use]
    pub fn with_remote_render_endpoint(mut self, url: impl Into<String>) -> Self {
        self.remote_render_endpoint = Some(url.into());
        self
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }
}
