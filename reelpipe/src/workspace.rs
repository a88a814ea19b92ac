//! Workspace reset: a clean, deterministic filesystem baseline per run.

use crate::errors::EnvironmentError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Generated-media directory for raw provider output, relative to the
/// workspace root.
pub const MEDIA_ORIGINALS: &str = "media/originals";
/// Generated-media directory for intermediate processing output.
pub const MEDIA_PROCESSED: &str = "media/processed";
/// Generated-media directory for finished clips.
pub const MEDIA_FINAL: &str = "media/final";
/// Persisted browser session/profile directory used by upload automation.
pub const BROWSER_PROFILE: &str = "browser-profile";

/// File-name patterns of transient diagnostic artifacts removed from the
/// workspace root on reset.
const DIAGNOSTIC_PATTERNS: &[&str] = &[
    r"^debug_.*\.(png|html)$",
    r"^screenshot_.*\.png$",
    r"^.*_dump\.json$",
];

/// The set of filesystem locations the orchestrator owns and resets
/// before each run.
///
/// Not an in-memory state holder: the clean-start invariant lives on
/// disk, and every stage may assume it holds once [`Workspace::reset`]
/// returns `Ok`.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    media_dirs: Vec<PathBuf>,
    session_dir: PathBuf,
    diagnostic_patterns: Vec<Regex>,
}

impl Workspace {
    /// Creates a workspace rooted at `root` with the standard layout.
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            media_dirs: [MEDIA_ORIGINALS, MEDIA_PROCESSED, MEDIA_FINAL]
                .iter()
                .map(|dir| root.join(dir))
                .collect(),
            session_dir: root.join(BROWSER_PROFILE),
            // Static, known-valid patterns.
            diagnostic_patterns: DIAGNOSTIC_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            root,
        }
    }

    /// The workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The generated-media working directories.
    #[must_use]
    pub fn media_dirs(&self) -> &[PathBuf] {
        &self.media_dirs
    }

    /// The persisted browser session/profile directory.
    #[must_use]
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Restores the clean-start state: an empty browser profile, empty
    /// media working directories, and no stale diagnostic artifacts.
    ///
    /// Idempotent, and tolerant of partial prior state: missing
    /// directories are created, and an individual stale file that cannot
    /// be deleted is logged and skipped. Only a directory that cannot be
    /// wiped or recreated is fatal.
    pub fn reset(&self) -> Result<(), EnvironmentError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| EnvironmentError::from_io(&self.root, &e))?;

        self.reset_session_dir()?;
        for dir in &self.media_dirs {
            self.clear_dir(dir)?;
        }
        self.remove_diagnostics()?;

        debug!(root = %self.root.display(), "workspace reset complete");
        Ok(())
    }

    /// Wipes the browser profile so each run starts without stale,
    /// possibly-flagged automation fingerprints. Leaving old session
    /// state behind defeats the reset, so failure here is fatal.
    fn reset_session_dir(&self) -> Result<(), EnvironmentError> {
        match fs::remove_dir_all(&self.session_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EnvironmentError::from_io(&self.session_dir, &e)),
        }
        fs::create_dir_all(&self.session_dir)
            .map_err(|e| EnvironmentError::from_io(&self.session_dir, &e))
    }

    /// Creates `dir` if missing and deletes its contents. Individual
    /// entries that refuse deletion (e.g. locked by another process) are
    /// skipped with a warning.
    fn clear_dir(&self, dir: &Path) -> Result<(), EnvironmentError> {
        fs::create_dir_all(dir).map_err(|e| EnvironmentError::from_io(dir, &e))?;

        let entries =
            fs::read_dir(dir).map_err(|e| EnvironmentError::from_io(dir, &e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                warn!(path = %path.display(), error = %e, "could not delete stale entry, skipping");
            }
        }
        Ok(())
    }

    /// Removes root-level files matching the known debug-output naming
    /// patterns.
    fn remove_diagnostics(&self) -> Result<(), EnvironmentError> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| EnvironmentError::from_io(&self.root, &e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if self.diagnostic_patterns.iter().any(|p| p.is_match(&name)) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "could not delete diagnostic artifact, skipping");
                }
            }
        }
        Ok(())
    }
}
