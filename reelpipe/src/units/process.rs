//! External-process stage unit.

use super::{StageUnit, UnitOutput};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A unit that runs an external program and maps its exit status to
/// success or failure.
///
/// The child is spawned with `kill_on_drop`, so when the executor aborts
/// a timed-out invocation the process does not outlive its stage. Stdin
/// is closed: units must not expect interactive input.
#[derive(Debug, Clone)]
pub struct ProcessUnit {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, OsString)>,
}

impl ProcessUnit {
    /// Creates a new process unit.
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the child.
    #[must_use]
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Sets an environment variable for the child.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// The program this unit invokes.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl StageUnit for ProcessUnit {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self) -> UnitOutput {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        debug!(unit = %self.name, program = %self.program.display(), "spawning unit process");
        match cmd.output().await {
            Ok(output) => UnitOutput::from_exit(
                output.status.code(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            ),
            Err(err) => UnitOutput::fail(format!(
                "failed to spawn {}: {err}",
                self.program.display()
            )),
        }
    }
}
