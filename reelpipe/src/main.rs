//! Reelpipe CLI: run, range-run, or single-stage the short-form video
//! pipeline, or pre-flight-check its dependencies.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reelpipe::catalog;
use reelpipe::config::OrchestratorConfig;
use reelpipe::controller::{RunController, RunMode};
use reelpipe::core::AbortCause;
use reelpipe::executor::StepExecutor;
use reelpipe::exit_codes;
use reelpipe::observability;
use reelpipe::verify::VerificationScanner;
use reelpipe::workspace::Workspace;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "reelpipe",
    version,
    about = "Short-form video pipeline orchestrator"
)]
struct Cli {
    /// Base directory for media and session state.
    #[arg(long, default_value = "workspace")]
    workspace_root: PathBuf,

    /// Location of provider credentials.
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Directory holding the stage tools.
    #[arg(long, default_value = "tools")]
    tools_dir: PathBuf,

    /// Per-unit timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Abort on missing critical dependencies instead of warning.
    #[arg(long)]
    strict: bool,

    /// Write the finalized run report as JSON to this path.
    #[arg(long)]
    report_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all stages in order, or an inclusive index range.
    Run {
        /// First stage index to run (default 1).
        #[arg(long)]
        from: Option<usize>,
        /// Last stage index to run (default: the last stage).
        #[arg(long)]
        to: Option<usize>,
    },
    /// Run a single stage by its 1-based index.
    Stage {
        /// The stage index.
        index: usize,
    },
    /// Pre-flight check of required files, directories, and credentials.
    Verify,
}

#[tokio::main]
async fn main() {
    observability::init_tracing();
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            exit_codes::FAILURE
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = OrchestratorConfig::new()
        .with_workspace_root(&cli.workspace_root)
        .with_credentials_path(&cli.credentials)
        .with_tools_dir(&cli.tools_dir)
        .with_strict_verification(cli.strict);
    if let Some(secs) = cli.timeout_secs {
        config = config.with_unit_timeout(Duration::from_secs(secs));
    }

    match cli.command {
        Command::Verify => {
            let report = VerificationScanner::for_config(&config).scan();
            println!("{}", report.render());
            Ok(if report.has_missing_critical() {
                exit_codes::MISSING_DEPENDENCY
            } else {
                exit_codes::OK
            })
        }
        Command::Run { from, to } => {
            execute(&config, cli.report_json.as_deref(), |len| match (from, to) {
                (None, None) => RunMode::Full,
                (from, to) => RunMode::Range {
                    start: from.unwrap_or(1),
                    end: to.unwrap_or(len),
                },
            })
            .await
        }
        Command::Stage { index } => {
            execute(&config, cli.report_json.as_deref(), |_| RunMode::Single(index)).await
        }
    }
}

async fn execute(
    config: &OrchestratorConfig,
    report_json: Option<&std::path::Path>,
    mode_for: impl FnOnce(usize) -> RunMode,
) -> Result<i32> {
    let registry = catalog::default_registry(config).context("build stage registry")?;
    let mode = mode_for(registry.len());

    let controller = RunController::new(registry, Workspace::at(&config.workspace_root))
        .with_executor(StepExecutor::new().with_tail_chars(config.output_tail_chars))
        .with_scanner(VerificationScanner::for_config(config))
        .with_strict_verification(config.strict_verification)
        .with_unit_timeout(config.unit_timeout);

    let report = controller.run(mode).await.context("run pipeline")?;
    println!("{}", report.render_summary());

    if let Some(path) = report_json {
        let payload =
            serde_json::to_string_pretty(&report).context("serialize run report")?;
        std::fs::write(path, payload)
            .with_context(|| format!("write report {}", path.display()))?;
    }

    Ok(match &report.abort {
        None => exit_codes::OK,
        Some(AbortCause::Environment { .. }) => exit_codes::ENVIRONMENT,
        Some(AbortCause::MissingDependency { .. }) => exit_codes::MISSING_DEPENDENCY,
        Some(AbortCause::RequiredStageFailure { .. }) => exit_codes::STAGE_FAILED,
    })
}
