//! Default stage catalog for the short-form video pipeline.
//!
//! Each stage tool is an external program under the configured tools
//! directory, satisfying the stage unit contract: no interactive input,
//! success via exit status, artifacts left in the workspace media
//! directories. The orchestrator neither knows nor cares what a tool
//! does internally.

use crate::config::OrchestratorConfig;
use crate::errors::PipelineError;
use crate::registry::{StageDef, StageRegistry};
use crate::units::{HttpCallUnit, ProcessUnit, StageUnit};
use std::path::PathBuf;
use std::sync::Arc;

/// Interpreter used for the stage tools.
const PYTHON: &str = "python3";

/// Stage tool files expected under the tools directory, with the unit
/// name each is registered as.
const TOOLS: &[(&str, &str)] = &[
    ("trend-scan", "analyze_trends.py"),
    ("promptgen", "generate_prompts.py"),
    ("imagegen-primary", "generate_images.py"),
    ("imagegen-fallback", "generate_images_fallback.py"),
    ("videogen-primary", "generate_video.py"),
    ("videogen-fallback", "generate_video_fallback.py"),
    ("ffmpeg-finish", "post_process.py"),
    ("platform-upload", "upload_platforms.py"),
    ("cloud-backup", "backup_upload.py"),
];

/// The stage tools a run depends on, as (unit name, path) pairs. The
/// verification scanner lists these as critical pipeline files.
#[must_use]
pub fn required_tools(config: &OrchestratorConfig) -> Vec<(&'static str, PathBuf)> {
    TOOLS
        .iter()
        .map(|(name, file)| (*name, config.tools_dir.join(file)))
        .collect()
}

fn tool_unit(config: &OrchestratorConfig, name: &str, file: &str) -> Arc<dyn StageUnit> {
    Arc::new(
        ProcessUnit::new(name, PYTHON)
            .with_arg(config.tools_dir.join(file))
            .with_current_dir(&config.workspace_root)
            .with_env("REELPIPE_CREDENTIALS", &config.credentials_path),
    )
}

/// Builds the canonical short-form video pipeline.
///
/// Trend analysis, platform upload, and cloud backup are optional: a
/// missing trend report or a failed upload is worth recording but not
/// worth discarding a rendered clip over. Everything between them is
/// required, since each later stage consumes the artifacts of the
/// earlier ones.
pub fn default_registry(config: &OrchestratorConfig) -> Result<StageRegistry, PipelineError> {
    let mut video = StageDef::new("generate-video", tool_unit(config, "videogen-primary", "generate_video.py"))
        .with_fallback(tool_unit(config, "videogen-fallback", "generate_video_fallback.py"));
    if let Some(endpoint) = &config.remote_render_endpoint {
        video = video.with_fallback(Arc::new(
            HttpCallUnit::new("videogen-remote", endpoint).with_payload(serde_json::json!({
                "workspace": config.workspace_root.display().to_string(),
                "preset": "vertical",
            })),
        ));
    }

    StageRegistry::builder()
        .stage(
            StageDef::new("analyze-trends", tool_unit(config, "trend-scan", "analyze_trends.py"))
                .optional(),
        )
        .stage(StageDef::new(
            "generate-prompts",
            tool_unit(config, "promptgen", "generate_prompts.py"),
        ))
        .stage(
            StageDef::new(
                "generate-images",
                tool_unit(config, "imagegen-primary", "generate_images.py"),
            )
            .with_fallback(tool_unit(
                config,
                "imagegen-fallback",
                "generate_images_fallback.py",
            )),
        )
        .stage(video)
        .stage(StageDef::new(
            "post-process",
            tool_unit(config, "ffmpeg-finish", "post_process.py"),
        ))
        .stage(
            StageDef::new(
                "upload-platforms",
                tool_unit(config, "platform-upload", "upload_platforms.py"),
            )
            .optional(),
        )
        .stage(
            StageDef::new(
                "backup-upload",
                tool_unit(config, "cloud-backup", "backup_upload.py"),
            )
            .optional(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_stage_order() {
        let config = OrchestratorConfig::default();
        let registry = default_registry(&config).expect("registry");

        let names: Vec<&str> = registry
            .all_stages()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "analyze-trends",
                "generate-prompts",
                "generate-images",
                "generate-video",
                "post-process",
                "upload-platforms",
                "backup-upload",
            ]
        );
    }

    #[test]
    fn test_default_registry_policy_flags() {
        let config = OrchestratorConfig::default();
        let registry = default_registry(&config).expect("registry");

        assert!(!registry.get_stage(1).unwrap().required);
        assert!(registry.get_stage(2).unwrap().required);
        assert!(registry.get_stage(4).unwrap().required);
        assert!(!registry.get_stage(6).unwrap().required);
        assert!(!registry.get_stage(7).unwrap().required);
    }

    #[test]
    fn test_generation_stages_carry_fallbacks() {
        let config = OrchestratorConfig::default();
        let registry = default_registry(&config).expect("registry");

        assert_eq!(registry.get_stage(3).unwrap().unit_count(), 2);
        assert_eq!(registry.get_stage(4).unwrap().unit_count(), 2);
        assert_eq!(registry.get_stage(5).unwrap().unit_count(), 1);
    }

    #[test]
    fn test_remote_render_endpoint_adds_video_fallback() {
        let config = OrchestratorConfig::default()
            .with_remote_render_endpoint("https://render.example/api");
        let registry = default_registry(&config).expect("registry");

        let video = registry.get_stage(4).unwrap();
        assert_eq!(video.unit_count(), 3);
        assert_eq!(video.fallbacks[1].name(), "videogen-remote");
    }

    #[test]
    fn test_required_tools_resolve_under_tools_dir() {
        let config = OrchestratorConfig::default().with_tools_dir("/opt/tools");
        let tools = required_tools(&config);

        assert_eq!(tools.len(), 9);
        assert!(tools
            .iter()
            .all(|(_, path)| path.starts_with("/opt/tools")));
    }
}
