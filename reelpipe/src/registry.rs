//! Stage registry: the canonical, ordered definition of pipeline stages.

use crate::errors::PipelineError;
use crate::units::StageUnit;
use std::collections::HashSet;
use std::sync::Arc;

/// One ordered pipeline unit of work: a primary provider, zero or more
/// fallbacks, and the required/optional policy flag.
///
/// Stages are defined once at orchestrator start and are immutable for
/// the duration of a run.
#[derive(Debug, Clone)]
pub struct Stage {
    /// 1-based position; defines execution order.
    pub index: usize,
    /// Human label.
    pub name: String,
    /// The provider tried first.
    pub primary: Arc<dyn StageUnit>,
    /// Alternate providers, tried strictly in this order.
    pub fallbacks: Vec<Arc<dyn StageUnit>>,
    /// If true, an exhausted failure aborts the run; if false it is
    /// recorded and the run continues.
    pub required: bool,
}

impl Stage {
    /// Total number of units (primary plus fallbacks).
    #[must_use]
    pub fn unit_count(&self) -> usize {
        1 + self.fallbacks.len()
    }
}

/// Definition of a stage before it is frozen into a registry.
#[derive(Debug, Clone)]
pub struct StageDef {
    name: String,
    primary: Arc<dyn StageUnit>,
    fallbacks: Vec<Arc<dyn StageUnit>>,
    required: bool,
}

impl StageDef {
    /// Creates a new required stage definition.
    #[must_use]
    pub fn new(name: impl Into<String>, primary: Arc<dyn StageUnit>) -> Self {
        Self {
            name: name.into(),
            primary,
            fallbacks: Vec::new(),
            required: true,
        }
    }

    /// Appends a fallback provider.
    #[must_use]
    pub fn with_fallback(mut self, unit: Arc<dyn StageUnit>) -> Self {
        self.fallbacks.push(unit);
        self
    }

    /// Marks the stage as optional: its failure is recorded but does not
    /// abort the run.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Builder for [`StageRegistry`]; assigns contiguous 1-based indices in
/// insertion order.
#[derive(Debug, Default)]
pub struct StageRegistryBuilder {
    defs: Vec<StageDef>,
}

impl StageRegistryBuilder {
    /// Creates a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage definition.
    #[must_use]
    pub fn stage(mut self, def: StageDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Freezes the definitions into a registry.
    ///
    /// # Errors
    ///
    /// Returns `EmptyRegistry` for zero stages and `DuplicateStageName`
    /// when two stages share a name.
    pub fn build(self) -> Result<StageRegistry, PipelineError> {
        if self.defs.is_empty() {
            return Err(PipelineError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for def in &self.defs {
            if !seen.insert(def.name.clone()) {
                return Err(PipelineError::DuplicateStageName(def.name.clone()));
            }
        }

        let stages = self
            .defs
            .into_iter()
            .enumerate()
            .map(|(i, def)| Stage {
                index: i + 1,
                name: def.name,
                primary: def.primary,
                fallbacks: def.fallbacks,
                required: def.required,
            })
            .collect();

        Ok(StageRegistry { stages })
    }
}

/// The ordered, read-only collection of pipeline stages.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Vec<Stage>,
}

impl StageRegistry {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder::new()
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a built registry; present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Looks up a stage by its 1-based index.
    pub fn get_stage(&self, index: usize) -> Result<&Stage, PipelineError> {
        if index == 0 || index > self.stages.len() {
            return Err(PipelineError::StageNotFound {
                index,
                len: self.stages.len(),
            });
        }
        Ok(&self.stages[index - 1])
    }

    /// All stages in execution order.
    #[must_use]
    pub fn all_stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Inclusive 1-based sub-range of stages, for partial-range runs.
    pub fn slice(&self, start: usize, end: usize) -> Result<&[Stage], PipelineError> {
        let len = self.stages.len();
        if start == 0 || start > end || end > len {
            return Err(PipelineError::InvalidRange { start, end, len });
        }
        Ok(&self.stages[start - 1..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{FnUnit, UnitOutput};

    fn unit(name: &str) -> Arc<dyn StageUnit> {
        Arc::new(FnUnit::new(name, UnitOutput::ok))
    }

    fn three_stage_registry() -> StageRegistry {
        StageRegistry::builder()
            .stage(StageDef::new("analyze-trends", unit("trend-scan")).optional())
            .stage(StageDef::new("generate-prompts", unit("promptgen")))
            .stage(
                StageDef::new("generate-video", unit("videogen-primary"))
                    .with_fallback(unit("videogen-fallback")),
            )
            .build()
            .expect("valid registry")
    }

    #[test]
    fn test_builder_assigns_contiguous_indices() {
        let registry = three_stage_registry();

        let indices: Vec<usize> =
            registry.all_stages().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_required_and_fallback_flags_preserved() {
        let registry = three_stage_registry();

        assert!(!registry.get_stage(1).unwrap().required);
        assert!(registry.get_stage(2).unwrap().required);
        assert_eq!(registry.get_stage(3).unwrap().unit_count(), 2);
    }

    #[test]
    fn test_get_stage_out_of_range() {
        let registry = three_stage_registry();

        assert!(matches!(
            registry.get_stage(0),
            Err(PipelineError::StageNotFound { index: 0, .. })
        ));
        assert!(matches!(
            registry.get_stage(4),
            Err(PipelineError::StageNotFound { index: 4, .. })
        ));
    }

    #[test]
    fn test_slice_returns_inclusive_range() {
        let registry = three_stage_registry();

        let slice = registry.slice(2, 3).expect("valid range");
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].name, "generate-prompts");
        assert_eq!(slice[1].name, "generate-video");
    }

    #[test]
    fn test_slice_invalid_ranges() {
        let registry = three_stage_registry();

        assert!(matches!(
            registry.slice(0, 2),
            Err(PipelineError::InvalidRange { .. })
        ));
        assert!(matches!(
            registry.slice(3, 2),
            Err(PipelineError::InvalidRange { .. })
        ));
        assert!(matches!(
            registry.slice(1, 4),
            Err(PipelineError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert!(matches!(
            StageRegistry::builder().build(),
            Err(PipelineError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_duplicate_stage_name_rejected() {
        let result = StageRegistry::builder()
            .stage(StageDef::new("upload", unit("tiktok")))
            .stage(StageDef::new("upload", unit("youtube")))
            .build();

        assert!(matches!(
            result,
            Err(PipelineError::DuplicateStageName(name)) if name == "upload"
        ));
    }
}
