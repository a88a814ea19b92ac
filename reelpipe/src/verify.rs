//! Verification scanner: answers "can a run even start" without
//! performing one.

use crate::config::OrchestratorConfig;
use crate::workspace::Workspace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Grouping of required items in the verification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemGroup {
    /// Stage tools the pipeline cannot run without.
    CriticalPipeline,
    /// Assets that improve output but do not block a run.
    Support,
    /// Credential and configuration files.
    Configuration,
    /// Directories the run writes into.
    Directory,
}

impl ItemGroup {
    /// Returns true if a missing item in this group should block a
    /// strict-mode run.
    #[must_use]
    pub fn is_critical(self) -> bool {
        !matches!(self, Self::Support)
    }
}

impl fmt::Display for ItemGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CriticalPipeline => write!(f, "critical pipeline files"),
            Self::Support => write!(f, "support files"),
            Self::Configuration => write!(f, "configuration files"),
            Self::Directory => write!(f, "directories"),
        }
    }
}

/// One file, directory, or credential a run depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredItem {
    /// Short label for the item.
    pub name: String,
    /// Where the item is expected.
    pub path: PathBuf,
    /// Report grouping.
    pub group: ItemGroup,
}

impl RequiredItem {
    /// Creates a new required item.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, group: ItemGroup) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            group,
        }
    }
}

/// A required item with its observed presence flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedItem {
    /// The item that was checked.
    #[serde(flatten)]
    pub item: RequiredItem,
    /// Whether the item was found.
    pub present: bool,
}

/// Structured result of one verification scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the scan ran.
    pub scanned_at: DateTime<Utc>,
    /// Every checked item with its presence flag.
    pub items: Vec<VerifiedItem>,
}

impl VerificationReport {
    /// Returns true if every item is present.
    #[must_use]
    pub fn all_present(&self) -> bool {
        self.items.iter().all(|i| i.present)
    }

    /// The missing items.
    #[must_use]
    pub fn missing(&self) -> Vec<&VerifiedItem> {
        self.items.iter().filter(|i| !i.present).collect()
    }

    /// The missing items whose group blocks a run.
    #[must_use]
    pub fn missing_critical(&self) -> Vec<&VerifiedItem> {
        self.items
            .iter()
            .filter(|i| !i.present && i.item.group.is_critical())
            .collect()
    }

    /// Returns true if any critical item is missing.
    #[must_use]
    pub fn has_missing_critical(&self) -> bool {
        !self.missing_critical().is_empty()
    }

    /// Renders the grouped, human-readable listing.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!("verification scan at {}", self.scanned_at)];
        for group in [
            ItemGroup::CriticalPipeline,
            ItemGroup::Support,
            ItemGroup::Configuration,
            ItemGroup::Directory,
        ] {
            let in_group: Vec<&VerifiedItem> =
                self.items.iter().filter(|i| i.item.group == group).collect();
            if in_group.is_empty() {
                continue;
            }
            lines.push(format!("{group}:"));
            for item in in_group {
                let flag = if item.present { "[ok]     " } else { "[missing]" };
                lines.push(format!(
                    "  {flag} {:<24} {}",
                    item.item.name,
                    item.item.path.display()
                ));
            }
        }
        lines.join("\n")
    }
}

/// Read-only pre-flight check over the items a run depends on.
#[derive(Debug, Clone)]
pub struct VerificationScanner {
    items: Vec<RequiredItem>,
}

impl VerificationScanner {
    /// Creates a scanner over an explicit item list.
    #[must_use]
    pub fn new(items: Vec<RequiredItem>) -> Self {
        Self { items }
    }

    /// Derives the default item set for the short-form video pipeline
    /// from the given configuration.
    #[must_use]
    pub fn for_config(config: &OrchestratorConfig) -> Self {
        let mut items = vec![
            RequiredItem::new(
                "provider credentials",
                &config.credentials_path,
                ItemGroup::Configuration,
            ),
            RequiredItem::new("tools directory", &config.tools_dir, ItemGroup::Directory),
            RequiredItem::new(
                "workspace root",
                &config.workspace_root,
                ItemGroup::Directory,
            ),
            RequiredItem::new(
                "watermark asset",
                config.workspace_root.join("assets/watermark.png"),
                ItemGroup::Support,
            ),
        ];

        let workspace = Workspace::at(&config.workspace_root);
        for dir in workspace.media_dirs() {
            items.push(RequiredItem::new(
                "media directory",
                dir,
                ItemGroup::Directory,
            ));
        }

        for (name, path) in crate::catalog::required_tools(config) {
            items.push(RequiredItem::new(name, path, ItemGroup::CriticalPipeline));
        }

        Self::new(items)
    }

    /// The items this scanner checks.
    #[must_use]
    pub fn items(&self) -> &[RequiredItem] {
        &self.items
    }

    /// Checks every item and reports its presence. Mutates nothing.
    #[must_use]
    pub fn scan(&self) -> VerificationReport {
        let items = self
            .items
            .iter()
            .map(|item| {
                let present = match item.group {
                    ItemGroup::Directory => item.path.is_dir(),
                    _ => item.path.is_file(),
                };
                VerifiedItem {
                    item: item.clone(),
                    present,
                }
            })
            .collect();

        VerificationReport {
            scanned_at: Utc::now(),
            items,
        }
    }
}
