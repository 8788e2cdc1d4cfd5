use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::category::{CategoryKey, Locale, localized_name};

/// The pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Convert,
    Classify,
    Place,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Convert => write!(f, "convert"),
            Stage::Classify => write!(f, "classify"),
            Stage::Place => write!(f, "place"),
        }
    }
}

/// Per-item processing state. Transitions are monotonic:
/// Pending → Converted → Classified → Placed, with a jump to Failed
/// allowed from any non-terminal state and Skipped only from Pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Pending,
    Converted,
    Classified,
    Placed,
    Skipped,
    Failed { stage: Stage, reason: String },
}

impl ItemOutcome {
    /// Terminal outcomes never change again within a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemOutcome::Placed | ItemOutcome::Skipped | ItemOutcome::Failed { .. }
        )
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Pending => write!(f, "pending"),
            ItemOutcome::Converted => write!(f, "converted"),
            ItemOutcome::Classified => write!(f, "classified"),
            ItemOutcome::Placed => write!(f, "placed"),
            ItemOutcome::Skipped => write!(f, "skipped"),
            ItemOutcome::Failed { stage, reason } => write!(f, "failed({stage}): {reason}"),
        }
    }
}

/// One input file under processing.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Path to the original design file. Immutable once discovered.
    pub source_path: PathBuf,
    /// 1-based position in the sorted input listing; the resume anchor.
    pub sequence_index: u32,
    /// Set after successful conversion.
    pub rendered_image_path: Option<PathBuf>,
    /// Set after successful classification.
    pub category: Option<CategoryKey>,
    outcome: ItemOutcome,
}

impl WorkItem {
    pub fn new(source_path: PathBuf, sequence_index: u32) -> Self {
        Self {
            source_path,
            sequence_index,
            rendered_image_path: None,
            category: None,
            outcome: ItemOutcome::Pending,
        }
    }

    pub fn outcome(&self) -> &ItemOutcome {
        &self.outcome
    }

    /// Apply a forward transition. Terminal outcomes are frozen; a late
    /// transition attempt is a pipeline bug, caught in debug builds.
    fn advance(&mut self, next: ItemOutcome) {
        debug_assert!(
            !self.outcome.is_terminal(),
            "attempted transition out of terminal outcome {:?}",
            self.outcome
        );
        if !self.outcome.is_terminal() {
            self.outcome = next;
        }
    }

    pub fn mark_skipped(&mut self) {
        debug_assert_eq!(self.outcome, ItemOutcome::Pending);
        self.advance(ItemOutcome::Skipped);
    }

    pub fn mark_converted(&mut self, rendered: PathBuf) {
        debug_assert_eq!(self.outcome, ItemOutcome::Pending);
        self.rendered_image_path = Some(rendered);
        self.advance(ItemOutcome::Converted);
    }

    pub fn mark_classified(&mut self, category: CategoryKey) {
        debug_assert_eq!(self.outcome, ItemOutcome::Converted);
        self.category = Some(category);
        self.advance(ItemOutcome::Classified);
    }

    pub fn mark_placed(&mut self) {
        debug_assert_eq!(self.outcome, ItemOutcome::Classified);
        self.advance(ItemOutcome::Placed);
    }

    pub fn fail(&mut self, stage: Stage, reason: impl Into<String>) {
        self.advance(ItemOutcome::Failed {
            stage,
            reason: reason.into(),
        });
    }

    pub fn file_name(&self) -> &str {
        self.source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<invalid name>")
    }
}

/// Immutable parameters for one invocation.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub locale: Locale,
    pub dry_run: bool,
    /// Items with `sequence_index <= start_after` are skipped without
    /// touching any collaborator. Zero processes everything.
    pub start_after: u32,
    /// Scratch directory for rendered images.
    pub render_dir: PathBuf,
}

impl RunConfiguration {
    /// Output defaults to `<source>/categorized`; rendered images go
    /// into a scratch folder under the system temp dir.
    pub fn new(source_dir: PathBuf, dest_dir: Option<PathBuf>, locale: Locale) -> Self {
        let dest_dir = dest_dir.unwrap_or_else(|| source_dir.join("categorized"));
        Self {
            source_dir,
            dest_dir,
            locale,
            dry_run: false,
            start_after: 0,
            render_dir: std::env::temp_dir().join("stitchsort"),
        }
    }

    /// Destination folder for a category under this run's locale.
    pub fn category_dir(&self, key: CategoryKey) -> PathBuf {
        self.dest_dir.join(localized_name(key, self.locale))
    }

    /// Scratch path for the rendered image of a design file.
    pub fn rendered_path_for(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("design");
        self.render_dir.join(format!("{stem}.jpg"))
    }
}

/// A failure recorded against one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub sequence_index: u32,
    pub path: PathBuf,
    pub stage: Stage,
    pub reason: String,
}

/// A placement a dry run would have performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPlacement {
    pub sequence_index: u32,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Aggregate counts and details for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub discovered: usize,
    pub skipped: usize,
    pub converted: usize,
    pub classified: usize,
    pub placed: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub failures: Vec<ItemFailure>,
    /// Dry-run only: the placements that would have happened.
    pub planned: Vec<PlannedPlacement>,
    pub categories: BTreeSet<CategoryKey>,
}

impl RunSummary {
    /// Fold an item's terminal outcome into the counts.
    pub fn record(&mut self, item: &WorkItem) {
        match item.outcome() {
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Placed => {
                self.placed += 1;
                if let Some(key) = item.category {
                    self.categories.insert(key);
                }
            }
            ItemOutcome::Failed { stage, reason } => {
                self.failed += 1;
                self.failures.push(ItemFailure {
                    sequence_index: item.sequence_index,
                    path: item.source_path.clone(),
                    stage: *stage,
                    reason: reason.clone(),
                });
            }
            // Non-terminal outcomes are only seen when a run is cancelled
            // mid-batch; they contribute to no bucket.
            ItemOutcome::Pending | ItemOutcome::Converted | ItemOutcome::Classified => {}
        }
    }
}
