use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::category::CategoryRegistry;
use crate::classifier::ImageClassifier;
use crate::convert::DesignConverter;
use crate::error::{ConfigError, PlaceError};
use crate::repository::FileRepository;
use crate::run_log::RunLog;

use super::item::{PlannedPlacement, RunConfiguration, RunSummary, Stage, WorkItem};

/// Drives every discovered design file through convert → classify → place.
///
/// Failure isolation is total: any collaborator failure is recorded
/// against its item and the batch moves on. The only aborting errors are
/// configuration-level and happen before the first item is touched.
pub struct CategorizationPipeline<V, C, R> {
    converter: V,
    classifier: C,
    repository: R,
    registry: CategoryRegistry,
    cancel: Arc<AtomicBool>,
    log: Option<RunLog>,
}

impl<V, C, R> CategorizationPipeline<V, C, R>
where
    V: DesignConverter,
    C: ImageClassifier,
    R: FileRepository,
{
    pub fn new(converter: V, classifier: C, repository: R, registry: CategoryRegistry) -> Self {
        Self {
            converter,
            classifier,
            repository,
            registry,
            cancel: Arc::new(AtomicBool::new(false)),
            log: None,
        }
    }

    /// Share a cancellation flag; when set, the run stops at the next
    /// item boundary. The in-flight item always finishes or fails whole.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_run_log(mut self, log: RunLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Process the configured source directory and return the summary.
    pub async fn run(&mut self, config: &RunConfiguration) -> Result<RunSummary, ConfigError> {
        let files = self
            .repository
            .list_design_files(&config.source_dir, Some(&config.dest_dir))?;

        if !config.dry_run {
            // Fail fast on an unwritable destination root, before any
            // collaborator is invoked.
            if let Err(PlaceError::CreateDir { path, source }) =
                self.repository.ensure_dir(&config.dest_dir)
            {
                return Err(ConfigError::OutputUnwritable { path, source });
            }
        }

        let mut summary = RunSummary {
            discovered: files.len(),
            ..RunSummary::default()
        };
        let mut items: Vec<WorkItem> = files
            .into_iter()
            .enumerate()
            .map(|(i, path)| WorkItem::new(path, (i + 1) as u32))
            .collect();
        let mut scratch_images: Vec<PathBuf> = Vec::new();

        if let Some(log) = &mut self.log {
            let _ = log.note(&format!(
                "run started: source={} dest={} locale={} dry_run={} start_after={}",
                config.source_dir.display(),
                config.dest_dir.display(),
                config.locale,
                config.dry_run,
                config.start_after,
            ));
        }

        let total = items.len();
        for item in &mut items {
            if self.cancel.load(Ordering::Relaxed) {
                summary.cancelled = true;
                tracing::warn!("cancellation requested, stopping at item boundary");
                break;
            }

            if item.sequence_index <= config.start_after {
                tracing::debug!(seq = item.sequence_index, name = item.file_name(), "skipped by resume");
                item.mark_skipped();
            } else {
                tracing::info!(
                    seq = item.sequence_index,
                    total,
                    name = item.file_name(),
                    "processing design file"
                );
                self.process_item(item, config, &mut summary, &mut scratch_images)
                    .await;
            }

            summary.record(item);
            if let Some(log) = &mut self.log
                && let Err(e) = log.record(item.sequence_index, &item.source_path, item.outcome())
            {
                tracing::warn!(error = %e, "failed to append to run log");
            }
        }

        // Scratch renders are temp files; drop them regardless of how
        // their items ended.
        for path in scratch_images {
            let _ = std::fs::remove_file(&path);
        }

        if let Some(log) = &mut self.log {
            let _ = log.note(&format!(
                "run finished: placed={} failed={} skipped={} cancelled={}",
                summary.placed, summary.failed, summary.skipped, summary.cancelled,
            ));
        }

        Ok(summary)
    }

    /// One item, start to terminal outcome. Every collaborator failure
    /// is absorbed here.
    async fn process_item(
        &self,
        item: &mut WorkItem,
        config: &RunConfiguration,
        summary: &mut RunSummary,
        scratch_images: &mut Vec<PathBuf>,
    ) {
        // Convert.
        let rendered = config.rendered_path_for(&item.source_path);
        match self.converter.convert(&item.source_path, &rendered) {
            Ok(()) => {
                scratch_images.push(rendered.clone());
                item.mark_converted(rendered.clone());
                summary.converted += 1;
            }
            Err(e) => {
                tracing::warn!(name = item.file_name(), error = %e, "conversion failed");
                item.fail(Stage::Convert, e.to_string());
                return;
            }
        }

        // Classify and resolve through the registry; the raw model
        // output never reaches the summary or the disk.
        let raw_label = match self.classifier.classify(&rendered).await {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!(name = item.file_name(), error = %e, "classification failed");
                item.fail(Stage::Classify, e.to_string());
                return;
            }
        };
        let key = self.registry.resolve(&raw_label);
        item.mark_classified(key);
        summary.classified += 1;

        // Place.
        let category_dir = config.category_dir(key);
        if config.dry_run {
            summary.planned.push(PlannedPlacement {
                sequence_index: item.sequence_index,
                source: item.source_path.clone(),
                destination: category_dir.join(item.file_name()),
            });
            item.mark_placed();
            return;
        }

        if let Err(e) = self.repository.ensure_dir(&category_dir) {
            item.fail(Stage::Place, e.to_string());
            return;
        }
        if let Err(e) = self.repository.copy_into(&item.source_path, &category_dir) {
            item.fail(Stage::Place, e.to_string());
            return;
        }
        // The rendered preview travels with the design file.
        if self.repository.exists(&rendered)
            && let Err(e) = self.repository.copy_into(&rendered, &category_dir)
        {
            item.fail(Stage::Place, e.to_string());
            return;
        }

        tracing::info!(name = item.file_name(), category = %key, "placed");
        item.mark_placed();
    }
}
