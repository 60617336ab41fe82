//! Plan executor module.
//!
//! Executes the operations of a plan:
//! - rename: move the file to its new name (sequential, plan order)
//! - convert: re-encode images into the target format (parallel, bounded)
//!
//! Failures are per item; earlier successes are never rolled back. Every
//! successful operation produces a reversal entry for the undo record.

use crate::core::converter::ImageConverter;
use crate::models::plan::{
    BatchSummary, Decision, OperationKind, Outcome, Plan, PlannedOperation,
};
use crate::models::undo::{ReversalAction, ReversalEntry, UndoRecord};
use crate::utils::fs::{describe_io_error, path_occupied};
use crate::Result;
use chrono::Local;
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current undo record format version.
pub const UNDO_VERSION: &str = "1.0";

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of images converted at once.
    pub convert_concurrency: usize,
    /// Whether to draw a progress bar.
    pub show_progress: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            convert_concurrency: 4,
            show_progress: true,
        }
    }
}

/// Result of executing a plan.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Aggregate counts.
    pub summary: BatchSummary,
    /// Undo record, present when at least one operation succeeded.
    pub undo_record: Option<UndoRecord>,
}

impl BatchReport {
    /// Check if no item failed.
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Print summary.
    pub fn print_summary(&self) {
        let s = &self.summary;
        println!("{}", "[Execution Summary]".bold().green());
        println!("  {} {}", "Succeeded:".bold(), s.succeeded);
        if s.converted > 0 {
            println!("  {} {}", "Converted:".bold(), s.converted);
        }
        println!("  {} {}", "Skipped:".bold(), s.skipped);
        println!("  {} {}", "Unchanged:".bold(), s.unchanged);
        println!("  {} {}", "Failed:".bold(), s.failed);

        if let Some(record) = &self.undo_record {
            let name_only = record.name_only_count();
            if name_only > 0 {
                println!();
                println!(
                    "{} {} converted file(s) replaced their originals; undo restores names only.",
                    "[NOTE]".yellow(),
                    name_only
                );
            }
        }
    }
}

/// Plan executor.
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    /// Create a new executor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExecutorConfig::default(),
        }
    }

    /// Create a new executor with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Execute a plan, writing each item's outcome back into it.
    pub async fn execute(&self, plan: &mut Plan) -> Result<BatchReport> {
        self.validate(plan)?;

        let pending = plan.items.iter().filter(|i| i.outcome.is_pending()).count();
        tracing::info!("Executing {} pending items", pending);

        let pb = self.progress_bar(pending as u64);
        let mut entries: Vec<(usize, ReversalEntry)> = Vec::new();
        let mut conversions: Vec<usize> = Vec::new();

        // Phase 1: decisions and renames, in plan order
        for (idx, item) in plan.items.iter_mut().enumerate() {
            if !item.outcome.is_pending() {
                continue;
            }

            match item.decision {
                Decision::SkipExists => {
                    item.outcome = Outcome::Skipped(format!("target exists: {}", item.new_name()));
                    pb.inc(1);
                    continue;
                }
                Decision::NoChange => {
                    item.outcome = Outcome::NoChange;
                    pb.inc(1);
                    continue;
                }
                Decision::Proceed | Decision::Overwrite => {}
            }

            if item.kind == OperationKind::Convert {
                conversions.push(idx);
                continue;
            }

            pb.set_message(item.original_name());
            match rename_item(item) {
                Ok(entry) => {
                    entries.push((idx, entry));
                    item.outcome = Outcome::Succeeded;
                }
                Err(e) => {
                    tracing::error!("Rename failed: {} - {}", item.source.path.display(), e);
                    item.outcome = Outcome::Failed(e);
                }
            }
            pb.inc(1);
        }

        // Phase 2: conversions on a bounded worker pool
        if !conversions.is_empty() {
            if let Some(settings) = plan.conversion.clone() {
                let converter = ImageConverter::new(settings);
                let jobs: Vec<ConvertJob> = conversions
                    .iter()
                    .map(|&idx| ConvertJob::from_item(idx, &plan.items[idx]))
                    .collect();

                tracing::info!(
                    "Converting {} images ({} at a time)",
                    jobs.len(),
                    self.config.convert_concurrency.max(1)
                );

                let results: Vec<(usize, std::result::Result<ReversalEntry, String>)> =
                    stream::iter(jobs)
                        .map(|job| {
                            let converter = converter.clone();
                            async move {
                                let idx = job.idx;
                                let result = tokio::task::spawn_blocking(move || job.run(&converter))
                                    .await
                                    .unwrap_or_else(|e| Err(format!("conversion task failed: {}", e)));
                                (idx, result)
                            }
                        })
                        .buffer_unordered(self.config.convert_concurrency.max(1))
                        .collect()
                        .await;

                for (idx, result) in results {
                    let item = &mut plan.items[idx];
                    pb.set_message(item.original_name());
                    match result {
                        Ok(entry) => {
                            entries.push((idx, entry));
                            item.outcome = Outcome::Succeeded;
                        }
                        Err(e) => {
                            tracing::error!(
                                "Conversion failed: {} - {}",
                                item.source.path.display(),
                                e
                            );
                            item.outcome = Outcome::Failed(e);
                        }
                    }
                    pb.inc(1);
                }
            }
        }

        pb.finish_and_clear();

        let summary = plan.summary();
        let undo_record = build_record(entries, &summary);

        tracing::info!(
            "Batch finished: {} succeeded ({} converted), {} skipped, {} failed, {} unchanged",
            summary.succeeded,
            summary.converted,
            summary.skipped,
            summary.failed,
            summary.unchanged
        );

        Ok(BatchReport {
            summary,
            undo_record,
        })
    }

    /// Validate a plan before execution.
    ///
    /// Only structural problems abort the batch; missing files fail per item.
    pub fn validate(&self, plan: &Plan) -> Result<()> {
        let has_conversions = plan
            .items
            .iter()
            .any(|i| i.kind == OperationKind::Convert && i.outcome.is_pending());
        if has_conversions && plan.conversion.is_none() {
            return Err(crate::Error::InvalidPlanFile(
                "plan contains conversions but no conversion settings".to_string(),
            ));
        }
        Ok(())
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute a plan (convenience function).
pub async fn execute_plan(plan: &mut Plan) -> Result<BatchReport> {
    let executor = Executor::new();
    executor.execute(plan).await
}

/// Rename one item.
fn rename_item(item: &PlannedOperation) -> std::result::Result<ReversalEntry, String> {
    let from = &item.source.path;
    let to = &item.target;

    ensure_target_free(to, item.decision)?;
    fs::rename(from, to).map_err(|e| describe_io_error(&e, from))?;
    tracing::debug!("Renamed: {:?} -> {:?}", from, to);

    Ok(ReversalEntry {
        seq: 0,
        previous_path: from.clone(),
        current_path: to.clone(),
        action: ReversalAction::Rename,
        reversible: item.decision == Decision::Proceed,
    })
}

/// A conversion handed to a worker.
struct ConvertJob {
    idx: usize,
    source: PathBuf,
    target: PathBuf,
    decision: Decision,
}

impl ConvertJob {
    fn from_item(idx: usize, item: &PlannedOperation) -> Self {
        Self {
            idx,
            source: item.source.path.clone(),
            target: item.target.clone(),
            decision: item.decision,
        }
    }

    fn run(self, converter: &ImageConverter) -> std::result::Result<ReversalEntry, String> {
        if !self.source.exists() {
            return Err(format!("source not found: {}", self.source.display()));
        }
        ensure_target_free(&self.target, self.decision)?;

        converter
            .convert(&self.source, &self.target)
            .map_err(|e| e.to_string())?;

        // Replacing an existing target loses its bytes, so nothing is fully reversible then.
        let restorable = self.decision == Decision::Proceed;

        let (action, reversible) = if converter.settings().keep_original {
            (ReversalAction::RemoveCopy, restorable)
        } else {
            match fs::remove_file(&self.source) {
                Ok(()) => (ReversalAction::Rename, false),
                Err(e) => {
                    tracing::warn!(
                        "Converted but could not remove original {:?}: {}",
                        self.source,
                        e
                    );
                    (ReversalAction::RemoveCopy, restorable)
                }
            }
        };

        Ok(ReversalEntry {
            seq: 0,
            previous_path: self.source,
            current_path: self.target,
            action,
            reversible,
        })
    }
}

/// Refuse to clobber a target that appeared after planning.
fn ensure_target_free(target: &Path, decision: Decision) -> std::result::Result<(), String> {
    if decision == Decision::Proceed && path_occupied(target) {
        return Err(format!(
            "target appeared after planning: {}",
            target.display()
        ));
    }
    Ok(())
}

/// Assemble the undo record in plan order.
fn build_record(
    mut entries: Vec<(usize, ReversalEntry)>,
    summary: &BatchSummary,
) -> Option<UndoRecord> {
    if entries.is_empty() {
        return None;
    }

    entries.sort_by_key(|(idx, _)| *idx);
    let entries: Vec<ReversalEntry> = entries
        .into_iter()
        .enumerate()
        .map(|(seq, (_, mut entry))| {
            entry.seq = seq as u32 + 1;
            entry
        })
        .collect();

    let mut description = format!("Renamed {} files", summary.succeeded);
    if summary.converted > 0 {
        description.push_str(&format!(" ({} converted)", summary.converted));
    }

    Some(UndoRecord {
        version: UNDO_VERSION.to_string(),
        batch_id: Uuid::new_v4().to_string(),
        executed_at: Local::now().to_rfc3339(),
        description,
        entries,
    })
}
