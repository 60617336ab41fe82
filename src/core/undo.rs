//! Undo management module.
//!
//! Keeps a stack of executed batches and reverses the most recent one:
//! - rename files back to their previous names
//! - delete converted copies whose originals were kept
//!
//! Entries are reversed in the opposite order of execution. A failing entry
//! is reported and the rest are still attempted.

use crate::models::undo::{ReversalAction, ReversalEntry, UndoRecord};
use crate::utils::fs::{describe_io_error, path_occupied};
use crate::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stack of executed batches.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UndoManager {
    records: Vec<UndoRecord>,
    #[serde(skip)]
    max_depth: Option<usize>,
}

impl UndoManager {
    /// Create an empty, unbounded manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager keeping at most `max_depth` batches.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            records: Vec::new(),
            max_depth: Some(max_depth.max(1)),
        }
    }

    /// Limit the stack depth, dropping the oldest records if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = Some(max_depth.max(1));
        self.trim();
    }

    /// Push the record of a completed batch.
    pub fn push(&mut self, record: UndoRecord) {
        tracing::debug!(
            "Pushed undo record {} ({} entries)",
            record.batch_id,
            record.entries.len()
        );
        self.records.push(record);
        self.trim();
    }

    /// Most recent record without removing it.
    pub fn peek(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    /// Records, oldest first.
    pub fn records(&self) -> &[UndoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Pop the most recent record and reverse it.
    pub fn undo_last(&mut self) -> Result<UndoReport> {
        let record = self.records.pop().ok_or(crate::Error::EmptyUndoStack)?;
        tracing::info!(
            "Undoing batch {} ({} entries): {}",
            record.batch_id,
            record.entries.len(),
            record.description
        );

        let mut report = UndoReport {
            description: record.description.clone(),
            ..Default::default()
        };

        for entry in record.entries.iter().rev() {
            let status = reverse_entry(entry);
            if status.is_failure() {
                tracing::warn!(
                    "Undo failed for {}: {}",
                    entry.current_path.display(),
                    status
                );
                report.failed += 1;
            } else if status == UndoStatus::NameOnly {
                report.name_only += 1;
            } else {
                report.restored += 1;
            }
            report.results.push(UndoEntryResult {
                entry: entry.clone(),
                status,
            });
        }

        Ok(report)
    }

    /// Load a persisted stack. A missing file yields an empty stack.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let manager: UndoManager = serde_json::from_str(&content)?;
        Ok(manager)
    }

    /// Persist the stack to a JSON file.
    ///
    /// The file is replaced atomically, so an interrupted save leaves the
    /// previous history intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = temp_path_for(path);
        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp, path)
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::info!("Undo history saved to {:?}", path);
        Ok(())
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_depth {
            if self.records.len() > max {
                let excess = self.records.len() - max;
                self.records.drain(..excess);
            }
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

/// Reverse one entry.
fn reverse_entry(entry: &ReversalEntry) -> UndoStatus {
    let current = &entry.current_path;

    if !path_occupied(current) {
        return UndoStatus::Missing;
    }

    match entry.action {
        ReversalAction::RemoveCopy => match fs::remove_file(current) {
            Ok(()) => {
                tracing::debug!("Removed converted copy: {:?}", current);
                UndoStatus::Removed
            }
            Err(e) => UndoStatus::Failed(describe_io_error(&e, current)),
        },
        ReversalAction::Rename => {
            let previous = &entry.previous_path;
            if path_occupied(previous) {
                return UndoStatus::Blocked;
            }
            match fs::rename(current, previous) {
                Ok(()) => {
                    tracing::debug!("Moved back: {:?} -> {:?}", current, previous);
                    if entry.reversible {
                        UndoStatus::Restored
                    } else {
                        UndoStatus::NameOnly
                    }
                }
                Err(e) => UndoStatus::Failed(describe_io_error(&e, current)),
            }
        }
    }
}

/// Outcome of reversing one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoStatus {
    /// Name and content are back to their pre-batch state.
    Restored,
    /// Name restored, but the file still holds the converted bytes.
    NameOnly,
    /// Converted copy deleted; the kept original is untouched.
    Removed,
    /// The file to reverse no longer exists.
    Missing,
    /// The previous path is occupied by another file.
    Blocked,
    /// The filesystem call failed.
    Failed(String),
}

impl UndoStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            UndoStatus::Missing | UndoStatus::Blocked | UndoStatus::Failed(_)
        )
    }
}

impl std::fmt::Display for UndoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndoStatus::Restored => write!(f, "restored"),
            UndoStatus::NameOnly => write!(f, "name restored, content remains converted"),
            UndoStatus::Removed => write!(f, "converted copy removed"),
            UndoStatus::Missing => write!(f, "file no longer exists"),
            UndoStatus::Blocked => write!(f, "original location occupied"),
            UndoStatus::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// Result for a single entry.
#[derive(Debug, Clone)]
pub struct UndoEntryResult {
    pub entry: ReversalEntry,
    pub status: UndoStatus,
}

impl UndoEntryResult {
    /// The error behind a failed entry, if any.
    pub fn error(&self) -> Option<crate::Error> {
        let path = self.entry.current_path.display().to_string();
        match &self.status {
            UndoStatus::Missing => Some(crate::Error::UndoEntryMissing(path)),
            UndoStatus::Blocked => Some(crate::Error::other(format!(
                "{}: {} is occupied",
                path,
                self.entry.previous_path.display()
            ))),
            UndoStatus::Failed(reason) => Some(crate::Error::other(reason.clone())),
            _ => None,
        }
    }
}

/// Result of an undo.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Description of the reversed batch.
    pub description: String,
    /// Per-entry results, in reversal order.
    pub results: Vec<UndoEntryResult>,
    /// Entries fully restored.
    pub restored: usize,
    /// Entries whose name was restored but not their content.
    pub name_only: usize,
    /// Entries that could not be reversed.
    pub failed: usize,
}

impl UndoReport {
    /// Check if every entry was reversed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Check if every entry was restored completely.
    pub fn is_full_restore(&self) -> bool {
        self.failed == 0 && self.name_only == 0
    }

    /// Print summary.
    pub fn print_summary(&self) {
        println!("{}", "[Undo Summary]".bold().green());
        println!("  {} {}", "Batch:".bold(), self.description);
        println!("  {} {}", "Restored:".bold(), self.restored);
        println!("  {} {}", "Name only:".bold(), self.name_only);
        println!("  {} {}", "Failed:".bold(), self.failed);

        if self.name_only > 0 {
            println!();
            println!(
                "{}",
                "[NOTE] Converted files got their old names back but keep the converted format."
                    .yellow()
            );
        }

        let errors: Vec<_> = self.results.iter().filter_map(|r| r.error()).collect();
        if !errors.is_empty() {
            println!();
            println!("{}", "[Errors]".bold().red());
            for error in errors {
                println!("  - {}", error);
            }
        }
    }
}
