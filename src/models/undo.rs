//! Undo data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Record of one executed batch, enough to reverse it.
///
/// Built once after execution and never modified afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UndoRecord {
    /// Record version.
    pub version: String,
    /// Unique batch ID.
    pub batch_id: String,
    /// Execution timestamp.
    pub executed_at: String,
    /// Human readable description.
    pub description: String,
    /// Entries in plan order.
    pub entries: Vec<ReversalEntry>,
}

impl UndoRecord {
    /// Number of entries that can only restore the file name.
    pub fn name_only_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.reversible).count()
    }

    /// Whether reversing this record restores every file completely.
    pub fn is_fully_reversible(&self) -> bool {
        self.entries.iter().all(|e| e.reversible)
    }
}

/// A single reversible step of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalEntry {
    /// Sequence number in plan order.
    pub seq: u32,
    /// Path before the batch ran.
    pub previous_path: PathBuf,
    /// Path after the batch ran.
    pub current_path: PathBuf,
    /// How to undo this step.
    pub action: ReversalAction,
    /// Whether undoing restores both the name and the original bytes.
    pub reversible: bool,
}

/// Action taken to reverse an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversalAction {
    /// Rename `current_path` back to `previous_path`.
    Rename,
    /// Delete `current_path`; the original was kept in place.
    RemoveCopy,
}
