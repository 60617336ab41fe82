//! Plan data model.

use super::conversion::ConversionSettings;
use super::file::SourceFile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Plan file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Plan version.
    pub version: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Naming template the targets were expanded from.
    pub template: String,
    /// First sequence number.
    pub start_number: u64,
    /// Conversion settings, if image conversion is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionSettings>,
    /// How existing targets on disk were treated.
    pub conflict_policy: ConflictPolicy,
    /// Planned operations, in input order.
    pub items: Vec<PlannedOperation>,
}

impl Plan {
    /// Count of items that will touch the filesystem.
    pub fn actionable(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.decision.is_actionable())
            .count()
    }

    /// Aggregate outcome counts.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_items(&self.items)
    }
}

/// A single planned rename or conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedOperation {
    /// 1-based position in the plan.
    pub position: usize,
    /// Sequence counter value used for this file.
    pub sequence: u64,
    /// Source file snapshot.
    pub source: SourceFile,
    /// Computed target path. Fixed once planned.
    pub target: PathBuf,
    /// Rename or convert.
    pub kind: OperationKind,
    /// Conflict decision made during planning.
    pub decision: Decision,
    /// Execution outcome.
    pub outcome: Outcome,
}

impl PlannedOperation {
    /// Original file name for display.
    pub fn original_name(&self) -> String {
        self.source.file_name()
    }

    /// New file name for display.
    pub fn new_name(&self) -> String {
        self.target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Kind of filesystem operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Rename,
    Convert,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Rename => write!(f, "rename"),
            OperationKind::Convert => write!(f, "convert"),
        }
    }
}

/// What to do when a target already exists on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the existing file alone and skip the item.
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
}

/// Conflict resolution for one planned target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Target is free.
    Proceed,
    /// Target exists on disk and the caller opted into replacing it.
    Overwrite,
    /// Target exists or was claimed by an earlier item.
    SkipExists,
    /// Target equals source.
    NoChange,
}

impl Decision {
    /// Whether executing this item touches the filesystem.
    pub fn is_actionable(self) -> bool {
        matches!(self, Decision::Proceed | Decision::Overwrite)
    }
}

/// Execution outcome of a planned operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Skipped(String),
    Succeeded,
    Failed(String),
    NoChange,
}

impl Outcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "Ready",
            Outcome::Skipped(_) => "Skipped",
            Outcome::Succeeded => "Done",
            Outcome::Failed(_) => "Error",
            Outcome::NoChange => "No change",
        }
    }
}

/// Aggregate counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items that succeeded (renames and conversions).
    pub succeeded: usize,
    /// Succeeded items that were conversions.
    pub converted: usize,
    /// Items skipped because of a conflict.
    pub skipped: usize,
    /// Items that failed.
    pub failed: usize,
    /// Items whose name did not change.
    pub unchanged: usize,
}

impl BatchSummary {
    /// Tally outcomes of planned operations.
    pub fn from_items(items: &[PlannedOperation]) -> Self {
        let mut summary = Self::default();
        for item in items {
            match item.outcome {
                Outcome::Succeeded => {
                    summary.succeeded += 1;
                    if item.kind == OperationKind::Convert {
                        summary.converted += 1;
                    }
                }
                Outcome::Skipped(_) => summary.skipped += 1,
                Outcome::Failed(_) => summary.failed += 1,
                Outcome::NoChange => summary.unchanged += 1,
                Outcome::Pending => {}
            }
        }
        summary
    }

    /// Check if no item failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(kind: OperationKind, outcome: Outcome) -> PlannedOperation {
        PlannedOperation {
            position: 1,
            sequence: 1,
            source: SourceFile {
                path: PathBuf::from("/tmp/a.txt"),
                size: 0,
                modified: Utc::now(),
            },
            target: PathBuf::from("/tmp/b.txt"),
            kind,
            decision: Decision::Proceed,
            outcome,
        }
    }

    #[test]
    fn test_summary_counts() {
        let items = vec![
            item(OperationKind::Rename, Outcome::Succeeded),
            item(OperationKind::Convert, Outcome::Succeeded),
            item(OperationKind::Rename, Outcome::Skipped("exists".into())),
            item(OperationKind::Rename, Outcome::Failed("denied".into())),
            item(OperationKind::Rename, Outcome::NoChange),
        ];
        let summary = BatchSummary::from_items(&items);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.converted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.unchanged, 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_outcome_serde_shape() {
        let json = serde_json::to_string(&Outcome::Failed("boom".into())).unwrap();
        assert_eq!(json, r#"{"status":"failed","detail":"boom"}"#);
        let back: Outcome = serde_json::from_str(r#"{"status":"no_change"}"#).unwrap();
        assert_eq!(back, Outcome::NoChange);
    }

    #[test]
    fn test_display_names() {
        let op = item(OperationKind::Rename, Outcome::Pending);
        assert_eq!(op.original_name(), "a.txt");
        assert_eq!(op.new_name(), "b.txt");
        assert!(op.outcome.is_pending());
    }
}
