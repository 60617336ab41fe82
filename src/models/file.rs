//! Source file data model.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Snapshot of a file taken once per planning pass.
///
/// Later changes on disk are not observed until the next pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modified time.
    pub modified: DateTime<Utc>,
}

impl SourceFile {
    /// Stat a file and capture its snapshot.
    pub fn snapshot(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::path::absolute(path)?
        };

        Ok(Self {
            path,
            size: metadata.len(),
            modified,
        })
    }

    /// File name without directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Extension without the leading dot, as written on disk.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Extension including the leading dot, or empty.
    pub fn suffix(&self) -> String {
        match self.extension() {
            ext if ext.is_empty() => String::new(),
            ext => format!(".{}", ext),
        }
    }

    /// Name of the directory holding the file.
    pub fn parent_name(&self) -> String {
        self.path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Directory holding the file.
    pub fn parent_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            size: 10,
            modified: Utc::now(),
        }
    }

    #[test]
    fn test_name_parts() {
        let file = sample("/photos/trip/IMG_0001.JPG");
        assert_eq!(file.file_name(), "IMG_0001.JPG");
        assert_eq!(file.stem(), "IMG_0001");
        assert_eq!(file.extension(), "JPG");
        assert_eq!(file.suffix(), ".JPG");
        assert_eq!(file.parent_name(), "trip");
    }

    #[test]
    fn test_no_extension() {
        let file = sample("/docs/README");
        assert_eq!(file.extension(), "");
        assert_eq!(file.suffix(), "");
        assert_eq!(file.stem(), "README");
    }

    #[test]
    fn test_snapshot_reads_size() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let file = SourceFile::snapshot(&path).unwrap();
        assert_eq!(file.size, 5);
        assert_eq!(file.path, path);
    }
}
