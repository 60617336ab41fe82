//! Conflict resolution for planned targets.
//!
//! Decides per item whether it may proceed, must be skipped, or needs no change.
//! Targets are checked against a running set of claimed paths seeded from the
//! disk listing, so earlier items in the same batch win over later ones.

use crate::models::file::SourceFile;
use crate::models::plan::{ConflictPolicy, Decision};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Decide for a single target against a set of occupied paths.
pub fn resolve(target: &Path, source: &Path, existing: &HashSet<PathBuf>) -> Decision {
    if target == source {
        Decision::NoChange
    } else if existing.contains(target) {
        Decision::SkipExists
    } else {
        Decision::Proceed
    }
}

/// Stateful resolver that claims targets as it goes.
#[derive(Debug, Default)]
pub struct ConflictResolver {
    policy: ConflictPolicy,
    /// Paths present on disk when planning started.
    on_disk: HashSet<PathBuf>,
    /// Sources of the current batch.
    sources: HashSet<PathBuf>,
    /// Targets already assigned in this plan.
    claimed: HashSet<PathBuf>,
}

impl ConflictResolver {
    /// Create a resolver from an explicit disk listing.
    pub fn new(policy: ConflictPolicy, on_disk: HashSet<PathBuf>, sources: &[SourceFile]) -> Self {
        Self {
            policy,
            on_disk,
            sources: sources.iter().map(|s| s.path.clone()).collect(),
            claimed: HashSet::new(),
        }
    }

    /// Create a resolver seeded from the directories holding `sources`.
    pub fn from_disk(policy: ConflictPolicy, sources: &[SourceFile]) -> Result<Self> {
        let dirs: HashSet<PathBuf> = sources.iter().map(|s| s.parent_dir()).collect();
        let mut on_disk = HashSet::new();
        for dir in dirs {
            on_disk.extend(list_dir(&dir)?);
        }
        tracing::debug!("Conflict set seeded with {} existing paths", on_disk.len());
        Ok(Self::new(policy, on_disk, sources))
    }

    /// Decide for `target` and claim it when the item will run.
    pub fn resolve(&mut self, target: &Path, source: &Path) -> Decision {
        let decision = if target == source {
            Decision::NoChange
        } else if self.claimed.contains(target) || self.sources.contains(target) {
            Decision::SkipExists
        } else if self.on_disk.contains(target) {
            match self.policy {
                ConflictPolicy::Skip => Decision::SkipExists,
                ConflictPolicy::Overwrite => Decision::Overwrite,
            }
        } else {
            Decision::Proceed
        };

        if decision != Decision::SkipExists {
            self.claimed.insert(target.to_path_buf());
        }
        decision
    }

    /// Targets claimed so far.
    pub fn claimed(&self) -> &HashSet<PathBuf> {
        &self.claimed
    }
}

/// List the entries of a directory as full paths.
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        paths.push(entry?.path());
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn source(path: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            size: 0,
            modified: Utc::now(),
        }
    }

    fn set(paths: &[&str]) -> HashSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_resolve_pure() {
        let existing = set(&["/d/taken.txt"]);
        assert_eq!(
            resolve(Path::new("/d/a.txt"), Path::new("/d/a.txt"), &existing),
            Decision::NoChange
        );
        assert_eq!(
            resolve(Path::new("/d/taken.txt"), Path::new("/d/a.txt"), &existing),
            Decision::SkipExists
        );
        assert_eq!(
            resolve(Path::new("/d/free.txt"), Path::new("/d/a.txt"), &existing),
            Decision::Proceed
        );
    }

    #[test]
    fn test_lower_position_wins() {
        let sources = vec![source("/d/a.txt"), source("/d/b.txt")];
        let mut resolver =
            ConflictResolver::new(ConflictPolicy::Skip, set(&["/d/a.txt", "/d/b.txt"]), &sources);

        let target = Path::new("/d/same.txt");
        assert_eq!(resolver.resolve(target, Path::new("/d/a.txt")), Decision::Proceed);
        assert_eq!(resolver.resolve(target, Path::new("/d/b.txt")), Decision::SkipExists);
        assert!(resolver.claimed().contains(target));
    }

    #[test]
    fn test_existing_on_disk_skipped() {
        let sources = vec![source("/d/x.txt")];
        let mut resolver = ConflictResolver::new(
            ConflictPolicy::Skip,
            set(&["/d/x.txt", "/d/file_001.txt"]),
            &sources,
        );
        assert_eq!(
            resolver.resolve(Path::new("/d/file_001.txt"), Path::new("/d/x.txt")),
            Decision::SkipExists
        );
    }

    #[test]
    fn test_overwrite_policy() {
        let sources = vec![source("/d/x.txt"), source("/d/y.txt")];
        let mut resolver = ConflictResolver::new(
            ConflictPolicy::Overwrite,
            set(&["/d/x.txt", "/d/y.txt", "/d/old.txt"]),
            &sources,
        );

        // Unrelated file on disk may be replaced.
        assert_eq!(
            resolver.resolve(Path::new("/d/old.txt"), Path::new("/d/x.txt")),
            Decision::Overwrite
        );
        // A claimed target or another batch source never is.
        assert_eq!(
            resolver.resolve(Path::new("/d/old.txt"), Path::new("/d/y.txt")),
            Decision::SkipExists
        );
        assert_eq!(
            resolver.resolve(Path::new("/d/x.txt"), Path::new("/d/y.txt")),
            Decision::SkipExists
        );
    }

    #[test]
    fn test_from_disk_lists_parent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(temp_dir.path().join("file_001.txt"), "x").unwrap();

        let sources = vec![SourceFile::snapshot(&a).unwrap()];
        let mut resolver = ConflictResolver::from_disk(ConflictPolicy::Skip, &sources).unwrap();
        assert_eq!(
            resolver.resolve(&temp_dir.path().join("file_001.txt"), &a),
            Decision::SkipExists
        );
        assert_eq!(
            resolver.resolve(&temp_dir.path().join("file_002.txt"), &a),
            Decision::Proceed
        );
    }
}
