//! Directory scanner module.
//!
//! Collects the source files of a batch: files matching a set of glob
//! patterns (or a named preset), optionally narrowed by a name search.

use crate::models::file::SourceFile;
use crate::utils::fs::ensure_directory;
use crate::Result;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

/// Named pattern presets.
pub const EXTENSION_PRESETS: &[(&str, &[&str])] = &[
    (
        "images",
        &["*.jpg", "*.jpeg", "*.png", "*.gif", "*.bmp", "*.tiff", "*.webp", "*.svg", "*.ico"],
    ),
    (
        "documents",
        &[
            "*.pdf", "*.doc", "*.docx", "*.txt", "*.rtf", "*.odt", "*.xls", "*.xlsx", "*.csv",
            "*.ppt", "*.pptx",
        ],
    ),
    (
        "audio",
        &["*.mp3", "*.wav", "*.ogg", "*.flac", "*.m4a", "*.wma", "*.aac", "*.opus"],
    ),
    (
        "video",
        &["*.mp4", "*.avi", "*.mov", "*.wmv", "*.flv", "*.mkv", "*.webm", "*.m4v", "*.3gp"],
    ),
    (
        "code",
        &["*.py", "*.js", "*.html", "*.css", "*.cpp", "*.c", "*.java", "*.php", "*.rb", "*.go", "*.rs"],
    ),
    ("archives", &["*.zip", "*.rar", "*.7z", "*.tar", "*.gz", "*.bz2", "*.xz"]),
    ("all", &["*"]),
];

/// Look up a preset's patterns by name (case-insensitive).
pub fn preset_patterns(name: &str) -> Option<&'static [&'static str]> {
    let name = name.to_lowercase();
    EXTENSION_PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, patterns)| *patterns)
}

/// Scanner configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Glob patterns matched against file names.
    pub patterns: Vec<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Keep only names containing this text.
    pub search: Option<String>,
    /// Match `search` case-sensitively.
    pub case_sensitive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["*".to_string()],
            recursive: true,
            search: None,
            case_sensitive: false,
        }
    }
}

impl ScanConfig {
    /// Configuration for a named preset.
    pub fn from_preset(name: &str) -> Option<Self> {
        preset_patterns(name).map(|patterns| Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        })
    }

    /// Configuration for a comma-separated list of patterns, e.g. `"*.jpg, *.png"`.
    pub fn from_pattern_list(list: &str) -> Self {
        let patterns: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        if patterns.is_empty() {
            return Self::default();
        }
        Self {
            patterns,
            ..Default::default()
        }
    }
}

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Matching files, sorted by lowercase name.
    pub files: Vec<SourceFile>,
    /// Total files visited.
    pub total_files_scanned: usize,
}

/// Translate a glob (`*`, `?`) into an anchored, case-insensitive regex.
fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::from("(?i)^");
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| crate::Error::other(format!("invalid pattern '{}': {}", glob, e)))
}

fn matches_search(name: &str, search: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        name.contains(search)
    } else {
        name.to_lowercase().contains(&search.to_lowercase())
    }
}

/// Scan a directory for files matching `config`.
pub fn scan_directory(path: &Path, config: &ScanConfig) -> Result<ScanResult> {
    ensure_directory(path)?;

    let matchers = config
        .patterns
        .iter()
        .map(|p| glob_to_regex(p))
        .collect::<Result<Vec<_>>>()?;
    let search = config.search.as_deref().filter(|s| !s.is_empty());

    let mut walker = WalkDir::new(path).follow_links(false);
    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut result = ScanResult::default();

    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        result.total_files_scanned += 1;

        let name = entry.file_name().to_string_lossy();
        if !matchers.iter().any(|m| m.is_match(&name)) {
            continue;
        }
        if let Some(search) = search {
            if !matches_search(&name, search, config.case_sensitive) {
                continue;
            }
        }

        match SourceFile::snapshot(entry.path()) {
            Ok(file) => result.files.push(file),
            Err(e) => tracing::warn!("Failed to read file {:?}: {}", entry.path(), e),
        }
    }

    result
        .files
        .sort_by_cached_key(|f| (f.file_name().to_lowercase(), f.path.clone()));

    tracing::info!(
        "Scanned {} files in {:?}: {} matched",
        result.total_files_scanned,
        path,
        result.files.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("*.jpg").unwrap();
        assert!(re.is_match("photo.jpg"));
        assert!(re.is_match("PHOTO.JPG"));
        assert!(!re.is_match("photo.jpg.bak"));
        assert!(!re.is_match("photojpg"));

        let re = glob_to_regex("img_??.png").unwrap();
        assert!(re.is_match("img_01.png"));
        assert!(!re.is_match("img_001.png"));
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let re = glob_to_regex("a+b(1).txt").unwrap();
        assert!(re.is_match("a+b(1).txt"));
        assert!(!re.is_match("aab1.txt"));
    }

    #[test]
    fn test_preset_lookup() {
        assert!(preset_patterns("Images").unwrap().contains(&"*.png"));
        assert_eq!(preset_patterns("all").unwrap(), &["*"]);
        assert!(preset_patterns("unknown").is_none());
    }

    #[test]
    fn test_pattern_list_parsing() {
        let config = ScanConfig::from_pattern_list("*.jpg, *.png ,,");
        assert_eq!(config.patterns, vec!["*.jpg", "*.png"]);

        let config = ScanConfig::from_pattern_list("  ");
        assert_eq!(config.patterns, vec!["*"]);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("Holiday.jpg", "holiday", false));
        assert!(!matches_search("Holiday.jpg", "holiday", true));
        assert!(matches_search("Holiday.jpg", "Holi", true));
    }

    // Directory scans are covered in tests/scanner_tests.rs
}
