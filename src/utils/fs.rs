//! File system utilities.

use crate::Result;
use std::io::ErrorKind;
use std::path::Path;

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Whether anything (including a dangling symlink) occupies `path`.
pub fn path_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Turn an I/O error from a rename into a readable per-item message.
pub fn describe_io_error(err: &std::io::Error, path: &Path) -> String {
    let reason = match err.kind() {
        ErrorKind::NotFound => "not found",
        ErrorKind::PermissionDenied => "permission denied",
        ErrorKind::CrossesDevices => "cannot move across devices",
        ErrorKind::InvalidFilename => "file name too long or invalid",
        ErrorKind::AlreadyExists => "already exists",
        _ => return format!("{}: {}", path.display(), err),
    };
    format!("{}: {}", path.display(), reason)
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_ensure_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(ensure_directory(temp_dir.path()).is_ok());

        let file = temp_dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_directory(&file),
            Err(crate::Error::NotADirectory(_))
        ));
        assert!(matches!(
            ensure_directory(&PathBuf::from("/nonexistent/dir")),
            Err(crate::Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_describe_io_error() {
        let err = std::io::Error::from(ErrorKind::PermissionDenied);
        assert_eq!(
            describe_io_error(&err, Path::new("/x/a.txt")),
            "/x/a.txt: permission denied"
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
