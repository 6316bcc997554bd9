//! Atomic file writes and source loading.
//!
//! ## `atomic_write`
//!
//! 1. Compare the new content with what is on disk; skip if identical.
//! 2. In dry-run mode, stop and report what would happen.
//! 3. Write to `<path>.i18ntool.tmp`.
//! 4. Rename to the final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File already holds exactly this content.
    Unchanged { path: PathBuf },
    /// `--dryRun`: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Sibling temp file used while writing `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.i18ntool.tmp", path.display()))
}

/// Atomically replace `path` with `content`.
///
/// A failed write never leaves a partially written target behind.
pub fn atomic_write(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, SyncError> {
    atomic_write_with_tmp(path, content, dry_run, &tmp_path(path))
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if read_if_exists(path)?.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// File content, or `None` if the file does not exist.
pub fn read_if_exists(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Read the canonical source file; a missing file is [`SyncError::SourceNotFound`].
pub fn read_source(path: &Path) -> Result<String, SyncError> {
    read_if_exists(path)?.ok_or_else(|| SyncError::SourceNotFound {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.de.xlf");
        let result = atomic_write(&path, "hello", false).unwrap();
        assert_eq!(result, WriteResult::Written { path: path.clone() });
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn identical_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.de.xlf");
        atomic_write(&path, "same", false).unwrap();
        let result = atomic_write(&path, "same", false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn unchanged_write_keeps_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.de.xlf");
        atomic_write(&path, "same", false).unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        atomic_write(&path, "same", false).unwrap();
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after, "identical content must not be rewritten");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.xlf");
        let result = atomic_write(&path, "content", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.xlf");
        atomic_write(&path, "data", false).unwrap();
        assert!(!tmp_path(&path).exists(), ".i18ntool.tmp must be cleaned up");
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("src").join("locale").join("messages.fr.xlf");
        atomic_write(&path, "content", false).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_source_is_reported_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.xlf");
        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, SyncError::SourceNotFound { path: ref p } if p == &path));
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("messages.de.xlf");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp = tmp_dir.path().join("messages.de.xlf.i18ntool.tmp");

        let result = atomic_write_with_tmp(&path, "new content", false, &tmp);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions; only assert when the rename failed.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp.exists(), ".i18ntool.tmp should be cleaned up");
        }
    }
}
