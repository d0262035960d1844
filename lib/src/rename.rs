//! Deriving fingerprinted file names and relocating files to them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CachetError, Result};

/// The file name `path` takes after fingerprinting:
/// `{stem}{separator}{short_hash}{extension}`.
///
/// The extension is preserved; a file without one gets the suffix
/// appended to the whole name.
///
/// ## Examples
///
/// ```rust
/// use std::path::Path;
/// use cachet_lib::rename::hashed_file_name;
///
/// assert_eq!(hashed_file_name(Path::new("js/app.js"), "5017e000", "-"), "app-5017e000.js");
/// assert_eq!(hashed_file_name(Path::new("LICENSE"), "5017e000", "-"), "LICENSE-5017e000");
/// ```
pub fn hashed_file_name(path: &Path, short_hash: &str, separator: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem}{separator}{short_hash}.{}", ext.to_string_lossy()),
        None => format!("{stem}{separator}{short_hash}"),
    }
}

/// Whether the file name already contains `short_hash`.
///
/// A name carrying the freshly computed hash signals the file was already
/// processed by an earlier run; renaming it again would stack hashes.
pub fn already_hashed(path: &Path, short_hash: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(short_hash))
        .unwrap_or(false)
}

/// Renames `path` to its fingerprinted name within the same directory and
/// returns the new path.
///
/// Fails with [`CachetError::AlreadyHashed`] when the current name
/// already contains `short_hash`; the caller decides whether that aborts
/// the run.
pub fn rename_with_hash(path: &Path, short_hash: &str, separator: &str) -> Result<PathBuf> {
    if already_hashed(path, short_hash) {
        return Err(CachetError::AlreadyHashed {
            path: path.to_path_buf(),
            hash: short_hash.to_string(),
        });
    }

    let new_path = path.with_file_name(hashed_file_name(path, short_hash, separator));
    fs::rename(path, &new_path).map_err(|source| CachetError::io(path, source))?;
    debug!(from = %path.display(), to = %new_path.display(), "renamed");
    Ok(new_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_name_keeps_directory_out() {
        assert_eq!(
            hashed_file_name(Path::new("public/js/app.js"), "abc12345", "-"),
            "app-abc12345.js"
        );
    }

    #[test]
    fn hashed_name_respects_separator() {
        assert_eq!(
            hashed_file_name(Path::new("app.js"), "abc12345", "."),
            "app.abc12345.js"
        );
    }

    #[test]
    fn hashed_name_without_extension() {
        assert_eq!(
            hashed_file_name(Path::new("js/Makefile"), "abc12345", "-"),
            "Makefile-abc12345"
        );
    }

    #[test]
    fn detects_already_hashed_names() {
        assert!(already_hashed(Path::new("js/app-abc12345.js"), "abc12345"));
        assert!(!already_hashed(Path::new("js/app.js"), "abc12345"));
    }

    #[test]
    fn hash_in_directory_name_does_not_count() {
        assert!(!already_hashed(Path::new("abc12345/app.js"), "abc12345"));
    }

    #[test]
    fn rename_moves_file_within_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        fs::write(&path, "define(\"app\", [], function(){});").unwrap();

        let new_path = rename_with_hash(&path, "5017e000", "-").unwrap();

        assert_eq!(new_path, dir.path().join("app-5017e000.js"));
        assert!(!path.exists());
        assert!(new_path.exists());
    }

    #[test]
    fn rename_refuses_already_hashed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-5017e000.js");
        fs::write(&path, "content").unwrap();

        let err = rename_with_hash(&path, "5017e000", "-").unwrap_err();
        assert!(matches!(err, CachetError::AlreadyHashed { .. }));
        // untouched on failure
        assert!(path.exists());
    }

    #[test]
    fn rename_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            rename_with_hash(&dir.path().join("ghost.js"), "5017e000", "-").unwrap_err();
        assert!(matches!(err, CachetError::Io { .. }));
    }
}
