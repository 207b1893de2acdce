//! Removal of rendered and auxiliary build files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BuildError;

/// Extensions removed by [`clean`], appended to the artifact stem.
pub const AUX_EXTENSIONS: &[&str] = &[
    "tex",
    "pdf",
    "aux",
    "log",
    "out",
    "fls",
    "fdb_latexmk",
    "xdv",
    "synctex.gz",
    "engine.log",
];

/// Deletes `<out_dir>/<stem>.<ext>` for every known extension.
///
/// Files that do not exist are skipped, as is a missing `out_dir`. Returns
/// the paths that were removed.
pub fn clean(out_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, BuildError> {
    if !out_dir.is_dir() {
        debug!(dir = %out_dir.display(), "nothing to clean");
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    for ext in AUX_EXTENSIONS {
        let path = out_dir.join(format!("{}.{}", stem, ext));
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                removed.push(path);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(BuildError::Io { path, source }),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_known_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cv.tex", "cv.pdf", "cv.aux", "cv.synctex.gz", "notes.txt", "other.pdf"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let removed = clean(dir.path(), "cv").unwrap();
        assert_eq!(removed.len(), 4);
        assert!(!dir.path().join("cv.pdf").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("other.pdf").exists());
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let removed = clean(&dir.path().join("output"), "cv").unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_second_clean_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cv.log"), "").unwrap();
        assert_eq!(clean(dir.path(), "cv").unwrap().len(), 1);
        assert!(clean(dir.path(), "cv").unwrap().is_empty());
    }
}
