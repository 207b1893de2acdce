//! Recursive modification-time listing shared by freshness and watching.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;
use walkdir::WalkDir;

use crate::error::BuildError;

/// One file or directory found under a walked path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// Lists `root` and everything below it, following symlinks.
///
/// A missing `root` yields nothing. Symlink loops and entries that vanish
/// mid-walk are skipped.
pub(crate) fn entries(root: &Path) -> Result<Vec<Entry>, BuildError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.loop_ancestor().is_some() => {
                warn!(path = ?err.path(), "skipping symlink loop");
                continue;
            }
            Err(err) if is_not_found(&err) => continue,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                return Err(BuildError::Io {
                    path,
                    source: err.into(),
                });
            }
        };
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) if is_not_found(&err) => continue,
            Err(err) => {
                return Err(BuildError::Io {
                    path: entry.path().to_path_buf(),
                    source: err.into(),
                })
            }
        };
        let modified = meta.modified().map_err(BuildError::io(entry.path()))?;
        found.push(Entry {
            path: entry.into_path(),
            modified,
            is_dir: meta.is_dir(),
        });
    }
    Ok(found)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}
