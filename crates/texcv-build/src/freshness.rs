//! Timestamp-based rebuild decisions.
//!
//! An artifact is stale when it is missing or older than the newest of its
//! inputs. Directories count as the newest file inside them.

use std::path::Path;
use std::time::SystemTime;

use crate::error::BuildError;
use crate::walk;

/// Returns true when `artifact` must be rebuilt from `inputs`.
///
/// Inputs that do not exist are ignored.
pub fn is_stale<P: AsRef<Path>>(artifact: &Path, inputs: &[P]) -> Result<bool, BuildError> {
    let built = match std::fs::metadata(artifact) {
        Ok(meta) => meta.modified().map_err(BuildError::io(artifact))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(source) => {
            return Err(BuildError::Io {
                path: artifact.to_path_buf(),
                source,
            })
        }
    };

    for input in inputs {
        if let Some(modified) = newest_modification(input.as_ref())? {
            if modified > built {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// The latest modification time at or below `path`, or `None` if it does not
/// exist.
pub fn newest_modification(path: &Path) -> Result<Option<SystemTime>, BuildError> {
    Ok(walk::entries(path)?
        .into_iter()
        .map(|entry| entry.modified)
        .max())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, time: SystemTime) {
        let file = File::options().create(true).append(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_missing_artifact_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let inputs: [&Path; 0] = [];
        assert!(is_stale(&dir.path().join("cv.pdf"), &inputs).unwrap());
    }

    #[test]
    fn test_newer_input_makes_stale() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let artifact = dir.path().join("cv.pdf");
        let data = dir.path().join("cv.toml");
        touch(&artifact, now - Duration::from_secs(60));
        touch(&data, now);

        assert!(is_stale(&artifact, &[&data]).unwrap());
    }

    #[test]
    fn test_older_inputs_are_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let artifact = dir.path().join("cv.pdf");
        let data = dir.path().join("cv.toml");
        touch(&data, now - Duration::from_secs(60));
        touch(&artifact, now);

        let missing = dir.path().join("texcv.toml");
        assert!(!is_stale(&artifact, &[&data, &missing]).unwrap());
    }

    #[test]
    fn test_directory_uses_newest_file() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let templates = dir.path().join("templates");
        std::fs::create_dir(&templates).unwrap();
        let artifact = dir.path().join("cv.pdf");
        touch(&templates.join("header.tex.j2"), now + Duration::from_secs(60));
        touch(&artifact, now);

        assert!(is_stale(&artifact, &[&templates]).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_in_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let templates = dir.path().join("templates");
        std::fs::create_dir(&templates).unwrap();
        std::os::unix::fs::symlink(&templates, templates.join("self")).unwrap();
        let artifact = dir.path().join("cv.pdf");
        touch(&templates.join("header.tex.j2"), now + Duration::from_secs(60));
        touch(&artifact, now);

        assert!(is_stale(&artifact, &[&templates]).unwrap());
    }
}
