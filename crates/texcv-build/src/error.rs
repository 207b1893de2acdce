use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("`{program}` failed with {status}; see {}", .log.display())]
    Failed {
        program: String,
        status: ExitStatus,
        log: PathBuf,
    },
    #[error("engine finished but {} was not produced", .path.display())]
    MissingArtifact { path: PathBuf },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BuildError::Timeout {
            program: "latexmk".into(),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(err.to_string(), "`latexmk` timed out after 300s");

        let err = BuildError::MissingArtifact {
            path: PathBuf::from("output/cv.pdf"),
        };
        assert!(err.to_string().contains("output/cv.pdf"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = BuildError::io("a/b")(std::io::Error::from(std::io::ErrorKind::NotFound));
        match err {
            BuildError::Io { path, .. } => assert_eq!(path, PathBuf::from("a/b")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
