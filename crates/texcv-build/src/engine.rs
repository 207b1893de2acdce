//! External LaTeX compiler invocation.
//!
//! The engine is a black box: texcv hands it one `.tex` file and expects a
//! PDF with the same stem next to it. Output goes to `<stem>.engine.log`
//! instead of the terminal, and the run is bounded by a timeout after which
//! the process is killed.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wait_timeout::ChildExt;

use crate::error::BuildError;

const WARNING_MARKERS: &[&str] = &["Overfull", "Underfull", "Warning:"];

/// Engine settings as they appear in `texcv.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "latexmk".into(),
            args: vec![
                "-xelatex".into(),
                "-interaction=nonstopmode".into(),
                "-halt-on-error".into(),
            ],
            timeout_secs: 300,
        }
    }
}

/// Outcome of a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub artifact: PathBuf,
    pub log: PathBuf,
    /// Layout and package warnings found in the log.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Engine {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Compiles `tex_path` and returns the produced artifact.
    ///
    /// The engine runs in the file's directory with the file name as its last
    /// argument.
    ///
    /// # Errors
    ///
    /// - [`BuildError::Spawn`] if the program cannot be started
    /// - [`BuildError::Timeout`] if it runs longer than the timeout
    /// - [`BuildError::Failed`] on a non-zero exit status
    /// - [`BuildError::MissingArtifact`] if it exits cleanly without a PDF
    pub fn compile(&self, tex_path: &Path) -> Result<CompileReport, BuildError> {
        let dir = match tex_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = tex_path
            .file_name()
            .ok_or_else(|| BuildError::Io {
                path: tex_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
            })?
            .to_os_string();
        let stem = tex_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let log_path = dir.join(format!("{}.engine.log", stem));
        let log = File::create(&log_path).map_err(BuildError::io(&log_path))?;
        let log_err = log.try_clone().map_err(BuildError::io(&log_path))?;

        info!(program = %self.program, file = %tex_path.display(), "compiling");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&file_name)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .spawn()
            .map_err(|source| BuildError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = match child
            .wait_timeout(self.timeout)
            .map_err(BuildError::io(&log_path))?
        {
            Some(status) => status,
            None => {
                child.kill().map_err(BuildError::io(&log_path))?;
                // Reap the killed process.
                let _ = child.wait();
                return Err(BuildError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(BuildError::Failed {
                program: self.program.clone(),
                status,
                log: log_path,
            });
        }

        let artifact = dir.join(format!("{}.pdf", stem));
        if !artifact.is_file() {
            return Err(BuildError::MissingArtifact { path: artifact });
        }

        let warnings = read_warnings(&log_path)?;
        for line in &warnings {
            warn!("{}", line);
        }
        info!(artifact = %artifact.display(), warnings = warnings.len(), "compiled");

        Ok(CompileReport {
            artifact,
            log: log_path,
            warnings,
        })
    }
}

fn read_warnings(log_path: &Path) -> Result<Vec<String>, BuildError> {
    let bytes = std::fs::read(log_path).map_err(BuildError::io(log_path))?;
    Ok(collect_warnings(&String::from_utf8_lossy(&bytes)))
}

/// Lines of engine output that report layout or package warnings.
pub fn collect_warnings(log: &str) -> Vec<String> {
    log.lines()
        .map(str::trim)
        .filter(|line| WARNING_MARKERS.iter().any(|marker| line.contains(marker)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.program, "latexmk");
        assert_eq!(config.args[0], "-xelatex");
        assert_eq!(Engine::default().timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_config_from_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str("timeout_secs = 10").unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.program, "latexmk");
    }

    #[test]
    fn test_collect_warnings() {
        let log = "This is XeTeX\nOverfull \\hbox (3.2pt too wide) in paragraph\n\
                   LaTeX Font Warning: Font shape undefined\nOutput written on cv.pdf\n\
                   Underfull \\vbox (badness 10000)\n";
        let warnings = collect_warnings(log);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("Overfull"));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("cv.tex");
        std::fs::write(&tex, "").unwrap();
        let engine = Engine::new("texcv-no-such-engine", vec![], Duration::from_secs(5));
        assert!(matches!(
            engine.compile(&tex),
            Err(BuildError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn sh(script: &str, timeout: Duration) -> Engine {
            Engine::new("sh", vec!["-c".into(), script.into()], timeout)
        }

        fn tex_file() -> (tempfile::TempDir, PathBuf) {
            let dir = tempfile::tempdir().unwrap();
            let tex = dir.path().join("jane.tex");
            std::fs::write(&tex, "\\documentclass{article}").unwrap();
            (dir, tex)
        }

        #[test]
        fn test_compile_success_collects_warnings() {
            let (dir, tex) = tex_file();
            // `sh -c script name` binds the appended file name to $0.
            let engine = sh(
                r#"echo "Overfull \hbox (1pt too wide)"; echo ok >&2; touch "${0%.tex}.pdf""#,
                Duration::from_secs(10),
            );
            let report = engine.compile(&tex).unwrap();

            assert_eq!(report.artifact, dir.path().join("jane.pdf"));
            assert_eq!(report.log, dir.path().join("jane.engine.log"));
            assert_eq!(report.warnings, vec![r"Overfull \hbox (1pt too wide)".to_string()]);
            let log = std::fs::read_to_string(&report.log).unwrap();
            assert!(log.contains("ok"));
        }

        #[test]
        fn test_failure_status() {
            let (_dir, tex) = tex_file();
            let engine = sh("echo boom; exit 3", Duration::from_secs(10));
            match engine.compile(&tex) {
                Err(BuildError::Failed { log, .. }) => {
                    assert!(std::fs::read_to_string(log).unwrap().contains("boom"));
                }
                other => panic!("expected Failed, got {other:?}"),
            }
        }

        #[test]
        fn test_missing_artifact() {
            let (_dir, tex) = tex_file();
            let engine = sh("true", Duration::from_secs(10));
            assert!(matches!(
                engine.compile(&tex),
                Err(BuildError::MissingArtifact { .. })
            ));
        }

        #[test]
        fn test_timeout_kills_engine() {
            let (_dir, tex) = tex_file();
            let engine = sh("sleep 5", Duration::from_millis(300));
            let start = std::time::Instant::now();
            assert!(matches!(
                engine.compile(&tex),
                Err(BuildError::Timeout { .. })
            ));
            assert!(start.elapsed() < Duration::from_secs(5));
        }
    }
}
