//! `texcv.toml` settings.
//!
//! Every key is optional:
//!
//! ```toml
//! data = "cv.toml"
//! templates = "templates"
//! root = "base.tex.j2"
//! out_dir = "output"
//! emphasis = "strict"
//!
//! [syntax]
//! variable_open = "<VAR>"
//! variable_close = "</VAR>"
//!
//! [engine]
//! program = "latexmk"
//! args = ["-xelatex", "-interaction=nonstopmode", "-halt-on-error"]
//! timeout_secs = 300
//!
//! [watch]
//! interval_ms = 500
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use texcv_build::EngineConfig;
use texcv_render::{Delimiters, EmphasisMode, RenderOptions, DEFAULT_ROOT};
use tracing::debug;

use crate::cli::InputArgs;

pub const CONFIG_FILE: &str = "texcv.toml";
const DEFAULT_TEMPLATES_DIR: &str = "templates";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: PathBuf,
    /// Template override directory. When unset, `templates/` is used if it
    /// exists.
    pub templates: Option<PathBuf>,
    pub root: String,
    pub out_dir: PathBuf,
    pub emphasis: EmphasisMode,
    pub syntax: Delimiters,
    pub engine: EngineConfig,
    pub watch: WatchSettings,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base: PathBuf,
    /// The file these settings came from, if any.
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSettings {
    pub interval_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from("cv.toml"),
            templates: None,
            root: DEFAULT_ROOT.to_string(),
            out_dir: PathBuf::from("output"),
            emphasis: EmphasisMode::default(),
            syntax: Delimiters::default(),
            engine: EngineConfig::default(),
            watch: WatchSettings::default(),
            base: PathBuf::new(),
            source: None,
        }
    }
}

impl Config {
    /// Loads `explicit`, or `./texcv.toml` when it exists, or the defaults.
    ///
    /// An explicitly named file that is missing is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::load(Path::new(CONFIG_FILE)),
            None => {
                debug!("no {} found, using defaults", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&source)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Applies command-line overrides. Override paths are taken as given,
    /// relative to the working directory.
    pub fn apply(&mut self, args: &InputArgs) {
        if let Some(data) = &args.data {
            self.data = self.cwd_relative(data);
        }
        if let Some(templates) = &args.templates {
            self.templates = Some(self.cwd_relative(templates));
        }
        if let Some(out_dir) = &args.out_dir {
            self.out_dir = self.cwd_relative(out_dir);
        }
    }

    // Rewrites a working-directory path so that `resolve` returns it unchanged.
    fn cwd_relative(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.base.as_os_str().is_empty() {
            return path.to_path_buf();
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.data)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.resolve(&self.out_dir)
    }

    /// The template override directory, if one applies.
    pub fn template_dir(&self) -> Option<PathBuf> {
        match &self.templates {
            Some(dir) => Some(self.resolve(dir)),
            None => {
                let dir = self.resolve(Path::new(DEFAULT_TEMPLATES_DIR));
                dir.is_dir().then_some(dir)
            }
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            delimiters: self.syntax.clone(),
            emphasis: self.emphasis,
            root: self.root.clone(),
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms)
    }

    /// Files and directories whose changes require a rebuild.
    pub fn inputs(&self) -> Vec<PathBuf> {
        let mut inputs = vec![self.data_path()];
        match self.template_dir() {
            Some(dir) => inputs.push(dir),
            // Watch the default location so a newly created directory is seen.
            None => inputs.push(self.resolve(Path::new(DEFAULT_TEMPLATES_DIR))),
        }
        if let Some(source) = &self.source {
            inputs.push(source.clone());
        }
        inputs
    }
}
