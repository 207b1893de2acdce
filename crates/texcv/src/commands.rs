//! Command implementations.
//!
//! Each command returns an outcome value; printing is left to `main` so the
//! commands stay testable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use texcv_build::{clean, is_stale, CompileReport, Engine, Watcher};
use texcv_render::{
    export_builtins, render_document, CvDocument, RenderContext, TemplateRegistry,
    DEFAULT_ARTIFACT_STEM,
};
use tracing::{info, warn};

use crate::config::Config;

/// Result of `texcv build`.
#[derive(Debug)]
pub enum BuildOutcome {
    UpToDate(PathBuf),
    Built(CompileReport),
}

pub fn load_document(config: &Config) -> Result<CvDocument> {
    let path = config.data_path();
    CvDocument::load(&path).with_context(|| format!("cannot load CV data from {}", path.display()))
}

/// Built-in templates plus the override directory, if any.
pub fn registry(config: &Config) -> Result<TemplateRegistry> {
    let mut registry = TemplateRegistry::with_builtins();
    if let Some(dir) = config.template_dir() {
        registry
            .add_template_dir(&dir)
            .with_context(|| format!("cannot load templates from {}", dir.display()))?;
    }
    Ok(registry)
}

fn render_to_file(config: &Config, doc: &CvDocument) -> Result<PathBuf> {
    let registry = registry(config)?;
    let tex = render_document(doc, &registry, &config.render_options())
        .context("rendering failed")?;

    let out_dir = config.out_dir();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.tex", doc.artifact_stem()));
    std::fs::write(&path, tex).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), "wrote LaTeX source");
    Ok(path)
}

/// `texcv render`: writes `<out_dir>/<stem>.tex`.
pub fn render(config: &Config) -> Result<PathBuf> {
    let doc = load_document(config)?;
    render_to_file(config, &doc)
}

/// `texcv build`: renders and compiles unless the artifact is fresh.
pub fn build(config: &Config, force: bool) -> Result<BuildOutcome> {
    let doc = load_document(config)?;
    let artifact = config.out_dir().join(format!("{}.pdf", doc.artifact_stem()));

    if !force && !is_stale(&artifact, &config.inputs())? {
        info!(artifact = %artifact.display(), "up to date");
        return Ok(BuildOutcome::UpToDate(artifact));
    }

    let tex = render_to_file(config, &doc)?;
    let engine = Engine::from_config(&config.engine);
    let report = engine
        .compile(&tex)
        .with_context(|| format!("{} could not build {}", engine.program(), tex.display()))?;
    Ok(BuildOutcome::Built(report))
}

/// `texcv clean`: removes generated files. Works even when the data file is
/// broken, falling back to the default artifact name.
pub fn clean_outputs(config: &Config) -> Result<Vec<PathBuf>> {
    let stem = match load_document(config) {
        Ok(doc) => doc.artifact_stem(),
        Err(err) => {
            warn!("{:#}; cleaning {} files", err, DEFAULT_ARTIFACT_STEM);
            DEFAULT_ARTIFACT_STEM.to_string()
        }
    };
    let out_dir = config.out_dir();
    clean(&out_dir, &stem).with_context(|| format!("cannot clean {}", out_dir.display()))
}

/// `texcv context`: the template context as pretty JSON.
pub fn context_json(config: &Config) -> Result<String> {
    let doc = load_document(config)?;
    let context = RenderContext::build(&doc, config.emphasis)?;
    Ok(serde_json::to_string_pretty(&context)?)
}

/// `texcv templates`: resolvable template names.
pub fn template_names(config: &Config) -> Result<Vec<String>> {
    Ok(registry(config)?
        .names()
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// `texcv templates --export DIR`.
pub fn export_templates(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    export_builtins(dir, force).with_context(|| format!("cannot export templates to {}", dir.display()))
}

/// `texcv watch`: builds now and after every change. Build errors are passed
/// to `report` and watching continues; only watcher failures end the loop.
pub fn watch(config: &Config, mut report: impl FnMut(Result<BuildOutcome>)) -> Result<()> {
    report(build(config, false));

    let mut watcher = Watcher::new(config.inputs(), config.watch_interval())?;
    info!(paths = ?watcher.paths(), "watching for changes");
    loop {
        let changed = watcher.wait()?;
        info!(changed = ?changed, "inputs changed");
        report(build(config, true));
    }
}
