//! Template registry for built-in, file-based and inline templates.
//!
//! # Template Resolution
//!
//! Templates are resolved by name in this order:
//!
//! 1. Inline templates (added via [`TemplateRegistry::add_inline`])
//! 2. File templates from registered directories
//! 3. Built-in templates shipped with the crate (see [`BUILTIN_TEMPLATES`])
//!
//! So a `templates/experience.tex.j2` in the project replaces the built-in
//! experience partial while every other section keeps the default.
//!
//! # Names
//!
//! Each file is registered under its path relative to the template directory
//! (`"experience.tex.j2"`) and under that path with the template extension
//! stripped (`"experience"`).
//!
//! # Supported Extensions
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.tex.j2` |
//! | 2 | `.j2` |
//! | 3 | `.jinja` |
//! | 4 (lowest) | `.tex` |
//!
//! If `header.tex.j2` and `header.tex` both exist, `"header"` resolves to the
//! `.tex.j2` file. The same name coming from two different directories is a
//! [`RenderError::TemplateCollision`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{RenderError, Result};

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".tex.j2", ".j2", ".jinja", ".tex"];

/// Name of the root template among the built-ins.
pub const DEFAULT_ROOT: &str = "base.tex.j2";

/// Templates compiled into the crate: the root and one partial per section.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.tex.j2", include_str!("../../templates/base.tex.j2")),
    ("header.tex.j2", include_str!("../../templates/header.tex.j2")),
    (
        "experience.tex.j2",
        include_str!("../../templates/experience.tex.j2"),
    ),
    ("projects.tex.j2", include_str!("../../templates/projects.tex.j2")),
    (
        "tech_stack.tex.j2",
        include_str!("../../templates/tech_stack.tex.j2"),
    ),
    (
        "certifications.tex.j2",
        include_str!("../../templates/certifications.tex.j2"),
    ),
];

/// A template file discovered during directory walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Resolution name without extension (e.g. `"header"`)
    pub name: String,
    /// Resolution name with extension (e.g. `"header.tex.j2"`)
    pub name_with_ext: String,
    pub absolute_path: PathBuf,
    /// The template directory this file belongs to
    pub source_dir: PathBuf,
}

impl TemplateFile {
    /// Returns the extension priority (lower is higher priority).
    ///
    /// Returns `usize::MAX` if the extension is not recognized.
    pub fn extension_priority(&self) -> usize {
        extension_priority(&self.name_with_ext)
    }
}

fn extension_priority(name: &str) -> usize {
    TEMPLATE_EXTENSIONS
        .iter()
        .position(|ext| name.ends_with(ext))
        .unwrap_or(usize::MAX)
}

/// Removes the highest-priority matching template extension.
pub fn strip_extension(name: &str) -> &str {
    TEMPLATE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// How a template's content is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTemplate {
    /// Content held in memory (inline and built-in templates).
    Inline(String),
    /// Content read from disk when requested.
    File(PathBuf),
}

/// Registry for template resolution from multiple sources.
///
/// Iteration order of [`names`](Self::names) is sorted, so engines built from
/// the same registry always see templates in the same order.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    inline: BTreeMap<String, String>,
    files: BTreeMap<String, PathBuf>,
    /// name → (path, source_dir), for collision reporting
    sources: BTreeMap<String, (PathBuf, PathBuf)>,
    builtin: BTreeMap<String, String>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding only the built-in templates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.add_builtin_entries(BUILTIN_TEMPLATES);
        registry
    }

    /// Adds an inline template. Inline templates shadow every other source.
    pub fn add_inline(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.inline.insert(name.into(), content.into());
    }

    /// Adds lowest-priority templates from `(name_with_ext, content)` pairs.
    pub fn add_builtin_entries(&mut self, entries: &[(&str, &str)]) {
        for (name_with_ext, content) in entries {
            let name = strip_extension(name_with_ext);
            if name != *name_with_ext {
                self.builtin
                    .entry(name.to_string())
                    .or_insert_with(|| content.to_string());
            }
            self.builtin
                .insert(name_with_ext.to_string(), content.to_string());
        }
    }

    /// Walks `dir` and registers every template file found.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the directory cannot be read and
    /// [`RenderError::TemplateCollision`] if a name is already provided by
    /// another directory.
    pub fn add_template_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let files = walk_template_dir(dir.as_ref())?;
        debug!(dir = %dir.as_ref().display(), count = files.len(), "found template files");
        self.add_from_files(files)
    }

    /// Registers discovered template files.
    pub fn add_from_files(&mut self, files: Vec<TemplateFile>) -> Result<()> {
        let mut sorted_files = files;
        sorted_files.sort_by(|a, b| {
            a.extension_priority()
                .cmp(&b.extension_priority())
                .then_with(|| a.name_with_ext.cmp(&b.name_with_ext))
        });

        for file in sorted_files {
            for name in [&file.name, &file.name_with_ext] {
                if let Some((existing_path, existing_dir)) = self.sources.get(name) {
                    if existing_dir != &file.source_dir {
                        return Err(RenderError::TemplateCollision {
                            name: name.clone(),
                            existing: existing_path.clone(),
                            conflicting: file.absolute_path.clone(),
                        });
                    }
                    // Same directory: the higher-priority extension is already registered.
                    continue;
                }
                self.sources.insert(
                    name.clone(),
                    (file.absolute_path.clone(), file.source_dir.clone()),
                );
                self.files.insert(name.clone(), file.absolute_path.clone());
            }
        }

        Ok(())
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Result<ResolvedTemplate> {
        if let Some(content) = self.inline.get(name) {
            return Ok(ResolvedTemplate::Inline(content.clone()));
        }
        if let Some(path) = self.files.get(name) {
            return Ok(ResolvedTemplate::File(path.clone()));
        }
        if let Some(content) = self.builtin.get(name) {
            return Ok(ResolvedTemplate::Inline(content.clone()));
        }
        Err(RenderError::TemplateNotFound {
            name: name.to_string(),
        })
    }

    /// Gets the content of a template, reading from disk if necessary.
    pub fn get_content(&self, name: &str) -> Result<String> {
        match self.get(name)? {
            ResolvedTemplate::Inline(content) => Ok(content),
            ResolvedTemplate::File(path) => {
                std::fs::read_to_string(&path).map_err(|source| RenderError::Io { path, source })
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// All resolvable names, sorted and without duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .inline
            .keys()
            .chain(self.files.keys())
            .chain(self.builtin.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.files.is_empty() && self.builtin.is_empty()
    }
}

/// Writes the built-in templates into `dir` so they can be customized.
///
/// Without `overwrite`, an existing file stops the export with an
/// [`std::io::ErrorKind::AlreadyExists`] error.
pub fn export_builtins(dir: impl AsRef<Path>, overwrite: bool) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(BUILTIN_TEMPLATES.len());
    for (name, content) in BUILTIN_TEMPLATES {
        let path = dir.join(name);
        if path.exists() && !overwrite {
            return Err(RenderError::Io {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "file exists (use --force to overwrite)",
                ),
            });
        }
        std::fs::write(&path, content).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "exported template");
        written.push(path);
    }
    Ok(written)
}

/// Recursively collects template files under `root`, sorted by path.
///
/// Symlinks are followed. Links that loop back to an ancestor and links
/// whose target is missing are skipped.
pub fn walk_template_dir(root: &Path) -> Result<Vec<TemplateFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.loop_ancestor().is_some() => {
                warn!(path = ?err.path(), "skipping symlink loop in template directory");
                continue;
            }
            Err(err) if err.depth() > 0 && is_not_found(&err) => {
                warn!(path = ?err.path(), "skipping dangling symlink in template directory");
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                return Err(RenderError::Io {
                    path,
                    source: err.into(),
                });
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name_with_ext = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if extension_priority(&name_with_ext) == usize::MAX {
            continue;
        }
        files.push(TemplateFile {
            name: strip_extension(&name_with_ext).to_string(),
            name_with_ext,
            absolute_path: entry.into_path(),
            source_dir: root.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.absolute_path.cmp(&b.absolute_path));
    Ok(files)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}
