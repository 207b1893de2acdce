//! CV data model and TOML loader.
//!
//! A [`CvDocument`] is parsed once per build from a single TOML file and is
//! never mutated afterwards. Every field is optional at the parser level;
//! [`CvDocument::validate`] then enforces the two mandatory facts: a name and
//! at least one way to get in touch.
//!
//! # Example
//!
//! ```toml
//! name = "Jane Doe"
//! tagline = "Systems engineer"
//! email = "jane@example.com"
//! output = "jane-doe"
//!
//! [[experience]]
//! title = "Staff Engineer"
//! company = "Acme"
//! start = "2021"
//! highlights = ["Cut build times by **60%**"]
//! tech = "Rust, Kuber\\-netes, CI/CD"
//!
//! [[tech_stack]]
//! category = "Languages"
//! items = ["Rust", "Go"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};

/// Artifact base name used when the data file has no `output` key.
pub const DEFAULT_ARTIFACT_STEM: &str = "cv";

/// The root record loaded from the data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvDocument {
    pub name: String,
    pub tagline: String,
    pub summary: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub github: String,
    /// Base file name of the generated artifact.
    pub output: Option<String>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub tech_stack: Vec<TechGroup>,
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub highlights: Vec<String>,
    pub tech: TextList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub url: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub metrics: Vec<String>,
    pub tech: TextList,
}

/// A labelled group of technologies, rendered as one table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechGroup {
    pub category: String,
    pub items: TextList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
}

/// A list of short items, written either as a TOML array or as one
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    Items(Vec<String>),
    Joined(String),
}

impl Default for TextList {
    fn default() -> Self {
        TextList::Items(Vec::new())
    }
}

impl TextList {
    /// Returns the trimmed, non-blank items in source order.
    pub fn items(&self) -> Vec<&str> {
        match self {
            TextList::Items(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .collect(),
            TextList::Joined(text) => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl CvDocument {
    /// Reads, parses and validates the data file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = source.len(), "loaded data file");
        Self::from_toml_str(&source, path)
    }

    /// Parses and validates TOML source. `origin` is only used in error messages.
    pub fn from_toml_str(source: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let document: CvDocument = toml::from_str(source).map_err(|err| {
            let (line, column) = match err.span() {
                Some(span) => {
                    let (line, column) = line_column(source, span.start);
                    (Some(line), Some(column))
                }
                None => (None, None),
            };
            RenderError::DataFormat {
                path: origin.as_ref().to_path_buf(),
                line,
                column,
                message: err.message().to_string(),
            }
        })?;
        document.validate()?;
        debug!(
            experience = document.experience.len(),
            projects = document.projects.len(),
            tech_stack = document.tech_stack.len(),
            certifications = document.certifications.len(),
            "parsed CV document"
        );
        Ok(document)
    }

    /// Checks the mandatory fields.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RenderError::MissingField { field: "name" });
        }
        let has_contact = [
            &self.email,
            &self.phone,
            &self.website,
            &self.linkedin,
            &self.github,
        ]
        .iter()
        .any(|value| !value.trim().is_empty());
        if !has_contact {
            return Err(RenderError::MissingField { field: "email" });
        }
        Ok(())
    }

    /// Base name for the rendered `.tex` file and the final artifact.
    pub fn artifact_stem(&self) -> String {
        let Some(output) = self.output.as_deref().map(str::trim) else {
            return DEFAULT_ARTIFACT_STEM.to_string();
        };
        let stem = output
            .strip_suffix(".pdf")
            .or_else(|| output.strip_suffix(".tex"))
            .unwrap_or(output);
        if stem.is_empty() {
            DEFAULT_ARTIFACT_STEM.to_string()
        } else {
            stem.to_string()
        }
    }
}

/// Converts a byte offset into a 1-based line and column.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

/// Reads, parses and validates the data file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<CvDocument> {
    CvDocument::load(path)
}
