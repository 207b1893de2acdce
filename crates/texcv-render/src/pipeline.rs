//! Data file to LaTeX source in one call.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::RenderContext;
use crate::document::CvDocument;
use crate::error::Result;
use crate::escape::EmphasisMode;
use crate::template::{Composer, Delimiters, TemplateRegistry, DEFAULT_ROOT};

/// Settings for [`render_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub delimiters: Delimiters,
    pub emphasis: EmphasisMode,
    /// Name of the root template.
    pub root: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            emphasis: EmphasisMode::default(),
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

/// Builds the context for `doc` and renders it through `registry`'s root
/// template.
pub fn render_document(
    doc: &CvDocument,
    registry: &TemplateRegistry,
    options: &RenderOptions,
) -> Result<String> {
    let context = RenderContext::build(doc, options.emphasis)?;
    let composer = Composer::new(registry, &options.delimiters)?;
    let output = composer.render(&context, &[options.root.as_str()])?;
    info!(root = %options.root, bytes = output.len(), "rendered CV");
    Ok(output)
}
