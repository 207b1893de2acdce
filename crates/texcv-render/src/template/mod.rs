//! Template composition with LaTeX-safe delimiters.
//!
//! The pieces:
//!
//! - [`Delimiters`]: the marker set handed to MiniJinja's custom syntax
//! - [`TemplateRegistry`]: resolves template names across built-in,
//!   directory and inline sources
//! - [`Composer`]: an environment loaded from a registry, rendering a
//!   [`RenderContext`](crate::RenderContext)
//! - [`filters`]: `pipes` and `metrics`, which join already-escaped lists
//!
//! ## Template Layout
//!
//! The root template (`base.tex.j2` by default) holds the preamble and
//! includes one partial per section in a fixed order:
//!
//! ```text
//! <BLOCK> include "header.tex.j2" </BLOCK>
//! <BLOCK> include "experience.tex.j2" </BLOCK>
//! ```
//!
//! Each partial wraps its whole output in `<BLOCK> if section </BLOCK>`, so an
//! empty section contributes nothing, not even its heading.

mod composer;
pub mod filters;
pub mod registry;
mod syntax;

pub use composer::Composer;
pub use registry::{
    export_builtins, strip_extension, walk_template_dir, ResolvedTemplate, TemplateFile, TemplateRegistry,
    BUILTIN_TEMPLATES, DEFAULT_ROOT, TEMPLATE_EXTENSIONS,
};
pub use syntax::Delimiters;
