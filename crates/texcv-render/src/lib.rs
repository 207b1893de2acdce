//! # texcv-render - CV data to LaTeX source
//!
//! `texcv-render` turns a TOML description of a CV into LaTeX source ready for
//! an external compiler. It has three stages, each usable on its own:
//!
//! 1. [`document`]: load and validate a [`CvDocument`]
//! 2. [`context`]: convert it into a [`RenderContext`] whose values are all
//!    escaped [`Fragment`]s
//! 3. [`template`]: compose the context through a root template and its
//!    section partials
//!
//! ## Quick Start
//!
//! ```rust
//! use texcv_render::{render_document, CvDocument, RenderOptions, TemplateRegistry};
//!
//! let doc = CvDocument::from_toml_str(
//!     "name = \"Jane Doe\"\nemail = \"jane@x.com\"\n",
//!     "cv.toml",
//! ).unwrap();
//!
//! let tex = render_document(&doc, &TemplateRegistry::with_builtins(), &RenderOptions::default())
//!     .unwrap();
//! assert!(tex.contains("Jane Doe"));
//! assert!(!tex.contains("Experience"));
//! ```
//!
//! ## Escaping Contract
//!
//! Escaping happens exactly once, while the context is built. Templates and
//! filters never escape, so there is no path to double escaping and no value
//! reaches the output unescaped.
//!
//! ## Delimiters
//!
//! Templates use `<VAR> x </VAR>`, `<BLOCK> if x </BLOCK>` and `<# note #>`
//! by default, leaving `{`, `}`, `%` and `#` to LaTeX. See [`Delimiters`].

pub mod context;
pub mod document;
mod error;
pub mod escape;
mod pipeline;
pub mod template;

pub use context::{
    CertificationView, ContactView, ExperienceView, ProjectView, RenderContext, TechGroupView,
};
pub use document::{
    load, Certification, CvDocument, Experience, Project, TechGroup, TextList,
    DEFAULT_ARTIFACT_STEM,
};
pub use error::{RenderError, Result};
pub use escape::{allow_breaks, escape, escape_url, format_inline, EmphasisMode, Fragment};
pub use pipeline::{render_document, RenderOptions};
pub use template::{
    export_builtins, Composer, Delimiters, TemplateRegistry, BUILTIN_TEMPLATES, DEFAULT_ROOT,
};
