//! Template composition.
//!
//! A [`Composer`] owns a MiniJinja environment loaded with every template of
//! a [`TemplateRegistry`], configured for LaTeX output:
//!
//! - custom delimiters from [`Delimiters`]
//! - `trim_blocks` and `lstrip_blocks`, so block tags leave no blank lines
//! - strict undefined behaviour, so a misspelled variable fails the render
//! - no auto-escaping; every value in a [`RenderContext`] is already a
//!   [`Fragment`](crate::Fragment)
//!
//! The composer keeps no state between renders.

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use tracing::debug;

use super::filters::register_filters;
use super::registry::TemplateRegistry;
use super::syntax::Delimiters;
use crate::context::RenderContext;
use crate::error::{RenderError, Result};

/// Renders a [`RenderContext`] through a tree of templates.
pub struct Composer {
    env: Environment<'static>,
}

impl Composer {
    /// Builds an environment holding every template in `registry`.
    ///
    /// File templates are read here, once.
    pub fn new(registry: &TemplateRegistry, delimiters: &Delimiters) -> Result<Self> {
        let mut env = Environment::new();
        env.set_syntax(delimiters.to_syntax_config()?);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        register_filters(&mut env);

        for name in registry.names() {
            let content = registry.get_content(name)?;
            env.add_template_owned(name.to_string(), content)?;
        }
        debug!(templates = registry.names().len(), "composer ready");

        Ok(Self { env })
    }

    /// Renders `templates[0]` with `context`.
    ///
    /// Every listed template must exist; the others are partials the root is
    /// expected to include.
    ///
    /// # Errors
    ///
    /// - [`RenderError::NoRootTemplate`] if `templates` is empty
    /// - [`RenderError::TemplateNotFound`] for an unknown id
    /// - [`RenderError::Template`] for syntax errors and undefined variables
    pub fn render<S: AsRef<str>>(&self, context: &RenderContext, templates: &[S]) -> Result<String> {
        let Some(root) = templates.first() else {
            return Err(RenderError::NoRootTemplate);
        };
        for id in templates {
            let id = id.as_ref();
            if self.env.get_template(id).is_err() {
                return Err(RenderError::TemplateNotFound { name: id.to_string() });
            }
        }

        let template = self.env.get_template(root.as_ref())?;
        let output = template.render(context)?;
        debug!(root = root.as_ref(), bytes = output.len(), "rendered document");
        Ok(output)
    }
}
