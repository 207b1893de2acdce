//! Template delimiters.
//!
//! LaTeX uses `{`, `}`, `%` and `#` everywhere, so the usual Jinja markers
//! (`{{ }}`, `{% %}`, `{# #}`) would collide with ordinary document source.
//! [`Delimiters`] configures the engine with markers that never occur in TeX:
//!
//! | Construct | Default |
//! |-----------|---------|
//! | Variable | `<VAR> name </VAR>` |
//! | Block | `<BLOCK> if x </BLOCK>` |
//! | Comment | `<# note #>` |

use minijinja::syntax::SyntaxConfig;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Open/close markers for the three template constructs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Delimiters {
    pub variable_open: String,
    pub variable_close: String,
    pub block_open: String,
    pub block_close: String,
    pub comment_open: String,
    pub comment_close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            variable_open: "<VAR>".into(),
            variable_close: "</VAR>".into(),
            block_open: "<BLOCK>".into(),
            block_close: "</BLOCK>".into(),
            comment_open: "<#".into(),
            comment_close: "#>".into(),
        }
    }
}

impl Delimiters {
    /// Checks the set and converts it into the engine's syntax configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Syntax`] if a marker is empty, if two opening
    /// markers are equal, or if the engine rejects the combination.
    pub fn to_syntax_config(&self) -> Result<SyntaxConfig> {
        let markers = [
            ("variable_open", &self.variable_open),
            ("variable_close", &self.variable_close),
            ("block_open", &self.block_open),
            ("block_close", &self.block_close),
            ("comment_open", &self.comment_open),
            ("comment_close", &self.comment_close),
        ];
        if let Some((name, _)) = markers.iter().find(|(_, m)| m.trim().is_empty()) {
            return Err(RenderError::Syntax(format!("`{}` must not be empty", name)));
        }

        let opens = [&self.variable_open, &self.block_open, &self.comment_open];
        for (i, a) in opens.iter().enumerate() {
            if opens[i + 1..].contains(a) {
                return Err(RenderError::Syntax(format!(
                    "opening marker `{}` is used by more than one construct",
                    a
                )));
            }
        }

        SyntaxConfig::builder()
            .variable_delimiters(self.variable_open.clone(), self.variable_close.clone())
            .block_delimiters(self.block_open.clone(), self.block_close.clone())
            .comment_delimiters(self.comment_open.clone(), self.comment_close.clone())
            .build()
            .map_err(|err| RenderError::Syntax(err.to_string()))
    }
}
