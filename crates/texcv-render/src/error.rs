//! Error types for CV rendering.
//!
//! This module provides [`RenderError`], the single error type returned by the
//! loader, the formatter and the composer. It wraps the template engine's
//! errors so that callers never see `minijinja` types directly.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for every stage of the rendering pipeline.
///
/// None of these are recoverable inside the pipeline: they abort the build and
/// are reported to the caller as-is.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The data file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file is not valid TOML, or a value has the wrong type.
    #[error("{}{}: {message}", .path.display(), location(.line, .column))]
    DataFormat {
        path: PathBuf,
        /// 1-based line, when the parser reports a position.
        line: Option<usize>,
        /// 1-based column, when the parser reports a position.
        column: Option<usize>,
        message: String,
    },

    /// A mandatory field is absent or blank.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// An emphasis marker has no partner and the formatter runs in strict mode.
    #[error("unbalanced `**` emphasis marker in {field} at byte {position}")]
    UnbalancedEmphasis { field: String, position: usize },

    /// The delimiter set cannot be used by the template engine.
    #[error("invalid template delimiters: {0}")]
    Syntax(String),

    /// A referenced template does not exist.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },

    /// Rendering was requested without naming a root template.
    #[error("no root template given")]
    NoRootTemplate,

    /// Two template directories provide the same template name.
    #[error(
        "template collision for \"{name}\":\n  - {}\n  - {}",
        .existing.display(),
        .conflicting.display()
    )]
    TemplateCollision {
        name: String,
        existing: PathBuf,
        conflicting: PathBuf,
    },

    /// Template syntax error, unresolved variable, or filter failure.
    #[error(
        "template error in {}{}: {message}",
        .name.as_deref().unwrap_or("<unknown>"),
        location(.line, &None)
    )]
    Template {
        name: Option<String>,
        line: Option<usize>,
        message: String,
    },
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(":{}:{}", line, column),
        (Some(line), None) => format!(":{}", line),
        _ => String::new(),
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        if let Some(name) = missing_template(&err) {
            return RenderError::TemplateNotFound { name };
        }
        RenderError::Template {
            name: err.name().map(str::to_string),
            line: err.line(),
            message: match err.detail() {
                Some(detail) => format!("{}: {}", err.kind(), detail),
                None => err.kind().to_string(),
            },
        }
    }
}

/// Finds a not-found error in the chain and returns the missing name.
///
/// `err.name()` is the template being rendered, not the one that is missing,
/// so the name is read from the error detail instead. Includes nested inside
/// partials wrap the not-found error as a source.
fn missing_template(err: &minijinja::Error) -> Option<String> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(cause) = current {
        if let Some(jinja) = cause.downcast_ref::<minijinja::Error>() {
            if jinja.kind() == minijinja::ErrorKind::TemplateNotFound {
                return Some(
                    jinja
                        .detail()
                        .and_then(first_quoted)
                        .unwrap_or_else(|| jinja.to_string()),
                );
            }
        }
        current = cause.source();
    }
    None
}

/// The first `"..."` span of `text`, without the quotes.
fn first_quoted(text: &str) -> Option<String> {
    let start = text.find('"')? + 1;
    let len = text[start..].find('"')?;
    Some(text[start..start + len].to_string())
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_display_includes_location() {
        let err = RenderError::DataFormat {
            path: PathBuf::from("cv.toml"),
            line: Some(3),
            column: Some(7),
            message: "expected `=`".into(),
        };
        assert_eq!(err.to_string(), "cv.toml:3:7: expected `=`");
    }

    #[test]
    fn test_data_format_display_without_location() {
        let err = RenderError::DataFormat {
            path: PathBuf::from("cv.toml"),
            line: None,
            column: None,
            message: "bad".into(),
        };
        assert_eq!(err.to_string(), "cv.toml: bad");
    }

    #[test]
    fn test_missing_field_names_field() {
        let err = RenderError::MissingField { field: "name" };
        assert!(err.to_string().contains("`name`"));
    }

    #[test]
    fn test_from_minijinja_undefined_is_template_error() {
        let mj_err = minijinja::Error::new(minijinja::ErrorKind::UndefinedError, "nope");
        let err: RenderError = mj_err.into();
        assert!(matches!(err, RenderError::Template { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_from_minijinja_template_not_found() {
        let mj_err = minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "template 'foo' not found",
        );
        let err: RenderError = mj_err.into();
        assert!(matches!(err, RenderError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_first_quoted() {
        assert_eq!(
            first_quoted(r#"tried to include non-existing template "nope.tex.j2""#),
            Some("nope.tex.j2".to_string())
        );
        assert_eq!(first_quoted("no quotes"), None);
    }

    #[test]
    fn test_missing_include_names_the_include() {
        let mut env = minijinja::Environment::new();
        env.add_template("base.tex.j2", "{% include 'nope.tex.j2' %}")
            .unwrap();
        let err = env
            .get_template("base.tex.j2")
            .unwrap()
            .render(())
            .unwrap_err();
        match RenderError::from(err) {
            RenderError::TemplateNotFound { name } => assert_eq!(name, "nope.tex.j2"),
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_nested_include_names_the_innermost() {
        let mut env = minijinja::Environment::new();
        env.add_template("base.tex.j2", "{% include 'header.tex.j2' %}")
            .unwrap();
        env.add_template("header.tex.j2", "{% include 'contacts.tex.j2' %}")
            .unwrap();
        let err = env
            .get_template("base.tex.j2")
            .unwrap()
            .render(())
            .unwrap_err();
        match RenderError::from(err) {
            RenderError::TemplateNotFound { name } => assert_eq!(name, "contacts.tex.j2"),
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_other_engine_errors_map_to_template() {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.add_template("base.tex.j2", "{{ missing }}").unwrap();
        let err = env
            .get_template("base.tex.j2")
            .unwrap()
            .render(())
            .unwrap_err();
        match RenderError::from(err) {
            RenderError::Template { name, .. } => assert_eq!(name.as_deref(), Some("base.tex.j2")),
            other => panic!("expected Template, got {other:?}"),
        }
    }
}
