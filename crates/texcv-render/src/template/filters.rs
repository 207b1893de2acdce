//! MiniJinja filters for joining fragment lists.
//!
//! Filters operate on values that are already escaped. They add fixed LaTeX
//! separators and never escape anything themselves.
//!
//! - `pipes` - `Rust {\color{divider}|} Go`
//! - `metrics` - `\textbf{10k users} \textcolor{divider}{\textbullet{}} \textbf{99.9\%}`

use minijinja::{Environment, Error, ErrorKind, Value};

/// Separator placed between `pipes` items.
pub const PIPE_SEPARATOR: &str = r" {\color{divider}|} ";

/// Separator placed between `metrics` items.
pub const METRIC_SEPARATOR: &str = r" \textcolor{divider}{\textbullet{}} ";

/// Registers the fragment filters on a MiniJinja environment.
pub fn register_filters(env: &mut Environment<'static>) {
    // {{ job.tech | pipes }}
    env.add_filter("pipes", |value: Value| -> Result<String, Error> {
        Ok(items(&value)?.join(PIPE_SEPARATOR))
    });

    // {{ project.metrics | metrics }}
    env.add_filter("metrics", |value: Value| -> Result<String, Error> {
        let wrapped: Vec<String> = items(&value)?
            .into_iter()
            .map(|item| format!(r"\textbf{{{}}}", item))
            .collect();
        Ok(wrapped.join(METRIC_SEPARATOR))
    });
}

/// Collects the non-empty string items of a sequence. A plain string counts as
/// a one-item list.
fn items(value: &Value) -> Result<Vec<String>, Error> {
    if value.is_undefined() || value.is_none() {
        return Ok(Vec::new());
    }
    if let Some(text) = value.as_str() {
        return Ok(if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        });
    }
    let iter = value.try_iter().map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("expected a list of text fragments, got {}", value.kind()),
        )
    })?;
    Ok(iter
        .map(|item| match item.as_str() {
            Some(text) => text.to_string(),
            None => item.to_string(),
        })
        .filter(|text| !text.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    fn render(template: &str, ctx: Value) -> Result<String, Error> {
        let mut env = Environment::new();
        register_filters(&mut env);
        env.render_str(template, ctx)
    }

    #[test]
    fn test_pipes_joins_items() {
        let out = render(
            "{{ items | pipes }}",
            context! { items => vec!["Rust", "Go"] },
        )
        .unwrap();
        assert_eq!(out, r"Rust {\color{divider}|} Go");
    }

    #[test]
    fn test_pipes_single_item_has_no_separator() {
        let out = render("{{ items | pipes }}", context! { items => vec!["Rust"] }).unwrap();
        assert_eq!(out, "Rust");
    }

    #[test]
    fn test_pipes_empty_list() {
        let empty: Vec<String> = Vec::new();
        let out = render("{{ items | pipes }}", context! { items => empty }).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_pipes_does_not_escape() {
        let out = render(
            "{{ items | pipes }}",
            context! { items => vec![r"C\#", r"50\%"] },
        )
        .unwrap();
        assert_eq!(out, r"C\# {\color{divider}|} 50\%");
    }

    #[test]
    fn test_metrics_wraps_in_bold() {
        let out = render(
            "{{ m | metrics }}",
            context! { m => vec!["10k users", r"99.9\%"] },
        )
        .unwrap();
        assert_eq!(
            out,
            r"\textbf{10k users} \textcolor{divider}{\textbullet{}} \textbf{99.9\%}"
        );
    }

    #[test]
    fn test_non_sequence_is_an_error() {
        let result = render("{{ n | pipes }}", context! { n => 5 });
        assert!(result.is_err());
    }
}
