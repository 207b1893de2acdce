//! LaTeX escaping and inline emphasis.
//!
//! Every piece of user text that ends up in the generated `.tex` file passes
//! through this module first. The output type, [`Fragment`], is the only kind
//! of value the composer interpolates, so templates never see raw text.
//!
//! ## Reserved Characters
//!
//! | Input | Output |
//! |-------|--------|
//! | `\` | `\textbackslash{}` |
//! | `%` `$` `&` `#` `_` `{` `}` | `\%` `\$` `\&` `\#` `\_` `\{` `\}` |
//! | `~` | `\textasciitilde{}` |
//! | `^` | `\textasciicircum{}` |
//!
//! The manual hyphenation hint `\-` is copied through unchanged, so
//! `Kuber\-netes` still breaks where the author asked it to.
//!
//! ## Emphasis
//!
//! [`format_inline`] additionally turns `**text**` into `\textbf{text}`:
//!
//! ```rust
//! use texcv_render::escape::{format_inline, EmphasisMode};
//!
//! let out = format_inline("Cut costs by **40%**", EmphasisMode::Lenient).unwrap();
//! assert_eq!(out.as_str(), r"Cut costs by \textbf{40\%}");
//! ```
//!
//! Markers are split out before escaping and the inner text is escaped on its
//! own, so neither step can corrupt the other.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text that is safe to place verbatim into the LaTeX output.
///
/// Fragments are produced only by the functions in this module. They
/// serialize as plain strings so templates can interpolate them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fragment(String);

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How to treat a `**` marker that has no closing partner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmphasisMode {
    /// Keep the marker as literal text.
    #[default]
    Lenient,
    /// Report the marker as an error.
    Strict,
}

/// An unmatched emphasis marker found in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbalancedMarker {
    /// Byte offset of the marker in the raw input.
    pub position: usize,
}

const MARKER: &str = "**";

/// Escapes every LaTeX-reserved character in `raw`.
pub fn escape(raw: &str) -> Fragment {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    push_escaped(&mut out, raw);
    Fragment(out)
}

fn push_escaped(out: &mut String, raw: &str) {
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'-') => {
                chars.next();
                out.push_str(r"\-");
            }
            '\\' => out.push_str(r"\textbackslash{}"),
            '%' | '$' | '&' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(c),
        }
    }
}

/// Escapes a URL for the first argument of `\href`.
///
/// `%` and `#` are backslash-escaped. Characters that are both invalid in a
/// URL and special to TeX are percent-encoded.
pub fn escape_url(raw: &str) -> Fragment {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        match c {
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            '\\' => out.push_str(r"\%5C"),
            '{' => out.push_str(r"\%7B"),
            '}' => out.push_str(r"\%7D"),
            '^' => out.push_str(r"\%5E"),
            ' ' => out.push_str(r"\%20"),
            _ => out.push(c),
        }
    }
    Fragment(out)
}

/// Escapes `raw` and converts `**bold**` spans to `\textbf{bold}`.
///
/// In [`EmphasisMode::Strict`] an unmatched marker is an error; in
/// [`EmphasisMode::Lenient`] it is kept as the literal text `**`.
pub fn format_inline(raw: &str, mode: EmphasisMode) -> Result<Fragment, UnbalancedMarker> {
    let tokens = Tokenizer::new(raw).collect::<Vec<_>>();
    let markers = tokens
        .iter()
        .filter(|t| matches!(t, Token::Marker(_)))
        .count();
    // Markers pair up left to right; with an odd count the last one is unmatched.
    let unmatched = if markers % 2 == 1 {
        tokens.iter().rev().find_map(|t| match t {
            Token::Marker(pos) => Some(*pos),
            Token::Text(_) => None,
        })
    } else {
        None
    };

    if let (Some(position), EmphasisMode::Strict) = (unmatched, mode) {
        return Err(UnbalancedMarker { position });
    }

    let mut out = String::with_capacity(raw.len() + 16);
    let mut open = false;
    for token in &tokens {
        match token {
            Token::Text(text) => push_escaped(&mut out, text),
            Token::Marker(pos) if Some(*pos) == unmatched => out.push_str(MARKER),
            Token::Marker(_) if open => {
                out.push('}');
                open = false;
            }
            Token::Marker(_) => {
                out.push_str(r"\textbf{");
                open = true;
            }
        }
    }

    Ok(Fragment(out))
}

/// Allows line breaks after every `/` of an escaped fragment.
///
/// Long slash-separated items such as `CI/CD/GitOps` otherwise overflow
/// narrow table columns.
pub fn allow_breaks(fragment: Fragment) -> Fragment {
    if !fragment.0.contains('/') {
        return fragment;
    }
    Fragment(fragment.0.replace('/', r"/\allowbreak{}"))
}

/// Token types produced by the emphasis tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Plain text between markers.
    Text(&'a str),
    /// A `**` marker at the given byte offset.
    Marker(usize),
}

/// Splits input into text runs and `**` markers.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];
        match remaining.find(MARKER) {
            Some(0) => {
                let start = self.pos;
                self.pos += MARKER.len();
                Some(Token::Marker(start))
            }
            Some(marker_pos) => {
                self.pos += marker_pos;
                Some(Token::Text(&remaining[..marker_pos]))
            }
            None => {
                self.pos = self.input.len();
                Some(Token::Text(remaining))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(raw: &str) -> String {
        format_inline(raw, EmphasisMode::Lenient)
            .unwrap()
            .into_string()
    }

    mod escaping {
        use super::*;

        #[test]
        fn plain_text_unchanged() {
            assert_eq!(escape("Jane Doe").as_str(), "Jane Doe");
        }

        #[test]
        fn simple_reserved_characters() {
            assert_eq!(escape("50% & $5 #1 a_b").as_str(), r"50\% \& \$5 \#1 a\_b");
        }

        #[test]
        fn braces() {
            assert_eq!(escape("{x}").as_str(), r"\{x\}");
        }

        #[test]
        fn tilde_and_caret() {
            assert_eq!(
                escape("~/x^2").as_str(),
                r"\textasciitilde{}/x\textasciicircum{}2"
            );
        }

        #[test]
        fn lone_backslash() {
            assert_eq!(escape(r"C:\dir").as_str(), r"C:\textbackslash{}dir");
        }

        #[test]
        fn hyphenation_hint_passthrough() {
            assert_eq!(escape(r"Kuber\-netes").as_str(), r"Kuber\-netes");
        }

        #[test]
        fn double_backslash_before_hyphen() {
            // The first backslash is literal, the second starts the hint.
            assert_eq!(escape(r"a\\-b").as_str(), r"a\textbackslash{}\-b");
        }

        #[test]
        fn trailing_backslash() {
            assert_eq!(escape("end\\").as_str(), r"end\textbackslash{}");
        }

        #[test]
        fn unicode_untouched() {
            assert_eq!(escape("Zoë, Ünïcode ñ").as_str(), "Zoë, Ünïcode ñ");
        }

        #[test]
        fn asterisks_untouched() {
            assert_eq!(escape("**x**").as_str(), "**x**");
        }
    }

    mod urls {
        use super::*;

        #[test]
        fn plain_url_unchanged() {
            assert_eq!(
                escape_url("https://example.com/a_b~c").as_str(),
                "https://example.com/a_b~c"
            );
        }

        #[test]
        fn percent_and_hash_escaped() {
            assert_eq!(
                escape_url("https://x.io/a%20b#top").as_str(),
                r"https://x.io/a\%20b\#top"
            );
        }

        #[test]
        fn tex_specials_percent_encoded() {
            assert_eq!(escape_url("a{b} c").as_str(), r"a\%7Bb\%7D\%20c");
        }

        #[test]
        fn surrounding_whitespace_trimmed() {
            assert_eq!(escape_url("  https://x.io ").as_str(), "https://x.io");
        }
    }

    mod emphasis {
        use super::*;

        #[test]
        fn single_span() {
            assert_eq!(lenient("a **b** c"), r"a \textbf{b} c");
        }

        #[test]
        fn multiple_spans() {
            assert_eq!(lenient("**a** and **b**"), r"\textbf{a} and \textbf{b}");
        }

        #[test]
        fn reserved_inside_span() {
            assert_eq!(lenient("**100% & more**"), r"\textbf{100\% \& more}");
        }

        #[test]
        fn empty_span() {
            assert_eq!(lenient("****"), r"\textbf{}");
        }

        #[test]
        fn unmatched_marker_kept_in_lenient_mode() {
            assert_eq!(lenient("**a** b **c"), r"\textbf{a} b **c");
        }

        #[test]
        fn unmatched_marker_rejected_in_strict_mode() {
            let err = format_inline("**a** b **c", EmphasisMode::Strict).unwrap_err();
            assert_eq!(err.position, 8);
        }

        #[test]
        fn balanced_input_accepted_in_strict_mode() {
            let out = format_inline("x **y**", EmphasisMode::Strict).unwrap();
            assert_eq!(out.as_str(), r"x \textbf{y}");
        }

        #[test]
        fn triple_asterisk() {
            // `***` is a marker followed by a literal asterisk.
            assert_eq!(lenient("***a**"), r"\textbf{*a}");
        }

        #[test]
        fn single_asterisk_is_text() {
            assert_eq!(lenient("a * b"), "a * b");
        }

        #[test]
        fn no_markers_is_plain_escape() {
            assert_eq!(lenient("R&D"), escape("R&D").into_string());
        }
    }

    mod breaks {
        use super::*;

        #[test]
        fn slashes_get_break_points() {
            assert_eq!(
                allow_breaks(escape("CI/CD")).as_str(),
                r"CI/\allowbreak{}CD"
            );
        }

        #[test]
        fn no_slash_unchanged() {
            assert_eq!(allow_breaks(escape("Rust")).as_str(), "Rust");
        }
    }

    mod tokenizer {
        use super::*;

        #[test]
        fn tokenize_plain_text() {
            let tokens: Vec<_> = Tokenizer::new("hello").collect();
            assert_eq!(tokens, vec![Token::Text("hello")]);
        }

        #[test]
        fn tokenize_markers() {
            let tokens: Vec<_> = Tokenizer::new("a**b**").collect();
            assert_eq!(
                tokens,
                vec![
                    Token::Text("a"),
                    Token::Marker(1),
                    Token::Text("b"),
                    Token::Marker(4)
                ]
            );
        }

        #[test]
        fn tokenize_empty() {
            assert_eq!(Tokenizer::new("").count(), 0);
        }
    }
}
