//! Placeholder syntax: `{{Name}}`, `{{range Items}}`, `{{end}}`

use std::ops::Range;

/// Opening and closing delimiters of a placeholder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// What a placeholder asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Value substitution: a dot path, `.` or `$index`/`$number`
    Field(String),
    /// Start of a repeated block over the named list
    Range(String),
    /// End of the innermost open block
    End,
}

impl Directive {
    pub fn is_block(&self) -> bool {
        !matches!(self, Directive::Field(_))
    }
}

/// A placeholder found in text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Byte range of the whole placeholder, delimiters included
    pub span: Range<usize>,
    pub directive: Directive,
}

/// Find all placeholders in `text`, in order.
///
/// Text that opens a placeholder but never closes it, or whose content is
/// not a valid name, is left alone. An empty delimiter matches nothing.
pub fn scan(text: &str, delimiters: &Delimiters) -> Vec<Token> {
    let mut tokens = Vec::new();
    if delimiters.open.is_empty() || delimiters.close.is_empty() {
        return tokens;
    }
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(&delimiters.open) {
        let start = cursor + found;
        let inner_start = start + delimiters.open.len();
        let Some(len) = text[inner_start..].find(&delimiters.close) else {
            break;
        };
        let inner_end = inner_start + len;
        let end = inner_end + delimiters.close.len();

        match parse_directive(&text[inner_start..inner_end]) {
            Some(directive) => {
                tokens.push(Token {
                    span: start..end,
                    directive,
                });
                cursor = end;
            }
            // `{{{{Name}}` style runs: retry from the next character
            None => cursor = start + next_char_len(&text[start..]),
        }
    }
    tokens
}

fn next_char_len(s: &str) -> usize {
    s.chars().next().map_or(1, char::len_utf8)
}

fn parse_directive(inner: &str) -> Option<Directive> {
    let inner = inner.trim();
    if inner == "end" {
        return Some(Directive::End);
    }
    if let Some(rest) = inner.strip_prefix("range") {
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with(char::is_whitespace) {
            return parse_name(rest.trim()).map(Directive::Range);
        }
    }
    parse_name(inner).map(Directive::Field)
}

/// Accept `.`, `$index`, `$number`, and dot paths with an optional leading dot
fn parse_name(name: &str) -> Option<String> {
    if name == "." || name == "$index" || name == "$number" {
        return Some(name.to_string());
    }
    let path = name.strip_prefix('.').unwrap_or(name);
    let valid = !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        });
    valid.then(|| path.to_string())
}
