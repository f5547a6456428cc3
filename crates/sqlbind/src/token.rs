//! Delimiter-class tokenizer for SQL templates.
//!
//! Statements are split on `=`, `!=`, `<`, `>`, `,`, parentheses and
//! whitespace so that identifier boundaries line up with token boundaries
//! without a SQL grammar. `<=` and `>=` fall out of `<`, `>` and `=` each
//! being delimiters on their own; `!` only delimits when paired with `=`.
//! Table and column extraction downstream depends on exactly this delimiter
//! set.

use std::ops::Range;

/// One word of a SQL template, carrying an uppercased mirror for keyword and
/// identifier comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    original: String,
    upper: String,
}

impl Token {
    fn new(original: &str) -> Self {
        Self {
            original: original.to_string(),
            upper: original.to_uppercase(),
        }
    }

    /// The token text as written in the template.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The token text uppercased.
    pub fn upper(&self) -> &str {
        &self.upper
    }

    /// The placeholder name if this token is a `:name` placeholder.
    pub fn placeholder_name(&self) -> Option<&str> {
        let rest = self.original.strip_prefix(':')?;
        is_identifier(rest).then_some(rest)
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder_name().is_some()
    }
}

/// Splits a raw statement into word tokens, discarding the delimiters and
/// dropping empty segments. A statement with no words yields an empty
/// sequence; rejection is the classifier's job.
pub fn tokenize(sql: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = sql.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        let boundary = if is_delimiter(c) {
            true
        } else if c == '!' && matches!(chars.peek(), Some((_, '='))) {
            chars.next();
            true
        } else {
            false
        };
        if boundary {
            if let Some(s) = start.take() {
                tokens.push(Token::new(&sql[s..idx]));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        tokens.push(Token::new(&sql[s..]));
    }
    tokens
}

/// Byte spans of every `:name` placeholder in a raw statement, in order of
/// appearance, paired with the placeholder name.
pub(crate) fn placeholder_spans(sql: &str) -> Vec<(Range<usize>, &str)> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            let name_start = i + 1;
            if name_start < bytes.len() && is_identifier_start(bytes[name_start]) {
                let mut end = name_start + 1;
                while end < bytes.len() && is_identifier_part(bytes[end]) {
                    end += 1;
                }
                spans.push((i..end, &sql[name_start..end]));
                i = end;
                continue;
            }
        }
        i += 1;
    }
    spans
}

/// Whether the raw statement contains at least one named placeholder.
pub fn has_placeholders(sql: &str) -> bool {
    !placeholder_spans(sql).is_empty()
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | ',' | '(' | ')') || c.is_whitespace()
}

fn is_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(&b) if is_identifier_start(b) => {}
        _ => return false,
    }
    bytes[1..].iter().all(|&b| is_identifier_part(b))
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_identifier_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
