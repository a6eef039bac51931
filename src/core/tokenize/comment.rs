//! Metadata comments.
//!
//! Supported forms (body of a `//` or `/* */` comment):
//! - `: text` - extra comment for the next message
//! - `= id` - message id for the next message
//! - `~ key value` - free-form annotation for the next message
//! - `% "text" ...` - source text for the next id-based message
//! - `TRANSLATOR Context comment` - a comment describing a whole context

use crate::issues::DiagnosticKind;

const TRANSLATOR_MARKER: &str = "TRANSLATOR";

/// Parsed metadata comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaComment {
    ExtraComment(String),
    Id(String),
    Extra {
        key: String,
        value: String,
    },
    /// Quoted strings concatenated with their escapes still encoded.
    SourceText {
        text: String,
        errors: Vec<DiagnosticKind>,
    },
    Translator {
        context: String,
        comment: String,
    },
}

impl MetaComment {
    /// Parse a comment body. Returns None for ordinary comments.
    pub fn parse(body: &str) -> Option<Self> {
        let mut chars = body.chars();
        let marker = chars.next()?;
        let second = chars.next();
        let rest = chars.as_str();
        let tagged = second.is_some_and(char::is_whitespace);

        match marker {
            ':' if tagged => Some(Self::ExtraComment(rest.to_string())),
            '=' if tagged => Some(Self::Id(simplified(rest))),
            '~' if tagged => {
                let text = rest.trim();
                let (key, value) = text.split_once(' ')?;
                Some(Self::Extra {
                    key: key.to_string(),
                    value: strip_quotes(value.trim()).to_string(),
                })
            }
            '%' if tagged => Some(parse_meta_string(rest)),
            _ => {
                let rest = body
                    .trim_start_matches([' ', '\t', '\n'])
                    .strip_prefix(TRANSLATOR_MARKER)?;
                let text = simplified(rest);
                let (context, comment) = text.split_once(' ')?;
                Some(Self::Translator {
                    context: context.to_string(),
                    comment: comment.to_string(),
                })
            }
        }
    }
}

/// Human-readable text for a meta string problem.
pub fn describe(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::UnexpectedMetaCharacter => "Unexpected character in meta string",
        _ => "Unterminated meta string",
    }
}

/// Trim and collapse inner whitespace runs into single spaces.
pub fn simplified(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_quotes(value: &str) -> &str {
    if value.len() != 1 {
        if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            return inner;
        }
    }
    value
}

fn parse_meta_string(rest: &str) -> MetaComment {
    let mut text = String::new();
    let mut errors = Vec::new();
    let mut chars = rest.chars();

    'outer: while let Some(c) = chars.next() {
        if c.is_ascii_whitespace() {
            continue;
        }
        if c != '"' {
            errors.push(DiagnosticKind::UnexpectedMetaCharacter);
            break;
        }
        loop {
            match chars.next() {
                None => {
                    errors.push(DiagnosticKind::UnterminatedMetaString);
                    break 'outer;
                }
                Some('"') => break,
                Some('\\') => match chars.next() {
                    None | Some('\n') => {
                        errors.push(DiagnosticKind::UnterminatedMetaString);
                        break;
                    }
                    Some(escaped) => {
                        text.push('\\');
                        text.push(escaped);
                    }
                },
                Some(other) => text.push(other),
            }
        }
    }

    MetaComment::SourceText { text, errors }
}
