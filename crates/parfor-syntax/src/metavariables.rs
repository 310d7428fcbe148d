//! Metavariable name rules for rewrite templates.
//!
//! Templates reference bound sub-nodes as `$NAME`. Names start with an ASCII
//! uppercase letter or `_` and continue with uppercase letters, digits or `_`.

use std::iter::Peekable;
use std::str::CharIndices;

const fn is_valid_start_char(c: char) -> bool {
    c.is_ascii_uppercase() || c == '_'
}

const fn is_valid_continuation_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

/// Reads a metavariable name from a stream positioned just after `$`.
///
/// Returns an empty string if the next character cannot start a name.
pub(crate) fn extract_metavar_name(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut name = String::new();

    let Some((_, first_char)) = chars.peek().copied() else {
        return name;
    };
    if !is_valid_start_char(first_char) {
        return name;
    }

    name.push(first_char);
    chars.next();

    while let Some((_, c)) = chars.peek().copied() {
        if !is_valid_continuation_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }

    name
}

/// Splits a template into literal text and metavariable references.
pub(crate) fn template_segments(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if ch != '$' {
            literal.push(ch);
            continue;
        }
        let name = extract_metavar_name(&mut chars);
        if name.is_empty() {
            literal.push('$');
            continue;
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Var(name));
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Var(String),
}
