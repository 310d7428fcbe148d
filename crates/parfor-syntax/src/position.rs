//! Conversion from Tree-sitter positions to core span types.

use parfor_core::{LineCol, Span};

/// Converts a Tree-sitter point to a zero-based [`LineCol`].
#[must_use]
pub(crate) fn point_to_line_col(pos: tree_sitter::Point) -> LineCol {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column).unwrap_or(u32::MAX);
    LineCol::new(line, column)
}

/// Returns the span covered by `node`.
#[must_use]
pub(crate) fn node_span(node: tree_sitter::Node<'_>) -> Span {
    Span::new(
        node.start_byte(),
        node.end_byte(),
        point_to_line_col(node.start_position()),
        point_to_line_col(node.end_position()),
    )
}

/// Returns the source text covered by `node`, or an empty string when the
/// node does not lie on character boundaries of `source`.
#[must_use]
pub(crate) fn node_text<'s>(node: tree_sitter::Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}
