//! Typed, role-scoped views over borrowed syntax nodes.
//!
//! Views never own or mutate the tree; they pair a node with the text it was
//! parsed from so callers can read spans and source text without reaching
//! for raw Tree-sitter APIs.

use parfor_core::Span;
use tree_sitter::Node;

use crate::annotation::StatementKind;
use crate::error::SyntaxError;
use crate::position::{node_span, node_text};

/// A statement in the tree.
#[derive(Debug, Clone, Copy)]
pub struct StatementView<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> StatementView<'t> {
    pub(crate) const fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    /// Returns the underlying node.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.node
    }

    pub(crate) const fn source(&self) -> &'t str {
        self.source
    }

    /// Classifies the statement.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        StatementKind::from_node_kind(self.node.kind())
    }

    /// Returns `true` for a braced block.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.node.kind() == "compound_statement"
    }

    /// Returns the statement's source text.
    #[must_use]
    pub fn text(&self) -> &'t str {
        node_text(self.node, self.source)
    }

    /// Returns the statement's span.
    #[must_use]
    pub fn span(&self) -> Span {
        node_span(self.node)
    }
}

/// An expression in the tree.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionView<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> ExpressionView<'t> {
    pub(crate) const fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    /// Returns the underlying node.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.node
    }

    /// Returns the expression's source text, verbatim.
    #[must_use]
    pub fn text(&self) -> &'t str {
        node_text(self.node, self.source)
    }

    /// Returns the expression's span.
    #[must_use]
    pub fn span(&self) -> Span {
        node_span(self.node)
    }
}

/// The loop variable declaration of a range-based `for`.
///
/// Covers the source from the first declaration specifier through the `:`
/// range separator, when the separator is present.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationView<'t> {
    declarator: Node<'t>,
    source: &'t str,
    start: usize,
    separator_end: Option<usize>,
}

impl<'t> DeclarationView<'t> {
    /// Returns the declarator node (the bound name, possibly with `&`).
    #[must_use]
    pub const fn declarator(&self) -> Node<'t> {
        self.declarator
    }

    /// Returns the declaration text including the trailing separator.
    #[must_use]
    pub fn text(&self) -> &'t str {
        let end = self.separator_end.unwrap_or_else(|| self.declarator.end_byte());
        self.source.get(self.start..end).unwrap_or_default()
    }

    /// Returns the declaration text with exactly one trailing `:` removed and
    /// the whitespace before it trimmed, e.g. `auto &i :` becomes `auto &i`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Rewrite`] when the declaration has no range
    /// separator.
    pub fn text_without_separator(&self) -> Result<&'t str, SyntaxError> {
        if self.separator_end.is_none() {
            return Err(SyntaxError::rewrite(
                "range-for declaration has no ':' separator",
            ));
        }
        self.text()
            .strip_suffix(':')
            .map(str::trim_end)
            .ok_or_else(|| SyntaxError::rewrite("range-for declaration does not end in ':'"))
    }
}

/// A range-based `for` loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopView<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> LoopView<'t> {
    /// Wraps `node` when it is a range-based `for` loop.
    #[must_use]
    pub fn new(node: Node<'t>, source: &'t str) -> Option<Self> {
        (node.kind() == "for_range_loop").then_some(Self { node, source })
    }

    /// Returns the underlying node.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.node
    }

    /// Returns the loop's span.
    #[must_use]
    pub fn span(&self) -> Span {
        node_span(self.node)
    }

    /// Returns the C++20 init-statement, when present.
    #[must_use]
    pub fn init_statement(&self) -> Option<StatementView<'t>> {
        self.node
            .child_by_field_name("initializer")
            .map(|n| StatementView::new(n, self.source))
    }

    /// Returns the range expression after the `:`.
    #[must_use]
    pub fn iterable(&self) -> Option<ExpressionView<'t>> {
        self.node
            .child_by_field_name("right")
            .map(|n| ExpressionView::new(n, self.source))
    }

    /// Returns the loop body.
    #[must_use]
    pub fn body(&self) -> Option<StatementView<'t>> {
        self.node
            .child_by_field_name("body")
            .map(|n| StatementView::new(n, self.source))
    }

    /// Returns the loop variable declaration.
    #[must_use]
    pub fn variable(&self) -> Option<DeclarationView<'t>> {
        let declarator = self.node.child_by_field_name("declarator")?;
        let mut start = None;
        let mut separator_end = None;
        let mut inside_parens = false;

        let mut cursor = self.node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if !inside_parens {
                    inside_parens = child.kind() == "(";
                } else if start.is_none() && cursor.field_name() != Some("initializer") {
                    start = Some(child.start_byte());
                } else if start.is_some() && child.kind() == ":" {
                    separator_end = Some(child.end_byte());
                    break;
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        Some(DeclarationView {
            declarator,
            source: self.source,
            start: start.unwrap_or_else(|| declarator.start_byte()),
            separator_end,
        })
    }
}
