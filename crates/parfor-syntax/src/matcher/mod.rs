//! Structural matching of annotated range-based `for` loops.
//!
//! [`AnnotatedLoops`] is a lazy, finite pre-order walk over a parsed tree
//! that yields one [`AnnotatedLoopMatch`] per `attributed_statement` that
//! both carries the `parallel` attribute and wraps a range-based `for`.
//! Annotations on anything else never match here; they are reported by
//! [`validate_annotations`](crate::validate_annotations) instead.
//!
//! The iterator is `Clone`, and a fresh walk can be started at any time
//! from [`SourceUnit::annotated_loops`](crate::SourceUnit::annotated_loops).

mod escape;

use parfor_core::Span;
use tree_sitter::Node;

use crate::annotation::{attributed_inner, find_parallel_attribute};
use crate::position::node_span;
use crate::views::{DeclarationView, ExpressionView, LoopView, StatementView};

pub use escape::{EscapeKind, find_escapes};

/// An annotated range-based `for` loop with its sub-nodes bound by role.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedLoopMatch<'t> {
    annotation: Node<'t>,
    statement: StatementView<'t>,
    loop_view: LoopView<'t>,
    variable: DeclarationView<'t>,
    iterable: ExpressionView<'t>,
    body: StatementView<'t>,
}

impl<'t> AnnotatedLoopMatch<'t> {
    /// Matches `node` when it is an annotated range-based `for` loop whose
    /// declaration, range and body are all present.
    #[must_use]
    pub fn from_node(node: Node<'t>, source: &'t str) -> Option<Self> {
        if node.kind() != "attributed_statement" {
            return None;
        }
        let annotation = find_parallel_attribute(node, source)?;
        let loop_view = LoopView::new(attributed_inner(node)?, source)?;
        Some(Self {
            annotation,
            statement: StatementView::new(node, source),
            variable: loop_view.variable()?,
            iterable: loop_view.iterable()?,
            body: loop_view.body()?,
            loop_view,
        })
    }

    /// Returns the span of the `parallel` attribute.
    #[must_use]
    pub fn annotation_span(&self) -> Span {
        node_span(self.annotation)
    }

    /// Returns the whole annotated statement, attributes included.
    ///
    /// This is the text a rewrite replaces.
    #[must_use]
    pub const fn statement(&self) -> StatementView<'t> {
        self.statement
    }

    /// Returns the loop itself.
    #[must_use]
    pub const fn loop_view(&self) -> LoopView<'t> {
        self.loop_view
    }

    /// Returns the loop variable declaration.
    #[must_use]
    pub const fn variable(&self) -> DeclarationView<'t> {
        self.variable
    }

    /// Returns the range expression.
    #[must_use]
    pub const fn iterable(&self) -> ExpressionView<'t> {
        self.iterable
    }

    /// Returns the loop body.
    #[must_use]
    pub const fn body(&self) -> StatementView<'t> {
        self.body
    }

    /// Returns `true` when `other` lies strictly within this loop's body.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.body_contains(other.statement.span())
    }

    /// Returns `true` when `span` lies within this loop's body.
    #[must_use]
    pub fn body_contains(&self, span: Span) -> bool {
        let outer = self.body.span().byte_range();
        let inner = span.byte_range();
        outer.start <= inner.start && inner.end <= outer.end
    }
}

/// Lazy pre-order iterator over the annotated loops of a tree.
#[derive(Debug, Clone)]
pub struct AnnotatedLoops<'t> {
    source: &'t str,
    stack: Vec<Node<'t>>,
}

impl<'t> AnnotatedLoops<'t> {
    /// Starts a walk at `root`.
    #[must_use]
    pub fn new(root: Node<'t>, source: &'t str) -> Self {
        Self {
            source,
            stack: vec![root],
        }
    }
}

impl<'t> Iterator for AnnotatedLoops<'t> {
    type Item = AnnotatedLoopMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let mut cursor = node.walk();
            let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
            self.stack.extend(children.into_iter().rev());

            if let Some(found) = AnnotatedLoopMatch::from_node(node, self.source) {
                return Some(found);
            }
        }
        None
    }
}
