//! Recognition and placement validation of the `[[parallel]]` attribute.
//!
//! Every `parallel` attribute in a tree is an annotation site. A site is
//! valid only when the statement it annotates is a range-based `for` loop;
//! validation runs as part of [`SourceUnit::parse`](crate::SourceUnit::parse)
//! so every parsed unit carries its verdicts.

use std::fmt;

use parfor_core::Span;
use tree_sitter::Node;

use crate::parser::ParseResult;
use crate::position::{node_span, node_text};

/// Name of the attribute that marks a loop as parallelisable.
pub const PARALLEL_ATTRIBUTE: &str = "parallel";

/// Kind of the statement an annotation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum StatementKind {
    /// Range-based `for` loop, the only valid target.
    RangeFor,
    /// Classic three-clause `for` loop.
    For,
    /// `while` loop.
    While,
    /// `do ... while` loop.
    Do,
    /// `if` statement.
    If,
    /// `switch` statement.
    Switch,
    /// Braced block.
    Compound,
    /// Declaration such as `int x;`.
    Declaration,
    /// Function definition.
    FunctionDefinition,
    /// Expression statement.
    Expression,
    /// `return` statement.
    Return,
    /// `break` statement.
    Break,
    /// `continue` statement.
    Continue,
    /// `goto` statement.
    Goto,
    /// Labelled statement.
    Labeled,
    /// `try` block.
    Try,
    /// Any other grammar construct, named by its raw node kind.
    Other(&'static str),
}

impl StatementKind {
    /// Classifies a Tree-sitter node kind.
    #[must_use]
    pub fn from_node_kind(kind: &'static str) -> Self {
        match kind {
            "for_range_loop" => Self::RangeFor,
            "for_statement" => Self::For,
            "while_statement" => Self::While,
            "do_statement" => Self::Do,
            "if_statement" => Self::If,
            "switch_statement" => Self::Switch,
            "compound_statement" => Self::Compound,
            "declaration" => Self::Declaration,
            "function_definition" => Self::FunctionDefinition,
            "expression_statement" => Self::Expression,
            "return_statement" => Self::Return,
            "break_statement" => Self::Break,
            "continue_statement" => Self::Continue,
            "goto_statement" => Self::Goto,
            "labeled_statement" => Self::Labeled,
            "try_statement" => Self::Try,
            other => Self::Other(other),
        }
    }

    /// Returns the human-readable name used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::RangeFor => "for-range loop",
            Self::For => "for statement",
            Self::While => "while statement",
            Self::Do => "do statement",
            Self::If => "if statement",
            Self::Switch => "switch statement",
            Self::Compound => "compound statement",
            Self::Declaration => "declaration",
            Self::FunctionDefinition => "function definition",
            Self::Expression => "expression statement",
            Self::Return => "return statement",
            Self::Break => "break statement",
            Self::Continue => "continue statement",
            Self::Goto => "goto statement",
            Self::Labeled => "labeled statement",
            Self::Try => "try statement",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One `[[parallel]]` occurrence and the statement it annotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSite {
    attribute: Span,
    statement: Span,
    kind: StatementKind,
}

impl AnnotationSite {
    /// Returns the span of the `parallel` attribute.
    #[must_use]
    pub const fn attribute(&self) -> Span {
        self.attribute
    }

    /// Returns the span of the annotated statement.
    #[must_use]
    pub const fn statement(&self) -> Span {
        self.statement
    }

    /// Returns the kind of the annotated statement.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns `true` when the annotation sits on a range-based `for` loop.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.kind == StatementKind::RangeFor
    }
}

/// Returns `true` for an unprefixed `parallel` attribute.
pub(crate) fn is_parallel_attribute(node: Node<'_>, source: &str) -> bool {
    node.kind() == "attribute"
        && node.child_by_field_name("prefix").is_none()
        && node
            .child_by_field_name("name")
            .is_some_and(|name| node_text(name, source) == PARALLEL_ATTRIBUTE)
}

/// Returns the first `parallel` attribute among `owner`'s attribute lists.
pub(crate) fn find_parallel_attribute<'t>(owner: Node<'t>, source: &str) -> Option<Node<'t>> {
    let mut cursor = owner.walk();
    owner
        .children(&mut cursor)
        .filter(|child| child.kind() == "attribute_declaration")
        .find_map(|declaration| {
            let mut inner = declaration.walk();
            declaration
                .named_children(&mut inner)
                .find(|attribute| is_parallel_attribute(*attribute, source))
        })
}

/// Returns the statement wrapped by an `attributed_statement`.
pub(crate) fn attributed_inner<'t>(attributed: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = attributed.walk();
    attributed
        .named_children(&mut cursor)
        .filter(|child| !matches!(child.kind(), "attribute_declaration" | "comment"))
        .last()
}

/// Resolves the construct an attribute is attached to.
fn annotated_target(attribute: Node<'_>) -> Option<Node<'_>> {
    let owner = attribute.parent()?.parent()?;
    if owner.kind() == "attributed_statement" {
        attributed_inner(owner)
    } else {
        Some(owner)
    }
}

/// Validates the placement of every `parallel` attribute in `parsed`.
///
/// Sites are returned in source order.
#[must_use]
pub fn validate_annotations(parsed: &ParseResult) -> Vec<AnnotationSite> {
    let source = parsed.source();
    let mut sites = Vec::new();
    let mut stack = vec![parsed.root_node()];

    while let Some(node) = stack.pop() {
        if is_parallel_attribute(node, source) {
            if let Some(target) = annotated_target(node) {
                sites.push(AnnotationSite {
                    attribute: node_span(node),
                    statement: node_span(target),
                    kind: StatementKind::from_node_kind(target.kind()),
                });
            }
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    sites
}
