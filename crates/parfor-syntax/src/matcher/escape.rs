//! Body-scoped queries for statements that escape a loop iteration.
//!
//! A query walks the body of one annotated loop and returns every statement
//! of the requested kind that would transfer control out of the current
//! iteration:
//!
//! - `return` and `goto` always escape.
//! - `break` escapes unless an inner loop or `switch` encloses it.
//! - `continue` escapes unless an inner loop encloses it.
//!
//! Lambdas, local functions and local classes are opaque. Inner annotated
//! loops are skipped; they are matched and classified on their own.

use std::fmt;

use parfor_core::DiagnosticCode;
use tree_sitter::Node;

use crate::annotation::{attributed_inner, find_parallel_attribute};
use crate::views::StatementView;

/// The statements that escape a parallel loop body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `return`
    Return,
    /// `goto`
    Goto,
}

impl EscapeKind {
    /// Every escape kind, in the order queries run.
    pub const ALL: [Self; 4] = [Self::Break, Self::Continue, Self::Return, Self::Goto];

    /// Returns the keyword that introduces the statement.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Return => "return",
            Self::Goto => "goto",
        }
    }

    /// Returns the diagnostic code reported for an occurrence.
    #[must_use]
    pub const fn code(self) -> DiagnosticCode {
        match self {
            Self::Break => DiagnosticCode::UnexpectedBreak,
            Self::Continue => DiagnosticCode::UnexpectedContinue,
            Self::Return => DiagnosticCode::UnexpectedReturn,
            Self::Goto => DiagnosticCode::UnexpectedGoto,
        }
    }

    const fn node_kind(self) -> &'static str {
        match self {
            Self::Break => "break_statement",
            Self::Continue => "continue_statement",
            Self::Return => "return_statement",
            Self::Goto => "goto_statement",
        }
    }
}

impl fmt::Display for EscapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Which enclosing constructs sit between a node and the parallel loop.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    in_loop: bool,
    in_switch: bool,
}

impl Scope {
    const fn escapes(self, kind: EscapeKind) -> bool {
        match kind {
            EscapeKind::Break => !self.in_loop && !self.in_switch,
            EscapeKind::Continue => !self.in_loop,
            EscapeKind::Return | EscapeKind::Goto => true,
        }
    }

    fn enter(self, node: Node<'_>) -> Self {
        match node.kind() {
            "for_statement" | "for_range_loop" | "while_statement" | "do_statement" => Self {
                in_loop: true,
                ..self
            },
            "switch_statement" => Self {
                in_switch: true,
                ..self
            },
            _ => self,
        }
    }
}

fn is_opaque(node: Node<'_>, source: &str) -> bool {
    match node.kind() {
        "lambda_expression" | "function_definition" | "class_specifier" | "struct_specifier"
        | "union_specifier" => true,
        "attributed_statement" => {
            find_parallel_attribute(node, source).is_some()
                && attributed_inner(node).is_some_and(|inner| inner.kind() == "for_range_loop")
        }
        _ => false,
    }
}

/// Returns every `kind` statement in `body` that escapes the iteration, in
/// source order.
#[must_use]
pub fn find_escapes(body: StatementView<'_>, kind: EscapeKind) -> Vec<StatementView<'_>> {
    let source = body.source();
    let mut found = Vec::new();
    let mut stack = vec![(body.node(), Scope::default())];

    while let Some((node, scope)) = stack.pop() {
        if node.kind() == kind.node_kind() && scope.escapes(kind) {
            found.push(StatementView::new(node, source));
        }
        if is_opaque(node, source) {
            continue;
        }

        let inner = scope.enter(node);
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, inner)));
    }

    found
}
