//! Escape classification for matched loops.

use std::path::Path;

use parfor_core::{DiagnosticCode, SourceLocation};

use crate::matcher::{AnnotatedLoopMatch, EscapeKind, find_escapes};
use crate::position::node_span;

/// One escaping statement found in a parallel loop body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeViolation {
    kind: EscapeKind,
    location: SourceLocation,
}

impl EscapeViolation {
    /// Returns the kind of escape.
    #[must_use]
    pub const fn kind(&self) -> EscapeKind {
        self.kind
    }

    /// Returns the location of the statement's keyword.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Returns the diagnostic code the violation is reported under.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.kind.code()
    }
}

/// Runs every escape query against the body of `found`.
///
/// Each occurrence becomes its own violation; the result is in source
/// order. An empty result means the loop may be rewritten.
#[must_use]
pub fn classify_escapes(found: &AnnotatedLoopMatch<'_>, path: &Path) -> Vec<EscapeViolation> {
    let mut violations: Vec<EscapeViolation> = EscapeKind::ALL
        .into_iter()
        .flat_map(|kind| {
            find_escapes(found.body(), kind)
                .into_iter()
                .map(move |statement| {
                    let node = statement.node();
                    let keyword = node.child(0).unwrap_or(node);
                    EscapeViolation {
                        kind,
                        location: SourceLocation::new(path, node_span(keyword)),
                    }
                })
        })
        .collect();
    violations.sort_by_key(|v| v.location.span().start_byte());
    violations
}
