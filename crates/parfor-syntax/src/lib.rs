//! Tree-sitter powered matching and rewriting of `[[parallel]]` loops.
//!
//! This crate reads C++ sources and provides the syntactic half of the
//! parallel-loop transform:
//!
//! - **Annotation validation** via [`SourceUnit::parse`], which records
//!   every `[[parallel]]` attribute and the kind of statement it sits on
//! - **Loop matching** via [`AnnotatedLoops`], a lazy walk yielding one
//!   [`AnnotatedLoopMatch`] per annotated range-based `for`
//! - **Escape classification** via [`classify_escapes`], which reports every
//!   `break`, `continue`, `return` or `goto` that leaves the iteration
//! - **Rewriting** via [`Rewriter`], which turns accepted loops into
//!   `std::for_each(std::execution::par, ...)` calls
//!
//! # Example
//!
//! ```
//! use parfor_syntax::{RewriteRule, Rewriter, SourceUnit, classify_escapes};
//!
//! let source = "void f(int *v) { [[parallel]] for (auto &i : v) { i *= 2; } }";
//! let unit = SourceUnit::parse("f.cpp", source)?;
//! let rule = RewriteRule::default();
//! let mut rewriter = Rewriter::new(&rule, &unit);
//!
//! for found in unit.annotated_loops() {
//!     if classify_escapes(&found, unit.path()).is_empty() {
//!         rewriter.rewrite(&found)?;
//!     }
//! }
//! assert!(rewriter.finish().has_changes());
//! # Ok::<(), parfor_syntax::SyntaxError>(())
//! ```

mod annotation;
mod classifier;
mod error;
mod language;
mod matcher;
mod metavariables;
mod parser;
mod position;
mod rewriter;
mod unit;
mod views;

pub use annotation::{AnnotationSite, PARALLEL_ATTRIBUTE, StatementKind, validate_annotations};
pub use classifier::{EscapeViolation, classify_escapes};
pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use matcher::{AnnotatedLoopMatch, AnnotatedLoops, EscapeKind, find_escapes};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use rewriter::{
    PARALLEL_FOR_EACH_TEMPLATE, REQUIRED_HEADERS, RewriteResult, RewriteRule, Rewriter,
};
pub use unit::SourceUnit;
pub use views::{DeclarationView, ExpressionView, LoopView, StatementView};

#[cfg(test)]
mod tests;
