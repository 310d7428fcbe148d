//! Rewrite rule engine for accepted parallel loops.
//!
//! A [`RewriteRule`] holds a replacement template over three bound
//! sub-nodes of an [`AnnotatedLoopMatch`]:
//!
//! - `$RANGE` is the range expression, verbatim.
//! - `$VAR` is the loop variable declaration without its `:` separator.
//! - `$BODY` is the braced loop body, verbatim.
//!
//! A [`Rewriter`] turns matches from one [`SourceUnit`] into
//! [`RewriteEdit`]s and adds the `<algorithm>` and `<execution>` includes
//! the first time it rewrites a loop in that file.

use std::path::PathBuf;

use parfor_core::RewriteEdit;
use tracing::debug;
use tree_sitter::Node;

use crate::error::SyntaxError;
use crate::matcher::AnnotatedLoopMatch;
use crate::metavariables::{Segment, template_segments};
use crate::position::node_text;
use crate::unit::SourceUnit;

const REWRITE_TARGET: &str = "parfor::rewrite";

/// Replacement producing a `std::for_each` call with the parallel execution
/// policy.
pub const PARALLEL_FOR_EACH_TEMPLATE: &str = "std::for_each(std::execution::par, \
    std::begin($RANGE), std::end($RANGE), [&]($VAR) $BODY);";

/// Headers the parallel replacement depends on, in insertion order.
pub const REQUIRED_HEADERS: [&str; 2] = ["algorithm", "execution"];

const TEMPLATE_VARIABLES: [&str; 3] = ["RANGE", "VAR", "BODY"];

/// A validated replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    replacement: String,
    segments: Vec<Segment>,
}

impl RewriteRule {
    /// Creates a rule from a replacement template.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidReplacement`] when the template
    /// references a metavariable other than `$RANGE`, `$VAR` or `$BODY`.
    pub fn new(replacement: impl Into<String>) -> Result<Self, SyntaxError> {
        let replacement = replacement.into();
        let segments = template_segments(&replacement);

        for segment in &segments {
            if let Segment::Var(name) = segment {
                if !TEMPLATE_VARIABLES.contains(&name.as_str()) {
                    return Err(SyntaxError::invalid_replacement(format!(
                        "replacement references undefined metavariable: ${name}"
                    )));
                }
            }
        }

        Ok(Self {
            replacement,
            segments,
        })
    }

    /// Returns the rule that rewrites to a parallel `std::for_each`.
    #[must_use]
    pub fn parallel_for_each() -> Self {
        Self {
            replacement: String::from(PARALLEL_FOR_EACH_TEMPLATE),
            segments: template_segments(PARALLEL_FOR_EACH_TEMPLATE),
        }
    }

    /// Returns the replacement template.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Renders the template for one match.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Rewrite`] when the loop variable declaration
    /// has no range separator.
    pub fn render(&self, found: &AnnotatedLoopMatch<'_>) -> Result<String, SyntaxError> {
        let range = found.iterable().text();
        let var = found.variable().text_without_separator()?;
        let body = found.body().text();

        let mut out = String::with_capacity(self.replacement.len() + body.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => out.push_str(match name.as_str() {
                    "RANGE" => range,
                    "VAR" => var,
                    _ => body,
                }),
            }
        }
        Ok(out)
    }
}

impl Default for RewriteRule {
    fn default() -> Self {
        Self::parallel_for_each()
    }
}

/// One top-level `#include` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IncludeLine {
    start: usize,
    /// Offset just past the line terminator, or the end of the file.
    end: usize,
    terminator: Option<&'static str>,
}

/// Top-level includes of a file, the headers still missing, and the line
/// terminator used by the file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderPlan {
    includes: Vec<IncludeLine>,
    line_ending: &'static str,
    missing: Vec<&'static str>,
}

impl HeaderPlan {
    fn for_unit(unit: &SourceUnit) -> Self {
        let source = unit.source();
        let root = unit.parsed().root_node();

        let mut present = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "preproc_include" {
                if let Some(path) = node.child_by_field_name("path") {
                    present.push(include_name(node_text(path, source)));
                }
                continue;
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }

        let mut cursor = root.walk();
        let includes = root
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "preproc_include")
            .map(|include| include_line(source, include))
            .collect();

        Self {
            includes,
            line_ending: if source.contains("\r\n") { "\r\n" } else { "\n" },
            missing: REQUIRED_HEADERS
                .into_iter()
                .filter(|header| !present.contains(header))
                .collect(),
        }
    }

    /// Renders the missing includes so that they precede the byte offset
    /// `first_use`.
    ///
    /// The block goes after the last top-level include that starts before
    /// `first_use`, or at the start of the file when there is none.
    fn insertion(&self, first_use: usize) -> Option<(usize, String)> {
        if self.missing.is_empty() {
            return None;
        }
        let anchor = self
            .includes
            .iter()
            .rev()
            .find(|line| line.start < first_use);
        let (offset, eol, mut text) = match anchor {
            None => (0, self.line_ending, String::new()),
            Some(line) => match line.terminator {
                Some(eol) => (line.end, eol, String::new()),
                None => (line.end, self.line_ending, String::from(self.line_ending)),
            },
        };
        for header in &self.missing {
            text.push_str("#include <");
            text.push_str(header);
            text.push('>');
            text.push_str(eol);
        }
        Some((offset, text))
    }
}

fn include_line(source: &str, include: Node<'_>) -> IncludeLine {
    let start = include.start_byte();
    let newline = source.get(start..).and_then(|rest| rest.find('\n'));
    match newline {
        Some(at) => {
            let crlf = at > 0 && source.as_bytes().get(start + at - 1) == Some(&b'\r');
            IncludeLine {
                start,
                end: start + at + 1,
                terminator: Some(if crlf { "\r\n" } else { "\n" }),
            }
        }
        None => IncludeLine {
            start,
            end: source.len(),
            terminator: None,
        },
    }
}

fn include_name(path: &str) -> &str {
    path.trim().trim_matches(|c| matches!(c, '<' | '>' | '"'))
}

/// Summary of the edits produced for one file.
#[derive(Debug, Clone, Default)]
pub struct RewriteResult {
    edits: Vec<RewriteEdit>,
    num_replacements: usize,
}

impl RewriteResult {
    /// Returns the edits, header insertions included.
    #[must_use]
    pub fn edits(&self) -> &[RewriteEdit] {
        &self.edits
    }

    /// Returns the number of loops rewritten.
    #[must_use]
    pub const fn num_replacements(&self) -> usize {
        self.num_replacements
    }

    /// Returns whether any loop was rewritten.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.num_replacements > 0
    }

    /// Consumes the result, returning the edits.
    #[must_use]
    pub fn into_edits(self) -> Vec<RewriteEdit> {
        self.edits
    }
}

/// Accumulates rewrites for the loops of one [`SourceUnit`].
#[derive(Debug)]
pub struct Rewriter<'r> {
    rule: &'r RewriteRule,
    path: PathBuf,
    headers: HeaderPlan,
    first_rewrite: Option<usize>,
    result: RewriteResult,
}

impl<'r> Rewriter<'r> {
    /// Creates a rewriter for `unit` using `rule`.
    #[must_use]
    pub fn new(rule: &'r RewriteRule, unit: &SourceUnit) -> Self {
        Self {
            rule,
            path: unit.path().to_path_buf(),
            headers: HeaderPlan::for_unit(unit),
            first_rewrite: None,
            result: RewriteResult::default(),
        }
    }

    /// Replaces the whole annotated statement of `found` with the rendered
    /// template.
    ///
    /// Missing include directives are scheduled once, by
    /// [`Rewriter::finish`], ahead of the earliest rewritten statement.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Rewrite`] when the template cannot be
    /// rendered for this loop; no edit is recorded in that case.
    pub fn rewrite(&mut self, found: &AnnotatedLoopMatch<'_>) -> Result<(), SyntaxError> {
        let replacement = self.rule.render(found)?;

        let range = found.statement().span().byte_range();
        self.first_rewrite = Some(
            self.first_rewrite
                .map_or(range.start, |first| first.min(range.start)),
        );
        debug!(
            target: REWRITE_TARGET,
            path = %self.path.display(),
            start = range.start,
            end = range.end,
            "rewriting parallel loop"
        );
        self.result
            .edits
            .push(RewriteEdit::replace(self.path.clone(), range, replacement));
        self.result.num_replacements = self.result.num_replacements.saturating_add(1);
        Ok(())
    }

    /// Returns the number of loops rewritten so far.
    #[must_use]
    pub const fn rewrites(&self) -> usize {
        self.result.num_replacements
    }

    /// Finishes the file, returning its edits.
    ///
    /// When at least one loop was rewritten, the result also carries the
    /// insertion of any include directive the file still lacks.
    #[must_use]
    pub fn finish(mut self) -> RewriteResult {
        let headers = self
            .first_rewrite
            .and_then(|first| self.headers.insertion(first));
        if let Some((offset, text)) = headers {
            self.result
                .edits
                .push(RewriteEdit::insert_at(self.path.clone(), offset, text));
        }
        self.result
    }
}
