//! A parsed translation unit with its annotation verdicts.

use std::path::{Path, PathBuf};

use parfor_core::{SourceDigest, SourceLocation, Span};
use tracing::debug;

use crate::annotation::{AnnotationSite, validate_annotations};
use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::matcher::AnnotatedLoops;
use crate::parser::{ParseResult, Parser, SyntaxErrorInfo};

const SYNTAX_TARGET: &str = "parfor::syntax";

/// One source file, parsed and checked for misplaced annotations.
///
/// The unit owns its tree and text; every view, match and span handed out
/// borrows from it and is only valid for the lifetime of the unit.
#[derive(Debug)]
pub struct SourceUnit {
    path: PathBuf,
    parsed: ParseResult,
    digest: SourceDigest,
    annotations: Vec<AnnotationSite>,
}

impl SourceUnit {
    /// Parses `source` as the contents of `path` and validates every
    /// `[[parallel]]` annotation in it.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] when `path` is not a C++
    /// file, and [`SyntaxError::ParserInit`] or [`SyntaxError::Parse`] when
    /// no tree can be produced.
    pub fn parse(path: impl Into<PathBuf>, source: &str) -> Result<Self, SyntaxError> {
        let path = path.into();
        let Some(language) = SupportedLanguage::from_path(&path) else {
            return Err(SyntaxError::unknown_language(path));
        };
        let parsed = Parser::new(language)?.parse(source)?;
        let annotations = validate_annotations(&parsed);

        debug!(
            target: SYNTAX_TARGET,
            path = %path.display(),
            annotations = annotations.len(),
            has_errors = parsed.has_errors(),
            "parsed source unit"
        );

        Ok(Self {
            path,
            digest: SourceDigest::of(source),
            parsed,
            annotations,
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed text.
    #[must_use]
    pub fn source(&self) -> &str {
        self.parsed.source()
    }

    /// Returns the parse result.
    #[must_use]
    pub const fn parsed(&self) -> &ParseResult {
        &self.parsed
    }

    /// Returns the fingerprint of the parsed text.
    #[must_use]
    pub const fn digest(&self) -> SourceDigest {
        self.digest
    }

    /// Returns every annotation site in source order.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationSite] {
        &self.annotations
    }

    /// Iterates over annotations attached to anything but a range-based
    /// `for` loop.
    pub fn misplaced_annotations(&self) -> impl Iterator<Item = &AnnotationSite> {
        self.annotations.iter().filter(|site| !site.is_valid())
    }

    /// Returns the syntax errors in the tree.
    #[must_use]
    pub fn syntax_errors(&self) -> Vec<SyntaxErrorInfo> {
        self.parsed.errors()
    }

    /// Starts a fresh walk over the annotated loops of the unit.
    #[must_use]
    pub fn annotated_loops(&self) -> AnnotatedLoops<'_> {
        AnnotatedLoops::new(self.parsed.root_node(), self.parsed.source())
    }

    /// Anchors `span` to this unit's path.
    #[must_use]
    pub fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::new(self.path.clone(), span)
    }
}
