//! The single configurable lint/transform pipeline.
//!
//! A run is a fold over the input files. Each file is read, parsed and
//! checked independently; its clean loops contribute edits to one
//! run-wide [`ChangeSet`], which is only applied once every input has been
//! processed. Failures never cross file boundaries, and a rejected loop
//! never blocks a sibling loop.

use std::fmt;
use std::path::{Component, Path};

use parfor_core::{
    AcceptanceLevel, ApplyError, ChangeSet, DiagnosticCode, DiagnosticNote, Emitter, RewriteEdit,
    Severity, SourceDigest, SourceReader, TemplateRegistry,
};
use parfor_syntax::{
    AnnotatedLoopMatch, RewriteRule, Rewriter, SourceUnit, SupportedLanguage, classify_escapes,
};
use tracing::{debug, info};

use crate::report::{FileReport, PipelineReport};

const PIPELINE_TARGET: &str = "parfor::pipeline";

/// Whether accepted loops are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Match and classify only; never produce edits.
    #[default]
    Lint,
    /// Also rewrite accepted loops and emit the transformed files.
    Transform,
}

impl Mode {
    /// Returns the lower-case name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lint => "lint",
            Self::Transform => "transform",
        }
    }

    const fn rewrites(self) -> bool {
        matches!(self, Self::Transform)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings fixed for the lifetime of a [`Pipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    mode: Mode,
    acceptance: AcceptanceLevel,
}

impl PipelineOptions {
    /// Creates options for `mode` with accepted loops reported as notes.
    #[must_use]
    pub const fn new(mode: Mode) -> Self {
        Self {
            mode,
            acceptance: AcceptanceLevel::Note,
        }
    }

    /// Sets the severity of the "loop accepted" diagnostic.
    #[must_use]
    pub const fn with_acceptance(mut self, acceptance: AcceptanceLevel) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Returns the run mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the acceptance severity.
    #[must_use]
    pub const fn acceptance(&self) -> AcceptanceLevel {
        self.acceptance
    }
}

/// Matches, classifies and optionally rewrites `[[parallel]]` loops.
///
/// The template registry and rewrite rule are built once in
/// [`Pipeline::new`] and shared by every file of every run.
///
/// # Example
///
/// ```
/// use std::path::{Component, Path};
///
/// use parfor::{Mode, Pipeline, PipelineOptions};
///
/// let source = "void f(int *v) { [[parallel]] for (auto &i : v) { i++; } }";
/// let reader = |_: &Path| -> std::io::Result<String> { Ok(String::from(source)) };
///
/// let pipeline = Pipeline::new(PipelineOptions::new(Mode::Transform));
/// let report = pipeline.run(["f.cpp"], &reader);
///
/// assert!(!report.has_errors());
/// let (_, text) = report.rewritten_files().next().unwrap();
/// assert!(text.contains("std::for_each(std::execution::par"));
/// ```
#[derive(Debug)]
pub struct Pipeline {
    options: PipelineOptions,
    registry: TemplateRegistry,
    rule: RewriteRule,
}

impl Pipeline {
    /// Creates a pipeline, registering every diagnostic template.
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            registry: TemplateRegistry::new(options.acceptance()),
            rule: RewriteRule::default(),
        }
    }

    /// Returns the options the pipeline was built with.
    #[must_use]
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Returns the diagnostic templates in use.
    #[must_use]
    pub const fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Processes `inputs` in order, reading each through `reader`.
    ///
    /// A path given more than once is processed once. In transform mode the
    /// accumulated edits are applied after the last input, re-reading each
    /// file through `reader`; nothing is written anywhere.
    pub fn run<P, R>(&self, inputs: impl IntoIterator<Item = P>, reader: &R) -> PipelineReport
    where
        P: AsRef<Path>,
        R: SourceReader + ?Sized,
    {
        let mut files: Vec<FileReport> = Vec::new();
        let mut changes = ChangeSet::new();

        for input in inputs {
            let path = input.as_ref();
            if files.iter().any(|f| same_input(f.path(), path)) {
                debug!(
                    target: PIPELINE_TARGET,
                    path = %path.display(),
                    "skipping duplicate input"
                );
                continue;
            }
            let mut report = FileReport::new(path.to_path_buf());
            self.process_file(&mut report, reader, &mut changes);
            files.push(report);
        }

        if !changes.is_empty() {
            self.finalise(&changes, reader, &mut files);
        }

        let report = PipelineReport::new(self.options.mode(), files);
        info!(
            target: PIPELINE_TARGET,
            mode = %self.options.mode(),
            files = report.files().len(),
            rewritten = report.rewritten_files().count(),
            errors = report.count(Severity::Error),
            "run finished"
        );
        report
    }

    fn process_file<R: SourceReader + ?Sized>(
        &self,
        report: &mut FileReport,
        reader: &R,
        changes: &mut ChangeSet,
    ) {
        let path = report.path().to_path_buf();
        let shown = path.display().to_string();
        let mut emitter = Emitter::new(&self.registry, &mut report.diagnostics);

        if SupportedLanguage::from_path(&path).is_none() {
            emitter.emit(DiagnosticCode::UnsupportedFile, None, &[&shown]);
            return;
        }

        let source = match reader.read(&path) {
            Ok(source) => source,
            Err(error) => {
                emitter.emit(
                    DiagnosticCode::UnreadableFile,
                    None,
                    &[&shown, &error.to_string()],
                );
                return;
            }
        };

        let analysis = self.analyse(&path, &source, &mut emitter);
        debug!(
            target: PIPELINE_TARGET,
            path = %shown,
            accepted = analysis.accepted,
            edits = analysis.edits.len(),
            errors = emitter.error_count(),
            "analysed file"
        );

        report.accepted = analysis.accepted;
        report.rewrites = analysis.rewrites;
        if !analysis.edits.is_empty() {
            changes.extend_file(&path, analysis.digest, analysis.edits);
        }
    }

    fn analyse(&self, path: &Path, source: &str, emitter: &mut Emitter<'_, '_>) -> Analysis {
        let unit = match SourceUnit::parse(path, source) {
            Ok(unit) => unit,
            Err(error) => {
                emitter.emit(DiagnosticCode::SyntaxError, None, &[&error.to_string()]);
                return Analysis::empty(SourceDigest::of(source));
            }
        };

        for site in unit.misplaced_annotations() {
            let note = DiagnosticNote::new(
                "annotated statement is here",
                Some(unit.location(site.statement())),
            );
            emitter.emit_with_notes(
                DiagnosticCode::MisplacedAnnotation,
                Some(unit.location(site.attribute())),
                &[site.kind().describe()],
                vec![note],
            );
        }

        let syntax_errors = unit.syntax_errors();
        for info in &syntax_errors {
            emitter.emit(
                DiagnosticCode::SyntaxError,
                Some(unit.location(info.span)),
                &[info.message.as_str()],
            );
        }

        let loops: Vec<AnnotatedLoopMatch<'_>> = unit.annotated_loops().collect();
        let verdicts: Vec<bool> = loops
            .iter()
            .map(|found| Self::classify(&unit, found, emitter))
            .collect();

        let mut analysis = Analysis::empty(unit.digest());
        if !syntax_errors.is_empty() {
            return analysis;
        }

        let mut rewriter = Rewriter::new(&self.rule, &unit);
        for (found, clean) in loops.iter().zip(&verdicts) {
            if !clean {
                continue;
            }
            let location = Some(unit.location(found.annotation_span()));

            let encloses_rejected = loops
                .iter()
                .zip(&verdicts)
                .any(|(other, other_clean)| !other_clean && found.encloses(other));
            if encloses_rejected {
                emitter.emit(
                    DiagnosticCode::UnsupportedLoop,
                    location,
                    &["it contains a rejected parallel loop"],
                );
                continue;
            }

            let encloses_misplaced = unit
                .misplaced_annotations()
                .any(|site| found.body_contains(site.attribute()));
            if encloses_misplaced {
                emitter.emit(
                    DiagnosticCode::UnsupportedLoop,
                    location,
                    &["it contains a misplaced parallel annotation"],
                );
                continue;
            }

            if self.options.mode().rewrites() {
                if let Err(error) = rewriter.rewrite(found) {
                    emitter.emit(
                        DiagnosticCode::UnsupportedLoop,
                        location,
                        &[&error.to_string()],
                    );
                    continue;
                }
            }

            analysis.accepted = analysis.accepted.saturating_add(1);
            emitter.emit(DiagnosticCode::LoopAccepted, location, &[]);
        }

        let result = rewriter.finish();
        analysis.rewrites = result.num_replacements();
        analysis.edits = result.into_edits();
        analysis
    }

    /// Reports every escape and shape problem of one loop.
    ///
    /// Returns `true` when the loop may be rewritten.
    fn classify(
        unit: &SourceUnit,
        found: &AnnotatedLoopMatch<'_>,
        emitter: &mut Emitter<'_, '_>,
    ) -> bool {
        let errors_before = emitter.error_count();

        for violation in classify_escapes(found, unit.path()) {
            emitter.emit(violation.code(), Some(violation.location().clone()), &[]);
        }

        let location = unit.location(found.annotation_span());
        let mut supported = true;
        if found.loop_view().init_statement().is_some() {
            emitter.emit(
                DiagnosticCode::UnsupportedLoop,
                Some(location.clone()),
                &["the loop has an init-statement"],
            );
            supported = false;
        }
        if !found.body().is_compound() {
            emitter.emit(
                DiagnosticCode::UnsupportedLoop,
                Some(location),
                &["the loop body is not a braced block"],
            );
            supported = false;
        }

        supported && emitter.error_count() == errors_before
    }

    fn finalise<R: SourceReader + ?Sized>(
        &self,
        changes: &ChangeSet,
        reader: &R,
        files: &mut [FileReport],
    ) {
        let outcome = changes.apply_with(reader);
        for file in outcome.into_files() {
            let (path, result) = file.into_parts();
            let Some(report) = files.iter_mut().find(|f| f.path() == path.as_path()) else {
                continue;
            };
            match result {
                Ok(text) => report.output = Some(text),
                Err(error) => {
                    report.rewrites = 0;
                    let shown = path.display().to_string();
                    let detail = match &error {
                        ApplyError::Unreadable { source, .. } => source.to_string(),
                        _ => error.to_string(),
                    };
                    let mut emitter = Emitter::new(&self.registry, &mut report.diagnostics);
                    emitter.emit(error.code(), None, &[&shown, &detail]);
                }
            }
        }
    }
}

/// Returns `true` when two input paths name the same file once `.`
/// components are ignored.
///
/// `a.cpp` and `./a.cpp` are one input. No filesystem lookup is made.
fn same_input(left: &Path, right: &Path) -> bool {
    fn significant(path: &Path) -> impl Iterator<Item = Component<'_>> {
        path.components()
            .filter(|component| !matches!(component, Component::CurDir))
    }
    significant(left).eq(significant(right))
}

/// Edits and counts produced by analysing one file.
struct Analysis {
    digest: SourceDigest,
    edits: Vec<RewriteEdit>,
    accepted: usize,
    rewrites: usize,
}

impl Analysis {
    const fn empty(digest: SourceDigest) -> Self {
        Self {
            digest,
            edits: Vec::new(),
            accepted: 0,
            rewrites: 0,
        }
    }
}
