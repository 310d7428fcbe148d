//! Tests for the template registry and emitter.

use rstest::{fixture, rstest};

use crate::{
    AcceptanceLevel, Diagnostic, DiagnosticCode, DiagnosticNote, Emitter, LineCol, Severity,
    SourceLocation, Span, TemplateRegistry,
};

#[fixture]
fn registry() -> TemplateRegistry {
    TemplateRegistry::default()
}

fn location() -> SourceLocation {
    SourceLocation::new(
        "main.cpp",
        Span::new(5, 10, LineCol::new(1, 2), LineCol::new(1, 7)),
    )
}

#[rstest]
fn every_code_has_a_template(registry: TemplateRegistry) {
    for code in DiagnosticCode::ALL {
        assert_eq!(registry.get(code).code(), code);
    }
    assert_eq!(registry.templates().len(), DiagnosticCode::ALL.len());
}

#[rstest]
#[case::note(AcceptanceLevel::Note, Severity::Note)]
#[case::warning(AcceptanceLevel::Warning, Severity::Warning)]
fn acceptance_severity_is_configurable(
    #[case] level: AcceptanceLevel,
    #[case] expected: Severity,
) {
    let registry = TemplateRegistry::new(level);
    assert_eq!(registry.get(DiagnosticCode::LoopAccepted).severity(), expected);
}

#[rstest]
#[case::misplaced(DiagnosticCode::MisplacedAnnotation)]
#[case::brk(DiagnosticCode::UnexpectedBreak)]
#[case::cont(DiagnosticCode::UnexpectedContinue)]
#[case::ret(DiagnosticCode::UnexpectedReturn)]
#[case::goto(DiagnosticCode::UnexpectedGoto)]
fn violations_are_errors(registry: TemplateRegistry, #[case] code: DiagnosticCode) {
    assert_eq!(registry.get(code).severity(), Severity::Error);
}

#[rstest]
fn distinct_messages_get_distinct_ids(registry: TemplateRegistry) {
    let brk = registry.get(DiagnosticCode::UnexpectedBreak).id();
    let cont = registry.get(DiagnosticCode::UnexpectedContinue).id();
    assert_ne!(brk, cont);
}

#[rstest]
fn emitter_renders_arguments_and_counts_errors(registry: TemplateRegistry) {
    let mut sink: Vec<Diagnostic> = Vec::new();
    let mut emitter = Emitter::new(&registry, &mut sink);

    emitter.emit(DiagnosticCode::LoopAccepted, Some(location()), &[]);
    assert!(!emitter.has_errors());

    emitter.emit_with_notes(
        DiagnosticCode::MisplacedAnnotation,
        Some(location()),
        &["for statement"],
        vec![DiagnosticNote::new("annotated statement is here", None)],
    );
    assert_eq!(emitter.error_count(), 1);

    let messages: Vec<&str> = sink.iter().map(Diagnostic::message).collect();
    insta::assert_debug_snapshot!(messages, @r#"
    [
        "this for-range will be converted to parallel version",
        "'parallel' attribute only applies to for-range loop statements, not for statement",
    ]
    "#);
    assert_eq!(sink.get(1).map(|d| d.notes().len()), Some(1));
}

#[rstest]
fn unsupported_loop_message_names_reason(registry: TemplateRegistry) {
    let rendered = registry
        .get(DiagnosticCode::UnsupportedLoop)
        .render(&["loop body is not a compound statement"]);
    assert_eq!(
        rendered,
        "parallel for-range left unchanged: loop body is not a compound statement"
    );
}
