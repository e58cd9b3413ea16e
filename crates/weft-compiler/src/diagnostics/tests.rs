use rowan::TextRange;

use super::*;
use crate::{SourceId, SourceMap};

fn span(start: u32, end: u32) -> Option<Span> {
    Some(Span::new(
        SourceId(0),
        TextRange::new(start.into(), end.into()),
    ))
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
    insta::assert_snapshot!(format!("{}", Severity::Information), @"info");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedItem, span(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    let diag = diagnostics.iter().next().unwrap();
    assert_eq!(diag.message(), "expected a rule item");
    assert_eq!(diag.to_string(), "error at 0..5: expected a rule item");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedRule, span(4, 7))
        .message("foo")
        .emit();
    diagnostics
        .report(DiagnosticKind::InvalidQuantifier, span(9, 12))
        .message("maximum is below minimum")
        .emit();

    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "error at 4..7: rule `foo` is not defined",
            "error at 9..12: invalid quantifier: maximum is below minimum",
        ]
    );
}

#[test]
fn report_without_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingRuleGenerated, None)
        .message("S")
        .emit();

    let diag = diagnostics.iter().next().unwrap();
    assert_eq!(diag.to_string(), "info: generated transform rule for `S`");
    assert!(!diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
    assert_eq!(diagnostics.error_count(), 0);
}

#[test]
fn severities_by_kind() {
    assert_eq!(
        DiagnosticKind::UnknownProperty.default_severity(),
        Severity::Warning
    );
    assert_eq!(
        DiagnosticKind::TypeCreated.default_severity(),
        Severity::Information
    );
    assert_eq!(
        DiagnosticKind::NoSuperRule.default_severity(),
        Severity::Error
    );
}

#[test]
fn phases_by_kind() {
    assert_eq!(DiagnosticKind::UnexpectedToken.phase(), Phase::Parse);
    assert_eq!(DiagnosticKind::MissingOverride.phase(), Phase::Parse);
    assert_eq!(
        DiagnosticKind::DuplicateGrammar.phase(),
        Phase::GrammarResolution
    );
    assert_eq!(
        DiagnosticKind::InvalidLeafPattern.phase(),
        Phase::GrammarResolution
    );
    assert_eq!(
        DiagnosticKind::UnknownTransformGrammar.phase(),
        Phase::TransformResolution
    );
    assert_eq!(
        DiagnosticKind::TypeCreated.phase(),
        Phase::TransformResolution
    );
}

#[test]
fn filter_by_phase() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, span(0, 1))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownType, span(1, 2))
        .message("Foo")
        .emit();

    assert_eq!(diagnostics.in_phase(Phase::Parse).count(), 1);
    assert_eq!(diagnostics.in_phase(Phase::GrammarResolution).count(), 0);
    let transform: Vec<_> = diagnostics
        .in_phase(Phase::TransformResolution)
        .map(|d| d.message().to_owned())
        .collect();
    assert_eq!(transform, ["type `Foo` is not defined"]);
}

#[test]
fn display_related_and_fix() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateRule, span(10, 11))
        .message("a")
        .related_to("first defined here", span(0, 1))
        .related_to("dropped without a location", None)
        .fix("remove the rule", "")
        .emit();

    let diag = diagnostics.iter().next().unwrap();
    insta::assert_snapshot!(diag.to_string(), @"error at 10..11: rule `a` is already defined (fix: remove the rule) (related: first defined here at 0..1)");
}

#[test]
fn extend_merges_messages() {
    let mut first = Diagnostics::new();
    first.report(DiagnosticKind::UnexpectedToken, span(0, 1)).emit();
    let mut second = Diagnostics::new();
    second.report(DiagnosticKind::UnknownProperty, span(2, 3)).emit();

    first.extend(second);
    assert_eq!(first.len(), 2);
    assert_eq!(first.warning_count(), 1);
    assert_eq!(first.error_count(), 1);
}

#[test]
fn printer_with_related() {
    let sources = SourceMap::one_liner("hello world!");
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedGroup, span(0, 5))
        .message("primary")
        .related_to("related info", span(6, 10))
        .emit();

    let result = diagnostics.render(&sources);
    insta::assert_snapshot!(result, @r"
    error: missing closing `)`: primary
      |
    1 | hello world!
      | ^^^^^ ---- related info
      | |
      | missing closing `)`: primary
    ");
}

#[test]
fn printer_without_span() {
    let sources = SourceMap::new();
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownProperty, None)
        .message("`x` on `A`")
        .emit();

    insta::assert_snapshot!(diagnostics.render(&sources), @"warning: unknown property: `x` on `A`");
}

#[test]
fn printer_empty() {
    let sources = SourceMap::one_liner("S = a ;");
    let diagnostics = Diagnostics::new();
    assert_eq!(diagnostics.render(&sources), "");
}
