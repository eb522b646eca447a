//! Checks shared by all verifiers.

use itertools::Itertools;

use crate::action::{
    matching_actions, matching_fixes, registration_summaries, CodeAction, CodeFixProvider,
    CodeFixRegistration, RefactoringProvider,
};
use crate::diagnostic::{
    deep_equal, DescriptorComparer, Diagnostic, DiagnosticComparer, Location, MessageFormatter,
};
use crate::document::{Document, ExpectedDocument, Project};
use crate::driver::{Analyzer, Language};
use crate::error::{PairContext, VerifyError, VerifyResult};
use crate::fixture::ExpectedTestState;
use crate::options::TestOptions;
use crate::text::{first_difference, LinePositionSpan};

/// Fails if any compiler diagnostic exceeds the tolerated severity (and isn't allow-listed).
pub fn verify_compiler_diagnostics(diagnostics: &[Diagnostic], options: &TestOptions) -> VerifyResult<()> {
    let offending: Vec<Diagnostic> = diagnostics
        .iter()
        .filter(|diagnostic| {
            !options.is_allowed_compiler_diagnostic(diagnostic.id(), diagnostic.severity())
        })
        .cloned()
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::CompilerDiagnostics {
            severity: options.allowed_compiler_diagnostic_severity(),
            diagnostics: offending,
        })
    }
}

/// Fails if a compiler diagnostic isn't deep-equal to any diagnostic reported before the change.
///
/// Allow-listed ids are ignored.
pub fn verify_no_new_compiler_diagnostics(
    before: &[Diagnostic],
    after: &[Diagnostic],
    options: &TestOptions,
) -> VerifyResult<()> {
    let new_diagnostics: Vec<Diagnostic> = after
        .iter()
        .filter(|diagnostic| {
            !options
                .allowed_compiler_diagnostic_ids()
                .contains(diagnostic.id())
        })
        .filter(|diagnostic| !before.iter().any(|it| deep_equal(it, diagnostic)))
        .cloned()
        .collect();
    if new_diagnostics.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::NewCompilerDiagnostics {
            diagnostics: new_diagnostics,
        })
    }
}

/// Fails if an expected diagnostic id isn't declared by the analyzer.
pub fn verify_supported_diagnostics<L, A>(analyzer: &A, expected: &[Diagnostic]) -> VerifyResult<()>
where
    L: Language,
    A: Analyzer<L> + ?Sized,
{
    let supported = analyzer.supported_diagnostics();
    for diagnostic in expected {
        if !supported.iter().any(|descriptor| descriptor.id == diagnostic.id()) {
            return Err(VerifyError::UnsupportedDiagnostic {
                analyzer: analyzer.name().to_owned(),
                id: diagnostic.id().to_owned(),
                supported: supported
                    .iter()
                    .sorted_by(|a, b| DescriptorComparer::Id.compare(a, b))
                    .map(|descriptor| descriptor.id.as_str())
                    .join(", "),
            });
        }
    }
    Ok(())
}

/// Fails if a diagnostic id isn't declared by the fix provider.
pub fn verify_fixable_diagnostics<L, F>(provider: &F, id: &str) -> VerifyResult<()>
where
    L: Language,
    F: CodeFixProvider<L> + ?Sized,
{
    let fixable = provider.fixable_diagnostic_ids();
    if fixable.iter().any(|it| it == id) {
        return Ok(());
    }
    Err(VerifyError::NotFixable {
        provider: provider.name().to_owned(),
        id: id.to_owned(),
        fixable: fixable.iter().sorted().join(", "),
    })
}

/// Returns the only code fix that matches the diagnostic and key filter.
pub fn single_fix<'a, L, F>(
    provider: &F,
    registrations: &'a [CodeFixRegistration],
    diagnostic: &Diagnostic,
    equivalence_key: Option<&str>,
) -> VerifyResult<&'a CodeAction>
where
    L: Language,
    F: CodeFixProvider<L> + ?Sized,
{
    let matches = matching_fixes(registrations, diagnostic, equivalence_key);
    match matches.as_slice() {
        [action] => Ok(*action),
        [] => Err(VerifyError::NoFixRegistered {
            candidates: registration_summaries(registrations),
        }),
        actions => Err(VerifyError::MultipleFixesRegistered {
            provider: provider.name().to_owned(),
            actions: actions.iter().map(|action| action.summary()).collect(),
        }),
    }
}

/// Returns the only refactoring that matches the key filter.
pub fn single_refactoring<'a, L, R>(
    provider: &R,
    actions: &'a [CodeAction],
    equivalence_key: Option<&str>,
) -> VerifyResult<&'a CodeAction>
where
    L: Language,
    R: RefactoringProvider<L> + ?Sized,
{
    let matches = matching_actions(actions, equivalence_key);
    match matches.as_slice() {
        [action] => Ok(*action),
        [] => Err(VerifyError::NoRefactoringRegistered {
            candidates: actions
                .iter()
                .flat_map(CodeAction::leaves)
                .map(CodeAction::summary)
                .collect(),
        }),
        actions => Err(VerifyError::MultipleRefactoringsRegistered {
            provider: provider.name().to_owned(),
            actions: actions.iter().map(|action| action.summary()).collect(),
        }),
    }
}

/// Checks the action title (if expected) and applies the action.
pub fn apply_action(
    document: &Document,
    action: &CodeAction,
    expected_title: Option<&str>,
) -> VerifyResult<Document> {
    if let Some(expected_title) = expected_title {
        if action.title() != expected_title {
            return Err(VerifyError::TitleMismatch {
                expected: expected_title.to_owned(),
                actual: action.title().to_owned(),
            });
        }
    }
    action.apply(document)
}

/// Compares the document with the expected text and annotations.
pub fn verify_expected_document(expected: &ExpectedTestState, document: &Document) -> VerifyResult<()> {
    if expected.source != document.text() {
        return Err(VerifyError::TextMismatch {
            path: document.path().to_owned(),
            expected: expected.source.clone(),
            actual: document.text().to_owned(),
            position: first_difference(&expected.source, document.text()).unwrap_or_default(),
        });
    }

    // Texts are equal, so both sides share the same line map.
    let line_map = document.line_map();
    for (kind, expected_ranges) in &expected.annotations {
        let actual_ranges = document.annotations_of(kind);
        if expected_ranges.len() != actual_ranges.len() {
            return Err(VerifyError::AnnotationCountMismatch {
                kind: kind.clone(),
                expected: expected_ranges.len(),
                actual: actual_ranges.len(),
            });
        }
        for (expected_range, actual_range) in expected_ranges.iter().zip(&actual_ranges) {
            if expected_range != actual_range {
                return Err(VerifyError::AnnotationPositionMismatch {
                    kind: kind.clone(),
                    expected: line_map.span(*expected_range),
                    actual: line_map.span(*actual_range),
                });
            }
        }
    }
    Ok(())
}

/// Compares additional documents with their expected texts.
pub fn verify_additional_documents(project: &Project, expected: &[ExpectedDocument]) -> VerifyResult<()> {
    for expected_document in expected {
        let Some(document) = project.document(expected_document.id) else {
            continue;
        };
        if document.text() != expected_document.text {
            return Err(VerifyError::AdditionalDocumentMismatch {
                path: document.path().to_owned(),
                expected: expected_document.text.clone(),
                actual: document.text().to_owned(),
                position: first_difference(&expected_document.text, document.text())
                    .unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// Compares expected and actual diagnostics pairwise (both sorted by span start), then their counts.
pub fn compare_diagnostics(
    expected: &[Diagnostic],
    actual: &[Diagnostic],
    message: Option<&str>,
    formatter: &dyn MessageFormatter,
    verify_additional_locations: bool,
) -> VerifyResult<()> {
    if expected.is_empty() {
        return Err(VerifyError::ExpectedLocationNotFound);
    }

    let mut expected = expected.to_vec();
    let mut actual = actual.to_vec();
    DiagnosticComparer::SpanStart.sort(&mut expected);
    DiagnosticComparer::SpanStart.sort(&mut actual);

    for (expected_diagnostic, actual_diagnostic) in expected.iter().zip(&actual) {
        verify_diagnostic(
            expected_diagnostic,
            actual_diagnostic,
            message,
            formatter,
            verify_additional_locations,
        )?;
    }

    match (expected.len(), actual.len()) {
        (expected_count, actual_count) if expected_count == actual_count => Ok(()),
        (expected_count, 0) => Err(VerifyError::DiagnosticNotFound {
            expected: expected_count,
        }),
        (expected_count, actual_count) => Err(VerifyError::DiagnosticCountMismatch {
            expected: expected_count,
            actual: actual_count,
            diagnostics: actual,
        }),
    }
}

fn verify_diagnostic(
    expected: &Diagnostic,
    actual: &Diagnostic,
    message: Option<&str>,
    formatter: &dyn MessageFormatter,
    verify_additional_locations: bool,
) -> VerifyResult<()> {
    let context = || PairContext::boxed(expected, actual);

    if expected.id() != actual.id() {
        return Err(VerifyError::DiagnosticIdMismatch {
            expected: expected.id().to_owned(),
            actual: actual.id().to_owned(),
            context: context(),
        });
    }

    verify_location("Diagnostic", expected.location(), actual.location(), context)?;

    if verify_additional_locations {
        let (expected_locations, actual_locations) =
            (expected.additional_locations(), actual.additional_locations());
        if expected_locations.len() != actual_locations.len() {
            return Err(VerifyError::AdditionalLocationCountMismatch {
                expected: expected_locations.len(),
                actual: actual_locations.len(),
                context: context(),
            });
        }
        for (idx, (expected_location, actual_location)) in
            expected_locations.iter().zip(actual_locations).enumerate()
        {
            verify_location(
                &format!("Additional location {}", idx + 1),
                expected_location,
                actual_location,
                context,
            )?;
        }
    }

    if let Some(message) = message {
        let actual_message = actual.message_with(formatter);
        if actual_message != message {
            return Err(VerifyError::MessageMismatch {
                expected: message.to_owned(),
                actual: actual_message,
                context: context(),
            });
        }
    }

    Ok(())
}

fn verify_location(
    subject: &str,
    expected: &Location,
    actual: &Location,
    context: impl Fn() -> Box<PairContext>,
) -> VerifyResult<()> {
    match (expected.source(), actual.source()) {
        (None, None) => Ok(()),
        (Some(expected), Some(actual)) => {
            if expected.path != actual.path {
                return Err(VerifyError::DiagnosticPathMismatch {
                    expected: expected.path.clone(),
                    actual: actual.path.clone(),
                    context: context(),
                });
            }
            match verify_line_position_span(expected.line_span, actual.line_span) {
                None => Ok(()),
                Some(detail) => Err(VerifyError::DiagnosticSpanMismatch {
                    detail: format!("{subject}{detail}"),
                    context: context(),
                }),
            }
        }
        (None, Some(_)) => Err(VerifyError::DiagnosticSpanMismatch {
            detail: format!("{subject} expected to have no location, actual: {actual}"),
            context: context(),
        }),
        (Some(_), None) => Err(VerifyError::DiagnosticSpanMismatch {
            detail: format!("{subject} expected at {expected}, actual: no location"),
            context: context(),
        }),
    }
}

/// Describes the first difference between two line spans (1-based positions).
pub fn verify_line_position_span(expected: LinePositionSpan, actual: LinePositionSpan) -> Option<String> {
    if expected.start.line != actual.start.line {
        Some(format!(
            " expected to start on line {}, actual: {}",
            expected.start.line + 1,
            actual.start.line + 1
        ))
    } else if expected.start.character != actual.start.character {
        Some(format!(
            " expected to start at column {}, actual: {}",
            expected.start.character + 1,
            actual.start.character + 1
        ))
    } else if expected.end.line != actual.end.line {
        Some(format!(
            " expected to end on line {}, actual: {}",
            expected.end.line + 1,
            actual.end.line + 1
        ))
    } else if expected.end.character != actual.end.character {
        Some(format!(
            " expected to end at column {}, actual: {}",
            expected.end.character + 1,
            actual.end.character + 1
        ))
    } else {
        None
    }
}
