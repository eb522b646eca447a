//! Verification failures.

use std::fmt;

use thiserror::Error;

use crate::action::ActionSummary;
use crate::diagnostic::{Diagnostic, Severity};
use crate::text::{AnnotationKind, LinePosition, LinePositionSpan};

/// Result of a verification step.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// A verification failure.
///
/// Messages embed the observed diagnostics/actions and use 1-based line/column positions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// Malformed fixture markers.
    #[error("Invalid fixture at {position}: {message}")]
    InvalidFixture {
        message: String,
        position: LinePosition,
    },
    /// Invalid document or directory name.
    #[error("Invalid path '{name}': {reason}")]
    InvalidPath { name: String, reason: String },
    /// A refactoring test without spans.
    #[error("Span on which a refactoring should be invoked was not found.")]
    SpanNotFound,
    /// An expected diagnostic id isn't declared by the analyzer.
    #[error("Analyzer '{analyzer}' does not support diagnostic '{id}'. Supported diagnostics: {supported}")]
    UnsupportedDiagnostic {
        analyzer: String,
        id: String,
        supported: String,
    },
    /// An expected diagnostic id isn't declared by the fix provider.
    #[error("Code fix provider '{provider}' cannot fix diagnostic '{id}'. Fixable diagnostics: {fixable}")]
    NotFixable {
        provider: String,
        id: String,
        fixable: String,
    },
    /// Edits that can't be applied (overlapping, out of bounds, unknown document).
    #[error("Invalid edit in '{path}': {message}")]
    InvalidEdit { path: String, message: String },

    /// Compiler diagnostics above the tolerated severity.
    #[error(
        "No compiler diagnostics with severity higher than '{severity}' expected.{}",
        DiagnosticList(.diagnostics)
    )]
    CompilerDiagnostics {
        severity: Severity,
        diagnostics: Vec<Diagnostic>,
    },
    /// Compiler diagnostics introduced by a fix or refactoring.
    #[error("Code fix introduced new compiler diagnostic(s).{}", DiagnosticList(.diagnostics))]
    NewCompilerDiagnostics { diagnostics: Vec<Diagnostic> },

    /// No expected diagnostic in the fixture.
    #[error("Diagnostic's location not found in a source text.")]
    ExpectedLocationNotFound,

    /// No diagnostic to fix before any fix was applied.
    #[error("No diagnostic found.")]
    NoDiagnosticFound,
    /// No compiler diagnostic to fix before any fix was applied.
    #[error("No compiler diagnostic found.")]
    NoCompilerDiagnosticFound,
    /// No compiler diagnostic with the fixed id before any fix was applied.
    #[error("No compiler diagnostic with id '{id}' found.{}", DiagnosticList(.diagnostics))]
    NoMatchingCompilerDiagnostic {
        id: String,
        diagnostics: Vec<Diagnostic>,
    },
    /// No diagnostic with an expected id before any fix was applied.
    #[error("No diagnostic with id '{}' found.{}", .expected.join("', '"), DiagnosticList(.diagnostics))]
    NoMatchingDiagnostic {
        expected: Vec<String>,
        diagnostics: Vec<Diagnostic>,
    },
    /// No matching code fix.
    #[error("No code fix has been registered.{}", ActionList(.candidates))]
    NoFixRegistered { candidates: Vec<ActionSummary> },
    /// More than one matching code fix.
    #[error("Multiple fixes registered by '{provider}'.{}", ActionList(.actions))]
    MultipleFixesRegistered {
        provider: String,
        actions: Vec<ActionSummary>,
    },
    /// The applied fix didn't change the diagnostics.
    #[error(
        "Same diagnostics returned before and after the fix was applied.{}",
        DiagnosticList(.diagnostics)
    )]
    FixHadNoEffect { diagnostics: Vec<Diagnostic> },
    /// The fixes oscillate between two states.
    #[error(
        "Infinite loop detected: Reported diagnostics have been previously fixed.{}",
        DiagnosticList(.diagnostics)
    )]
    InfiniteLoop { diagnostics: Vec<Diagnostic> },
    /// Too many fixes were applied without reaching a fixed point.
    #[error("Fix iteration limit of {limit} exceeded.{}", DiagnosticList(.diagnostics))]
    IterationLimitExceeded {
        limit: usize,
        diagnostics: Vec<Diagnostic>,
    },
    /// A code fix was offered where none was expected.
    #[error("No code fix expected.{}", ActionList(.actions))]
    UnexpectedFix { actions: Vec<ActionSummary> },

    /// No matching refactoring.
    #[error("No code refactoring has been registered.{}", ActionList(.candidates))]
    NoRefactoringRegistered { candidates: Vec<ActionSummary> },
    /// More than one matching refactoring.
    #[error("Multiple refactorings registered by '{provider}'.{}", ActionList(.actions))]
    MultipleRefactoringsRegistered {
        provider: String,
        actions: Vec<ActionSummary>,
    },
    /// A refactoring was offered where none was expected.
    #[error("No code refactoring expected.{}", ActionList(.actions))]
    UnexpectedRefactoring { actions: Vec<ActionSummary> },
    /// The applied action has a different title.
    #[error("Code action title expected to be \"{expected}\", actual: \"{actual}\"")]
    TitleMismatch { expected: String, actual: String },

    /// No actual diagnostics.
    #[error("No diagnostic found, expected: {expected}.")]
    DiagnosticNotFound { expected: usize },
    /// Different number of expected and actual diagnostics.
    #[error(
        "Mismatch between number of diagnostics, expected: {expected} actual: {actual}.{}",
        DiagnosticList(.diagnostics)
    )]
    DiagnosticCountMismatch {
        expected: usize,
        actual: usize,
        diagnostics: Vec<Diagnostic>,
    },
    /// Different rule ids.
    #[error("Diagnostic's id expected to be \"{expected}\", actual: \"{actual}\"{context}")]
    DiagnosticIdMismatch {
        expected: String,
        actual: String,
        context: Box<PairContext>,
    },
    /// Different document paths.
    #[error("Diagnostic expected to be in file \"{expected}\", actual: \"{actual}\"{context}")]
    DiagnosticPathMismatch {
        expected: String,
        actual: String,
        context: Box<PairContext>,
    },
    /// Different line/column positions (or location kinds).
    #[error("{detail}{context}")]
    DiagnosticSpanMismatch {
        detail: String,
        context: Box<PairContext>,
    },
    /// Different number of additional locations.
    #[error("{expected} additional location(s) expected, actual: {actual}{context}")]
    AdditionalLocationCountMismatch {
        expected: usize,
        actual: usize,
        context: Box<PairContext>,
    },
    /// Different messages.
    #[error("Diagnostic's message expected to be \"{expected}\", actual: \"{actual}\"{context}")]
    MessageMismatch {
        expected: String,
        actual: String,
        context: Box<PairContext>,
    },
    /// Diagnostics reported where none were expected.
    #[error("No diagnostic expected.{}", DiagnosticList(.diagnostics))]
    UnexpectedDiagnostic { diagnostics: Vec<Diagnostic> },

    /// The transformed text differs from the expected text.
    #[error("Text of '{path}' differs from the expected text at {position}.\n\nExpected:\n{expected}\n\nActual:\n{actual}")]
    TextMismatch {
        path: String,
        expected: String,
        actual: String,
        position: LinePosition,
    },
    /// Different number of annotations of a kind.
    #[error("{expected} '{kind}' annotation(s) expected, actual: {actual}")]
    AnnotationCountMismatch {
        kind: AnnotationKind,
        expected: usize,
        actual: usize,
    },
    /// An annotation at a different position.
    #[error("'{kind}' annotation expected at {expected}, actual: {actual}")]
    AnnotationPositionMismatch {
        kind: AnnotationKind,
        expected: LinePositionSpan,
        actual: LinePositionSpan,
    },
    /// An additional document differs from its expected text.
    #[error("Additional document '{path}' differs from the expected text at {position}.\n\nExpected:\n{expected}\n\nActual:\n{actual}")]
    AdditionalDocumentMismatch {
        path: String,
        expected: String,
        actual: String,
        position: LinePosition,
    },

    /// An analyzer returned an error or panicked.
    #[error("Analyzer '{analyzer}' failed: {message}")]
    AnalyzerFailed { analyzer: String, message: String },
    /// A fix or refactoring provider returned an error or panicked.
    #[error("Provider '{provider}' failed: {message}")]
    ProviderFailed { provider: String, message: String },
    /// Cancellation was requested.
    #[error("Verification was cancelled.")]
    Cancelled,
}

/// Expected and actual diagnostics of a mismatched pair.
#[derive(Debug, Clone)]
pub struct PairContext {
    pub expected: Diagnostic,
    pub actual: Diagnostic,
}

impl PairContext {
    pub fn boxed(expected: &Diagnostic, actual: &Diagnostic) -> Box<Self> {
        Box::new(Self {
            expected: expected.clone(),
            actual: actual.clone(),
        })
    }
}

impl fmt::Display for PairContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n\nExpected diagnostic:\n{}\n\nActual diagnostic:\n{}",
            self.expected, self.actual
        )
    }
}

/// Displays a diagnostic list on separate lines.
pub struct DiagnosticList<'a>(pub &'a [Diagnostic]);

impl fmt::Display for DiagnosticList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("\n")?;
        for diagnostic in self.0 {
            write!(f, "\n{diagnostic}")?;
        }
        Ok(())
    }
}

/// Displays a code action list on separate lines.
pub struct ActionList<'a>(pub &'a [ActionSummary]);

impl fmt::Display for ActionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("\n")?;
        for action in self.0 {
            write!(f, "\n{action}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticDescriptor, Location};
    use std::sync::Arc;

    #[test]
    fn messages_embed_lists() {
        let descriptor = Arc::new(DiagnosticDescriptor::new(
            "T0001",
            "Title",
            "Message",
            "Style",
            Severity::Warning,
        ));
        let error = VerifyError::FixHadNoEffect {
            diagnostics: vec![Diagnostic::new(descriptor, Location::None)],
        };
        assert_eq!(
            error.to_string(),
            "Same diagnostics returned before and after the fix was applied.\n\nwarning T0001: Message"
        );

        let error = VerifyError::MultipleFixesRegistered {
            provider: "FixProvider".to_owned(),
            actions: vec![
                ActionSummary::new("Fix a", Some("a")),
                ActionSummary::new("Fix b", None),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Multiple fixes registered by 'FixProvider'.\n\n'Fix a' (equivalence key: a)\n'Fix b'"
        );

        assert_eq!(
            VerifyError::NoFixRegistered { candidates: Vec::new() }.to_string(),
            "No code fix has been registered."
        );
    }
}
