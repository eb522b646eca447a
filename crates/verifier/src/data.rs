//! Test data bundles.
//!
//! All `with_*` methods return new instances.

use std::fmt;
use std::sync::Arc;

use crate::diagnostic::{Diagnostic, DiagnosticComparer, DiagnosticDescriptor, MessageFormatter};
use crate::document::{AdditionalFile, Document};
use crate::fixture::TestCode;
use crate::text::TextRange;

/// Data for verifying a diagnostic (and optionally its fix).
#[derive(Clone)]
pub struct DiagnosticTestData {
    pub descriptor: Arc<DiagnosticDescriptor>,
    /// Marker-free source text.
    pub source: String,
    /// One expected diagnostic is reported per span.
    pub spans: Vec<TextRange>,
    /// Additional locations of every expected diagnostic.
    pub additional_spans: Vec<TextRange>,
    pub additional_files: Vec<AdditionalFile>,
    /// Expected message of every diagnostic.
    pub diagnostic_message: Option<String>,
    /// Formatter for actual messages (invariant if not set).
    pub formatter: Option<Arc<dyn MessageFormatter>>,
    /// Equivalence key filter for code fixes.
    pub equivalence_key: Option<String>,
    /// Verifies additional locations even when no additional span is expected.
    pub always_verify_additional_locations: bool,
}

impl DiagnosticTestData {
    pub fn new(
        descriptor: Arc<DiagnosticDescriptor>,
        source: impl Into<String>,
        spans: Vec<TextRange>,
        additional_spans: Vec<TextRange>,
    ) -> Self {
        Self {
            descriptor,
            source: source.into(),
            spans,
            additional_spans,
            additional_files: Vec::new(),
            diagnostic_message: None,
            formatter: None,
            equivalence_key: None,
            always_verify_additional_locations: false,
        }
    }

    /// Creates test data from a parsed fixture.
    pub fn from_code(descriptor: Arc<DiagnosticDescriptor>, code: &TestCode) -> Self {
        Self::new(
            descriptor,
            code.value.clone(),
            code.spans.clone(),
            code.additional_spans.clone(),
        )
    }

    pub fn with_additional_files(&self, additional_files: Vec<AdditionalFile>) -> Self {
        Self {
            additional_files,
            ..self.clone()
        }
    }

    pub fn with_diagnostic_message(&self, message: impl Into<String>) -> Self {
        Self {
            diagnostic_message: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn with_formatter(&self, formatter: Arc<dyn MessageFormatter>) -> Self {
        Self {
            formatter: Some(formatter),
            ..self.clone()
        }
    }

    pub fn with_equivalence_key(&self, equivalence_key: impl Into<String>) -> Self {
        Self {
            equivalence_key: Some(equivalence_key.into()),
            ..self.clone()
        }
    }

    pub fn with_always_verify_additional_locations(&self, value: bool) -> Self {
        Self {
            always_verify_additional_locations: value,
            ..self.clone()
        }
    }

    /// Returns true if additional locations should be compared.
    pub fn verifies_additional_locations(&self) -> bool {
        self.always_verify_additional_locations || !self.additional_spans.is_empty()
    }

    /// Builds the expected diagnostics (sorted by span start).
    ///
    /// Every diagnostic carries every additional span as an additional location.
    pub fn expected_diagnostics(&self, document: &Document) -> Vec<Diagnostic> {
        let additional_locations: Vec<_> = self
            .additional_spans
            .iter()
            .map(|span| document.location(*span))
            .collect();
        let mut diagnostics: Vec<_> = self
            .spans
            .iter()
            .map(|span| {
                Diagnostic::new(self.descriptor.clone(), document.location(*span))
                    .with_additional_locations(additional_locations.clone())
            })
            .collect();
        DiagnosticComparer::SpanStart.sort(&mut diagnostics);
        diagnostics
    }
}

impl fmt::Debug for DiagnosticTestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticTestData")
            .field("descriptor", &self.descriptor.id)
            .field("source", &self.source)
            .field("spans", &self.spans)
            .field("additional_spans", &self.additional_spans)
            .field("additional_files", &self.additional_files)
            .field("diagnostic_message", &self.diagnostic_message)
            .field("equivalence_key", &self.equivalence_key)
            .field(
                "always_verify_additional_locations",
                &self.always_verify_additional_locations,
            )
            .finish_non_exhaustive()
    }
}

/// Data for verifying a refactoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactoringTestData {
    /// Marker-free source text.
    pub source: String,
    /// Spans at which the refactoring is invoked (processed by descending start).
    pub spans: Vec<TextRange>,
    pub additional_files: Vec<AdditionalFile>,
    /// Equivalence key filter for refactorings.
    pub equivalence_key: Option<String>,
}

impl RefactoringTestData {
    pub fn new(source: impl Into<String>, spans: Vec<TextRange>) -> Self {
        Self {
            source: source.into(),
            spans,
            additional_files: Vec::new(),
            equivalence_key: None,
        }
    }

    /// Creates test data from a parsed fixture.
    pub fn from_code(code: &TestCode) -> Self {
        Self::new(code.value.clone(), code.spans.clone())
    }

    pub fn with_additional_files(&self, additional_files: Vec<AdditionalFile>) -> Self {
        Self {
            additional_files,
            ..self.clone()
        }
    }

    pub fn with_equivalence_key(&self, equivalence_key: impl Into<String>) -> Self {
        Self {
            equivalence_key: Some(equivalence_key.into()),
            ..self.clone()
        }
    }
}

/// Data for verifying a compiler diagnostic fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerDiagnosticFixTestData {
    pub source: String,
    pub additional_files: Vec<AdditionalFile>,
    /// Equivalence key filter for code fixes.
    pub equivalence_key: Option<String>,
}

impl CompilerDiagnosticFixTestData {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            additional_files: Vec::new(),
            equivalence_key: None,
        }
    }

    pub fn with_additional_files(&self, additional_files: Vec<AdditionalFile>) -> Self {
        Self {
            additional_files,
            ..self.clone()
        }
    }

    pub fn with_equivalence_key(&self, equivalence_key: impl Into<String>) -> Self {
        Self {
            equivalence_key: Some(equivalence_key.into()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::document::Workspace;
    use crate::options::TestOptions;
    use crate::text::TextSize;

    #[test]
    fn expected_diagnostics_work() {
        let descriptor = Arc::new(DiagnosticDescriptor::new(
            "T0001",
            "Title",
            "Message",
            "Style",
            Severity::Warning,
        ));
        let code = TestCode::parse("[|b|] == {|a|}\n[|a|]").unwrap();
        let data = DiagnosticTestData::from_code(descriptor, &code);
        let (document, _) = Workspace::new("txt")
            .create_document(&data.source, &[], &TestOptions::new("PlainText"))
            .unwrap();

        let diagnostics = data.expected_diagnostics(&document);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].span_start(), Some(TextSize::from(0)));
        assert_eq!(diagnostics[1].span_start(), Some(TextSize::from(7)));
        assert_eq!(
            diagnostics[1].location().line_span().map(|span| span.start.line),
            Some(1)
        );
        for diagnostic in &diagnostics {
            assert_eq!(diagnostic.additional_locations().len(), 1);
            assert_eq!(diagnostic.severity(), Severity::Warning);
        }
        assert!(data.verifies_additional_locations());
    }

    #[test]
    fn with_methods_are_copy_on_write() {
        let data = RefactoringTestData::new("a", Vec::new());
        let keyed = data.with_equivalence_key("swap-operands");

        assert_eq!(data.equivalence_key, None);
        assert_eq!(keyed.equivalence_key.as_deref(), Some("swap-operands"));
    }
}
