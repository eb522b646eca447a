//! Diagnostic (and code fix) verification.

use std::sync::Arc;

use crate::action::{matching_fixes, request_code_fixes, CodeFixProvider};
use crate::cancel::CancellationToken;
use crate::convergence::{FixLoop, FixTarget};
use crate::data::DiagnosticTestData;
use crate::diagnostic::{Diagnostic, DiagnosticDescriptor, InvariantFormatter};
use crate::document::{Document, ExpectedDocument, Workspace};
use crate::driver::{self, Analyzer, Language};
use crate::error::{VerifyError, VerifyResult};
use crate::fixture::{ExpectedTestState, TestCode};
use crate::options::TestOptions;
use crate::verifier::common;

/// Verifies the diagnostics of an analyzer and the fixes of a code fix provider.
///
/// Sources use `[|...|]` for expected diagnostic spans and `{|...|}` for
/// additional locations. Expected texts use `{|kind:...|}` for annotations.
pub struct DiagnosticVerifier<L, A, F> {
    language: L,
    analyzer: A,
    fix_provider: F,
    descriptor: Arc<DiagnosticDescriptor>,
    options: TestOptions,
}

/// A document that passed the diagnostic check.
struct CheckedDocument<C> {
    document: Document,
    expected_documents: Vec<ExpectedDocument>,
    compilation: C,
    expected: Vec<Diagnostic>,
    actual: Vec<Diagnostic>,
    options: TestOptions,
}

impl<L, A, F> DiagnosticVerifier<L, A, F>
where
    L: Language,
    A: Analyzer<L>,
    F: CodeFixProvider<L>,
{
    /// Creates a verifier for the rule described by `descriptor` with the default options of the language.
    pub fn new(language: L, analyzer: A, fix_provider: F, descriptor: Arc<DiagnosticDescriptor>) -> Self {
        let options = language.default_options();
        Self {
            language,
            analyzer,
            fix_provider,
            descriptor,
            options,
        }
    }

    /// Returns the verifier with the given default options.
    pub fn with_options(self, options: TestOptions) -> Self {
        Self { options, ..self }
    }

    pub fn options(&self) -> &TestOptions {
        &self.options
    }

    pub fn descriptor(&self) -> &Arc<DiagnosticDescriptor> {
        &self.descriptor
    }

    /// Parses a source fixture into test data for the rule.
    pub fn test_data(&self, source: &str) -> VerifyResult<DiagnosticTestData> {
        let code = TestCode::parse(source)?;
        Ok(DiagnosticTestData::from_code(self.descriptor.clone(), &code))
    }

    /// Verifies that the marked spans are exactly the diagnostics of the rule.
    pub fn verify_diagnostic(&self, source: &str) -> VerifyResult<()> {
        self.verify_diagnostic_data(&self.test_data(source)?, None, &CancellationToken::new())
    }

    /// Replaces the `[||]` placeholder with `source_data` and verifies the diagnostic.
    pub fn verify_diagnostic_replacing(&self, source: &str, source_data: &str) -> VerifyResult<()> {
        let code = TestCode::parse_with_data(source, source_data, source_data)?;
        let data = DiagnosticTestData::from_code(self.descriptor.clone(), &code);
        self.verify_diagnostic_data(&data, None, &CancellationToken::new())
    }

    /// Verifies the diagnostics of the test data.
    pub fn verify_diagnostic_data(
        &self,
        data: &DiagnosticTestData,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        tracing::debug!(id = data.descriptor.id.as_str(), "verifying diagnostic");
        let checked = self.check_diagnostics(data, options, cancellation)?;
        common::verify_additional_documents(checked.document.project(), &checked.expected_documents)
    }

    /// Verifies the diagnostics, fixes them and compares the result with `expected`.
    pub fn verify_diagnostic_and_fix(&self, source: &str, expected: &str) -> VerifyResult<()> {
        let expected = ExpectedTestState::parse(expected)?;
        self.verify_diagnostic_and_fix_data(
            &self.test_data(source)?,
            &expected,
            None,
            &CancellationToken::new(),
        )
    }

    /// Replaces the `[||]` placeholder with `source_data` (input) and `expected_data` (expected
    /// output) and verifies the diagnostic and its fix.
    pub fn verify_diagnostic_and_fix_replacing(
        &self,
        source: &str,
        source_data: &str,
        expected_data: &str,
    ) -> VerifyResult<()> {
        let code = TestCode::parse_with_data(source, source_data, expected_data)?;
        let expected = ExpectedTestState::parse(code.expected_value.as_deref().unwrap_or_default())?;
        let data = DiagnosticTestData::from_code(self.descriptor.clone(), &code);
        self.verify_diagnostic_and_fix_data(&data, &expected, None, &CancellationToken::new())
    }

    /// Verifies the diagnostics of the test data, fixes them until none is left and compares
    /// the result with the expected state.
    pub fn verify_diagnostic_and_fix_data(
        &self,
        data: &DiagnosticTestData,
        expected: &ExpectedTestState,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        tracing::debug!(id = data.descriptor.id.as_str(), "verifying diagnostic and fix");
        let checked = self.check_diagnostics(data, options, cancellation)?;
        for diagnostic in &checked.expected {
            common::verify_fixable_diagnostics::<L, _>(&self.fix_provider, diagnostic.id())?;
        }

        let outcome = FixLoop {
            language: &self.language,
            target: FixTarget::Analyzer {
                analyzer: &self.analyzer,
                expected: &checked.expected,
            },
            fix_provider: &self.fix_provider,
            equivalence_key: data.equivalence_key.as_deref(),
            expected_title: expected.code_action_title.as_deref(),
            options: &checked.options,
            cancellation,
        }
        .run(checked.document)?;

        common::verify_expected_document(expected, &outcome.document)?;
        common::verify_additional_documents(outcome.document.project(), &checked.expected_documents)
    }

    /// Verifies the diagnostics and that no fix is offered for them.
    pub fn verify_diagnostic_and_no_fix(&self, source: &str) -> VerifyResult<()> {
        self.verify_diagnostic_and_no_fix_data(&self.test_data(source)?, None, &CancellationToken::new())
    }

    /// Verifies the diagnostics of the test data and that no fix is offered for them.
    pub fn verify_diagnostic_and_no_fix_data(
        &self,
        data: &DiagnosticTestData,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        tracing::debug!(id = data.descriptor.id.as_str(), "verifying diagnostic and no fix");
        let checked = self.check_diagnostics(data, options, cancellation)?;
        let fixable = self.fix_provider.fixable_diagnostic_ids();

        for diagnostic in &checked.actual {
            let is_candidate = checked.expected.iter().any(|it| it.id() == diagnostic.id())
                && fixable.iter().any(|id| id == diagnostic.id());
            if !is_candidate {
                continue;
            }
            let registrations = request_code_fixes::<L, _>(
                &self.fix_provider,
                &checked.document,
                &checked.compilation,
                diagnostic,
                cancellation,
            )?;
            let matches = matching_fixes(&registrations, diagnostic, data.equivalence_key.as_deref());
            if !matches.is_empty() {
                return Err(VerifyError::UnexpectedFix {
                    actions: matches.into_iter().map(|action| action.summary()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Verifies that the rule reports nothing for the source (markers are removed).
    pub fn verify_no_diagnostic(&self, source: &str) -> VerifyResult<()> {
        self.verify_no_diagnostic_data(&self.test_data(source)?, None, &CancellationToken::new())
    }

    /// Replaces the `[||]` placeholder with `source_data` and verifies that the rule reports nothing.
    pub fn verify_no_diagnostic_replacing(&self, source: &str, source_data: &str) -> VerifyResult<()> {
        let code = TestCode::parse_with_data(source, source_data, source_data)?;
        let data = DiagnosticTestData::from_code(self.descriptor.clone(), &code);
        self.verify_no_diagnostic_data(&data, None, &CancellationToken::new())
    }

    /// Verifies that the rule of the test data reports nothing.
    pub fn verify_no_diagnostic_data(
        &self,
        data: &DiagnosticTestData,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        tracing::debug!(id = data.descriptor.id.as_str(), "verifying no diagnostic");
        let options = options.unwrap_or(&self.options).with_enabled_unless_overridden(&data.descriptor);
        let workspace = Workspace::new(self.language.file_extension());
        let (document, _) = workspace.create_document(&data.source, &data.additional_files, &options)?;

        let compilation = driver::compile(&self.language, document.project(), cancellation)?;
        common::verify_compiler_diagnostics(
            &driver::compiler_diagnostics(&self.language, &compilation),
            &options,
        )?;

        let diagnostics: Vec<Diagnostic> =
            driver::run_analyzer::<L, _>(&self.analyzer, &compilation, document.project(), cancellation)?
                .into_iter()
                .filter(|diagnostic| diagnostic.id() == data.descriptor.id)
                .collect();
        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::UnexpectedDiagnostic { diagnostics })
        }
    }

    fn check_diagnostics(
        &self,
        data: &DiagnosticTestData,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<CheckedDocument<L::Compilation>> {
        let options = options.unwrap_or(&self.options).with_enabled_unless_overridden(&data.descriptor);
        let workspace = Workspace::new(self.language.file_extension());
        let (document, expected_documents) =
            workspace.create_document(&data.source, &data.additional_files, &options)?;

        let expected = data.expected_diagnostics(&document);
        common::verify_supported_diagnostics::<L, _>(&self.analyzer, &expected)?;

        let compilation = driver::compile(&self.language, document.project(), cancellation)?;
        common::verify_compiler_diagnostics(
            &driver::compiler_diagnostics(&self.language, &compilation),
            &options,
        )?;

        let mut actual =
            driver::run_analyzer::<L, _>(&self.analyzer, &compilation, document.project(), cancellation)?;
        // Other rules of the analyzer may report at the same spans.
        if self.analyzer.supported_diagnostics().len() > 1 {
            actual.retain(|diagnostic| diagnostic.id() == data.descriptor.id);
        }

        let formatter = data.formatter.as_deref().unwrap_or(&InvariantFormatter);
        common::compare_diagnostics(
            &expected,
            &actual,
            data.diagnostic_message.as_deref(),
            formatter,
            data.verifies_additional_locations(),
        )?;

        Ok(CheckedDocument {
            document,
            expected_documents,
            compilation,
            expected,
            actual,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::document::AdditionalFile;
    use crate::options::ReportDiagnostic;
    use crate::test_utils::{word_descriptor, PlainText, ReplaceWordFix, WordAnalyzer};
    use crate::text::TextRange;

    type Verifier = DiagnosticVerifier<PlainText, WordAnalyzer, ReplaceWordFix>;

    fn verifier(fix_provider: ReplaceWordFix) -> Verifier {
        let descriptor = word_descriptor("W0001", "foo");
        DiagnosticVerifier::new(
            PlainText,
            WordAnalyzer::new(descriptor.clone(), "foo"),
            fix_provider,
            descriptor,
        )
    }

    fn foo_verifier() -> Verifier {
        verifier(ReplaceWordFix::new("foo", "bar"))
    }

    #[test]
    fn verify_diagnostic_works() {
        let verifier = foo_verifier();
        for source in ["[|foo|]", "a [|foo|] b\n[|foo|]", "x == [|foo|];"] {
            assert!(verifier.verify_diagnostic(source).is_ok(), "source: {source}");
        }
        assert!(verifier.verify_diagnostic_replacing("a [||] b", "foo").is_ok());
    }

    #[test]
    fn verify_diagnostic_failures_work() {
        let verifier = foo_verifier();

        assert!(matches!(
            verifier.verify_diagnostic("bar"),
            Err(VerifyError::ExpectedLocationNotFound)
        ));
        assert!(matches!(
            verifier.verify_diagnostic("[|bar|]"),
            Err(VerifyError::DiagnosticNotFound { expected: 1 })
        ));
        match verifier.verify_diagnostic("[|foo|] foo") {
            Err(VerifyError::DiagnosticCountMismatch {
                expected,
                actual,
                diagnostics,
            }) => {
                assert_eq!((expected, actual), (1, 2));
                assert_eq!(diagnostics.len(), 2);
            }
            result => panic!("expected count mismatch, got: {result:?}"),
        }
        match verifier.verify_diagnostic("foo [|bar|]") {
            Err(error @ VerifyError::DiagnosticSpanMismatch { .. }) => {
                let message = error.to_string();
                assert!(
                    message.starts_with("Diagnostic expected to start at column 5, actual: 1"),
                    "{message}"
                );
                assert!(message.contains("Actual diagnostic:\ntest.txt(1,1): warning W0001: Found 'foo'"));
            }
            result => panic!("expected span mismatch, got: {result:?}"),
        }
        assert!(matches!(
            verifier.verify_diagnostic("[|foo|] ERR"),
            Err(VerifyError::CompilerDiagnostics { .. })
        ));
    }

    #[test]
    fn expected_order_does_not_matter() {
        let verifier = foo_verifier();
        let data = DiagnosticTestData::new(
            verifier.descriptor().clone(),
            "foo foo",
            vec![
                TextRange::new(4.into(), 7.into()),
                TextRange::new(0.into(), 3.into()),
            ],
            Vec::new(),
        );
        assert!(verifier
            .verify_diagnostic_data(&data, None, &CancellationToken::new())
            .is_ok());
    }

    #[test]
    fn messages_are_compared() {
        let verifier = foo_verifier();
        let data = verifier.test_data("[|foo|]").unwrap();
        let cancellation = CancellationToken::new();

        assert!(verifier
            .verify_diagnostic_data(&data.with_diagnostic_message("Found 'foo'"), None, &cancellation)
            .is_ok());
        assert!(matches!(
            verifier.verify_diagnostic_data(&data.with_diagnostic_message("Other"), None, &cancellation),
            Err(VerifyError::MessageMismatch { .. })
        ));
    }

    #[test]
    fn unsupported_diagnostic_fails() {
        let verifier = foo_verifier();
        let data = DiagnosticTestData::from_code(
            word_descriptor("W0009", "foo"),
            &TestCode::parse("[|foo|]").unwrap(),
        );
        match verifier.verify_diagnostic_data(&data, None, &CancellationToken::new()) {
            Err(VerifyError::UnsupportedDiagnostic { analyzer, id, supported }) => {
                assert_eq!(analyzer, "WordAnalyzer");
                assert_eq!(id, "W0009");
                assert_eq!(supported, "W0001");
            }
            result => panic!("expected unsupported diagnostic, got: {result:?}"),
        }
    }

    #[test]
    fn verify_diagnostic_and_fix_works() {
        let verifier = foo_verifier();

        assert!(verifier.verify_diagnostic_and_fix("x [|foo|]", "x bar").is_ok());
        assert!(verifier
            .verify_diagnostic_and_fix("[|foo|]\n[|foo|]", "bar\nbar")
            .is_ok());
        assert!(verifier
            .verify_diagnostic_and_fix_replacing("x [||];", "foo", "bar")
            .is_ok());

        match verifier.verify_diagnostic_and_fix("x [|foo|]", "x baz") {
            Err(VerifyError::TextMismatch { position, .. }) => assert_eq!(position.to_string(), "1,5"),
            result => panic!("expected text mismatch, got: {result:?}"),
        }
    }

    #[test]
    fn code_action_title_is_checked() {
        let verifier = foo_verifier();
        let data = verifier.test_data("[|foo|]").unwrap();
        let cancellation = CancellationToken::new();
        let expected = ExpectedTestState::from_source("bar");

        assert!(verifier
            .verify_diagnostic_and_fix_data(
                &data,
                &expected.with_code_action_title("Replace with 'bar'"),
                None,
                &cancellation
            )
            .is_ok());
        assert!(matches!(
            verifier.verify_diagnostic_and_fix_data(
                &data,
                &expected.with_code_action_title("Other"),
                None,
                &cancellation
            ),
            Err(VerifyError::TitleMismatch { .. })
        ));
    }

    #[test]
    fn additional_documents_are_compared() {
        let verifier = foo_verifier();
        let data = verifier.test_data("[|foo|]").unwrap();
        let cancellation = CancellationToken::new();
        let expected = ExpectedTestState::from_source("bar");

        let unchanged = data.with_additional_files(vec![AdditionalFile::with_expected("qux", "qux")]);
        assert!(verifier
            .verify_diagnostic_and_fix_data(&unchanged, &expected, None, &cancellation)
            .is_ok());

        let changed = data.with_additional_files(vec![AdditionalFile::with_expected("qux", "quux")]);
        match verifier.verify_diagnostic_and_fix_data(&changed, &expected, None, &cancellation) {
            Err(VerifyError::AdditionalDocumentMismatch { path, .. }) => assert_eq!(path, "test1.txt"),
            result => panic!("expected additional document mismatch, got: {result:?}"),
        }
    }

    #[test]
    fn report_overrides_are_kept() {
        let verifier = foo_verifier();
        let data = verifier.test_data("foo").unwrap();
        let cancellation = CancellationToken::new();
        let with_report = |report| {
            let options = verifier.options();
            options.with_compilation_options(
                options.compilation_options().with_diagnostic_option("W0001", report),
            )
        };

        let suppressed = with_report(ReportDiagnostic::Suppress);
        assert!(verifier
            .verify_no_diagnostic_data(&data, Some(&suppressed), &cancellation)
            .is_ok());

        let escalated = with_report(ReportDiagnostic::Report(Severity::Error));
        match verifier.verify_no_diagnostic_data(&data, Some(&escalated), &cancellation) {
            Err(VerifyError::UnexpectedDiagnostic { diagnostics }) => {
                assert_eq!(diagnostics[0].severity(), Severity::Error);
            }
            result => panic!("expected unexpected diagnostic, got: {result:?}"),
        }
    }

    #[test]
    fn additional_documents_are_compared_without_fix() {
        let verifier = foo_verifier();
        let data = verifier.test_data("[|foo|]").unwrap();
        let cancellation = CancellationToken::new();

        for (expected_additional, is_ok) in [("qux", true), ("quux", false)] {
            let data =
                data.with_additional_files(vec![AdditionalFile::with_expected("qux", expected_additional)]);
            let result = verifier.verify_diagnostic_data(&data, None, &cancellation);

            assert_eq!(result.is_ok(), is_ok, "expected: {expected_additional}, result: {result:?}");
            if !is_ok {
                assert!(
                    matches!(result, Err(VerifyError::AdditionalDocumentMismatch { .. })),
                    "{result:?}"
                );
            }
        }
    }

    #[test]
    fn verify_diagnostic_and_no_fix_works() {
        assert!(verifier(ReplaceWordFix::new("zzz", "bar"))
            .verify_diagnostic_and_no_fix("[|foo|]")
            .is_ok());
        assert!(matches!(
            foo_verifier().verify_diagnostic_and_no_fix("[|foo|]"),
            Err(VerifyError::UnexpectedFix { .. })
        ));
    }

    #[test]
    fn verify_no_diagnostic_works() {
        let verifier = foo_verifier();

        assert!(verifier.verify_no_diagnostic("bar baz").is_ok());
        assert!(verifier.verify_no_diagnostic_replacing("a [||] b", "food").is_ok());
        match verifier.verify_no_diagnostic("bar foo") {
            Err(error @ VerifyError::UnexpectedDiagnostic { .. }) => assert_eq!(
                error.to_string(),
                "No diagnostic expected.\n\ntest.txt(1,5): warning W0001: Found 'foo'"
            ),
            result => panic!("expected unexpected diagnostic, got: {result:?}"),
        }
    }
}
