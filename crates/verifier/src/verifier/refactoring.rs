//! Refactoring verification.

use std::cmp::Reverse;

use itertools::Itertools;

use crate::action::{matching_actions, request_refactorings, RefactoringProvider};
use crate::cancel::CancellationToken;
use crate::data::RefactoringTestData;
use crate::document::Workspace;
use crate::driver::{self, Language};
use crate::error::{VerifyError, VerifyResult};
use crate::fixture::{ExpectedTestState, TestCode};
use crate::options::TestOptions;
use crate::text::TextRange;
use crate::verifier::common;

/// Verifies the refactorings of a refactoring provider.
///
/// Sources use `[|...|]` for the spans at which the refactoring is invoked.
/// Every span is verified in a fresh workspace, in descending order of span start.
pub struct RefactoringVerifier<L, R> {
    language: L,
    provider: R,
    options: TestOptions,
}

impl<L, R> RefactoringVerifier<L, R>
where
    L: Language,
    R: RefactoringProvider<L>,
{
    pub fn new(language: L, provider: R) -> Self {
        let options = language.default_options();
        Self {
            language,
            provider,
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

    /// Verifies that the refactoring at every marked span produces `expected`.
    pub fn verify_refactoring(&self, source: &str, expected: &str) -> VerifyResult<()> {
        let data = RefactoringTestData::from_code(&TestCode::parse(source)?);
        let expected = ExpectedTestState::parse(expected)?;
        self.verify_refactoring_data(&data, &expected, None, &CancellationToken::new())
    }

    /// Replaces the `[||]` placeholder with `source_data` (input) and `expected_data` (expected
    /// output) and verifies the refactoring.
    pub fn verify_refactoring_replacing(
        &self,
        source: &str,
        source_data: &str,
        expected_data: &str,
    ) -> VerifyResult<()> {
        let code = TestCode::parse_with_data(source, source_data, expected_data)?;
        let expected = ExpectedTestState::parse(code.expected_value.as_deref().unwrap_or_default())?;
        self.verify_refactoring_data(
            &RefactoringTestData::from_code(&code),
            &expected,
            None,
            &CancellationToken::new(),
        )
    }

    /// Verifies the refactoring at every span of the test data.
    pub fn verify_refactoring_data(
        &self,
        data: &RefactoringTestData,
        expected: &ExpectedTestState,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        if data.spans.is_empty() {
            return Err(VerifyError::SpanNotFound);
        }
        let options = options.unwrap_or(&self.options);

        for span in spans_descending(data) {
            tracing::debug!(span = ?span, "verifying refactoring");
            let workspace = Workspace::new(self.language.file_extension());
            let (document, expected_documents) =
                workspace.create_document(&data.source, &data.additional_files, options)?;

            let compilation = driver::compile(&self.language, document.project(), cancellation)?;
            let compiler_diagnostics = driver::compiler_diagnostics(&self.language, &compilation);
            common::verify_compiler_diagnostics(&compiler_diagnostics, options)?;

            let actions =
                request_refactorings::<L, _>(&self.provider, &document, &compilation, *span, cancellation)?;
            let action =
                common::single_refactoring::<L, _>(&self.provider, &actions, data.equivalence_key.as_deref())?;
            cancellation.check()?;
            let document =
                common::apply_action(&document, action, expected.code_action_title.as_deref())?;

            let compilation = driver::compile(&self.language, document.project(), cancellation)?;
            let new_compiler_diagnostics = driver::compiler_diagnostics(&self.language, &compilation);
            common::verify_compiler_diagnostics(&new_compiler_diagnostics, options)?;
            common::verify_no_new_compiler_diagnostics(
                &compiler_diagnostics,
                &new_compiler_diagnostics,
                options,
            )?;

            common::verify_expected_document(expected, &document)?;
            common::verify_additional_documents(document.project(), &expected_documents)?;
        }
        Ok(())
    }

    /// Verifies that no refactoring is offered at any marked span.
    pub fn verify_no_refactoring(&self, source: &str) -> VerifyResult<()> {
        let data = RefactoringTestData::from_code(&TestCode::parse(source)?);
        self.verify_no_refactoring_data(&data, None, &CancellationToken::new())
    }

    /// Verifies that no (matching) refactoring is offered at any span of the test data.
    pub fn verify_no_refactoring_data(
        &self,
        data: &RefactoringTestData,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        if data.spans.is_empty() {
            return Err(VerifyError::SpanNotFound);
        }
        let options = options.unwrap_or(&self.options);

        for span in spans_descending(data) {
            tracing::debug!(span = ?span, "verifying no refactoring");
            let workspace = Workspace::new(self.language.file_extension());
            let (document, _) = workspace.create_document(&data.source, &data.additional_files, options)?;

            let compilation = driver::compile(&self.language, document.project(), cancellation)?;
            common::verify_compiler_diagnostics(
                &driver::compiler_diagnostics(&self.language, &compilation),
                options,
            )?;

            let actions =
                request_refactorings::<L, _>(&self.provider, &document, &compilation, *span, cancellation)?;
            let matches = matching_actions(&actions, data.equivalence_key.as_deref());
            if !matches.is_empty() {
                return Err(VerifyError::UnexpectedRefactoring {
                    actions: matches.into_iter().map(|action| action.summary()).collect(),
                });
            }
        }
        Ok(())
    }
}

/// Returns the spans of the test data ordered by descending start.
fn spans_descending(data: &RefactoringTestData) -> impl Iterator<Item = &TextRange> {
    data.spans.iter().sorted_by_key(|span| Reverse(span.start()))
}
