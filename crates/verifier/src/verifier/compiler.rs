//! Compiler diagnostic fix verification.

use crate::action::{matching_fixes, request_code_fixes, CodeFixProvider};
use crate::cancel::CancellationToken;
use crate::convergence::{FixLoop, FixTarget};
use crate::data::CompilerDiagnosticFixTestData;
use crate::document::Workspace;
use crate::driver::{self, Language};
use crate::error::{VerifyError, VerifyResult};
use crate::fixture::ExpectedTestState;
use crate::options::TestOptions;
use crate::verifier::common;

/// Verifies a code fix provider that fixes a compiler diagnostic.
pub struct CompilerDiagnosticFixVerifier<L, F> {
    language: L,
    provider: F,
    diagnostic_id: String,
    options: TestOptions,
}

impl<L, F> CompilerDiagnosticFixVerifier<L, F>
where
    L: Language,
    F: CodeFixProvider<L>,
{
    /// Creates a verifier for fixes of the compiler diagnostic `diagnostic_id`.
    pub fn new(language: L, provider: F, diagnostic_id: &str) -> Self {
        let options = language.default_options();
        Self {
            language,
            provider,
            diagnostic_id: diagnostic_id.to_owned(),
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

    pub fn diagnostic_id(&self) -> &str {
        &self.diagnostic_id
    }

    /// Fixes the compiler diagnostics of `source` and compares the result with `expected`.
    pub fn verify_fix(&self, source: &str, expected: &str) -> VerifyResult<()> {
        let expected = ExpectedTestState::parse(expected)?;
        self.verify_fix_data(
            &CompilerDiagnosticFixTestData::new(source),
            &expected,
            None,
            &CancellationToken::new(),
        )
    }

    /// Fixes the compiler diagnostics of the test data until none is left and compares the
    /// result with the expected state.
    pub fn verify_fix_data(
        &self,
        data: &CompilerDiagnosticFixTestData,
        expected: &ExpectedTestState,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        tracing::debug!(id = self.diagnostic_id.as_str(), "verifying compiler diagnostic fix");
        common::verify_fixable_diagnostics::<L, _>(&self.provider, &self.diagnostic_id)?;

        let options = options.unwrap_or(&self.options);
        let workspace = Workspace::new(self.language.file_extension());
        let (document, expected_documents) =
            workspace.create_document(&data.source, &data.additional_files, options)?;

        let outcome = FixLoop {
            language: &self.language,
            target: FixTarget::Compiler {
                id: &self.diagnostic_id,
            },
            fix_provider: &self.provider,
            equivalence_key: data.equivalence_key.as_deref(),
            expected_title: expected.code_action_title.as_deref(),
            options,
            cancellation,
        }
        .run(document)?;

        common::verify_expected_document(expected, &outcome.document)?;
        common::verify_additional_documents(outcome.document.project(), &expected_documents)
    }

    /// Verifies that no fix is offered for the compiler diagnostics of `source`.
    pub fn verify_no_fix(&self, source: &str) -> VerifyResult<()> {
        self.verify_no_fix_data(
            &CompilerDiagnosticFixTestData::new(source),
            None,
            &CancellationToken::new(),
        )
    }

    /// Verifies that no (matching) fix is offered for any fixable compiler diagnostic of the test data.
    pub fn verify_no_fix_data(
        &self,
        data: &CompilerDiagnosticFixTestData,
        options: Option<&TestOptions>,
        cancellation: &CancellationToken,
    ) -> VerifyResult<()> {
        tracing::debug!(id = self.diagnostic_id.as_str(), "verifying no compiler diagnostic fix");
        let options = options.unwrap_or(&self.options);
        let workspace = Workspace::new(self.language.file_extension());
        let (document, _) = workspace.create_document(&data.source, &data.additional_files, options)?;

        let compilation = driver::compile(&self.language, document.project(), cancellation)?;
        let fixable = self.provider.fixable_diagnostic_ids();
        for diagnostic in driver::compiler_diagnostics(&self.language, &compilation)
            .iter()
            .filter(|diagnostic| fixable.iter().any(|id| id == diagnostic.id()))
        {
            let registrations = request_code_fixes::<L, _>(
                &self.provider,
                &document,
                &compilation,
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
}
