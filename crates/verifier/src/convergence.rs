//! The code fix convergence loop.
//!
//! Repeatedly computes the diagnostics of a document, fixes one of them and applies the fix
//! until no targeted diagnostic remains.
//! Fails when a fix has no effect, when fixes oscillate between two states,
//! or when a fix introduces new compiler diagnostics.

use crate::action::{request_code_fixes, CodeFixProvider};
use crate::cancel::CancellationToken;
use crate::diagnostic::{deep_equal_all, Diagnostic};
use crate::document::Document;
use crate::driver::{self, Analyzer, Language};
use crate::error::{VerifyError, VerifyResult};
use crate::options::TestOptions;
use crate::verifier::common;

/// The diagnostics the loop fixes.
pub enum FixTarget<'a, L: Language> {
    /// Diagnostics reported by an analyzer whose ids appear in the expected diagnostics.
    Analyzer {
        analyzer: &'a dyn Analyzer<L>,
        expected: &'a [Diagnostic],
    },
    /// Compiler diagnostics with the given id.
    Compiler { id: &'a str },
}

/// Configuration of a single convergence run.
pub struct FixLoop<'a, L: Language> {
    pub language: &'a L,
    pub target: FixTarget<'a, L>,
    pub fix_provider: &'a dyn CodeFixProvider<L>,
    /// Only actions with this equivalence key are candidates.
    pub equivalence_key: Option<&'a str>,
    /// Every applied action must have this title.
    pub expected_title: Option<&'a str>,
    pub options: &'a TestOptions,
    pub cancellation: &'a CancellationToken,
}

/// The result of a successful convergence run.
#[derive(Debug)]
pub struct FixOutcome {
    /// The document in the final snapshot.
    pub document: Document,
    /// Number of applied fixes.
    pub applied: usize,
}

impl<'a, L: Language> FixLoop<'a, L> {
    /// Runs the loop until no targeted diagnostic remains.
    pub fn run(&self, document: Document) -> VerifyResult<FixOutcome> {
        let mut document = document;
        let mut compilation = driver::compile(self.language, document.project(), self.cancellation)?;
        let mut compiler_diagnostics = driver::compiler_diagnostics(self.language, &compilation);
        if let FixTarget::Analyzer { .. } = self.target {
            common::verify_compiler_diagnostics(&compiler_diagnostics, self.options)?;
        }
        // Analyzer fixes are checked against the compiler diagnostics before the first fix.
        let baseline = compiler_diagnostics.clone();

        let mut previous: Vec<Diagnostic> = Vec::new();
        let mut previous_previous: Vec<Diagnostic> = Vec::new();
        let mut applied = 0usize;

        loop {
            self.cancellation.check()?;

            let diagnostics = match &self.target {
                FixTarget::Analyzer { analyzer, .. } => driver::run_analyzer::<L, _>(
                    *analyzer,
                    &compilation,
                    document.project(),
                    self.cancellation,
                )?,
                FixTarget::Compiler { .. } => compiler_diagnostics.clone(),
            };
            tracing::debug!(
                iteration = applied + 1,
                diagnostics = diagnostics.len(),
                "fix iteration"
            );

            if diagnostics.is_empty() {
                if applied == 0 {
                    return Err(match self.target {
                        FixTarget::Analyzer { .. } => VerifyError::NoDiagnosticFound,
                        FixTarget::Compiler { .. } => VerifyError::NoCompilerDiagnosticFound,
                    });
                }
                break;
            }

            if let FixTarget::Compiler { .. } = self.target {
                if !previous.is_empty() {
                    common::verify_no_new_compiler_diagnostics(&previous, &diagnostics, self.options)?;
                }
            }

            if deep_equal_all(&diagnostics, &previous) {
                return Err(VerifyError::FixHadNoEffect { diagnostics });
            }

            if let FixTarget::Analyzer { .. } = self.target {
                if deep_equal_all(&diagnostics, &previous_previous) {
                    return Err(VerifyError::InfiniteLoop { diagnostics });
                }
            }

            let Some(diagnostic) = self.find_diagnostic_to_fix(&diagnostics) else {
                if applied == 0 {
                    return Err(self.no_matching_diagnostic(diagnostics));
                }
                break;
            };
            tracing::debug!(diagnostic = %diagnostic, "fixing diagnostic");

            if applied >= self.options.max_fix_iterations() {
                return Err(VerifyError::IterationLimitExceeded {
                    limit: self.options.max_fix_iterations(),
                    diagnostics,
                });
            }

            let registrations = request_code_fixes::<L, _>(
                self.fix_provider,
                &document,
                &compilation,
                diagnostic,
                self.cancellation,
            )?;
            let action = common::single_fix::<L, _>(
                self.fix_provider,
                &registrations,
                diagnostic,
                self.equivalence_key,
            )?;
            self.cancellation.check()?;
            document = common::apply_action(&document, action, self.expected_title)?;
            applied += 1;

            compilation = driver::compile(self.language, document.project(), self.cancellation)?;
            let new_compiler_diagnostics = driver::compiler_diagnostics(self.language, &compilation);
            if let FixTarget::Analyzer { .. } = self.target {
                common::verify_compiler_diagnostics(&new_compiler_diagnostics, self.options)?;
                common::verify_no_new_compiler_diagnostics(
                    &baseline,
                    &new_compiler_diagnostics,
                    self.options,
                )?;
            }
            compiler_diagnostics = new_compiler_diagnostics;

            previous_previous = std::mem::replace(&mut previous, diagnostics);
        }

        tracing::debug!(applied, "fix loop converged");
        Ok(FixOutcome { document, applied })
    }

    /// Returns the diagnostic to fix next (if any).
    ///
    /// For analyzer targets, the first diagnostic (in span order) whose id is expected.
    /// For compiler targets, the diagnostic with the id and the greatest span start.
    fn find_diagnostic_to_fix<'d>(&self, diagnostics: &'d [Diagnostic]) -> Option<&'d Diagnostic> {
        match &self.target {
            FixTarget::Analyzer { expected, .. } => diagnostics.iter().find(|diagnostic| {
                expected
                    .iter()
                    .any(|expected| expected.id() == diagnostic.id())
            }),
            FixTarget::Compiler { id } => diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.id() == *id)
                .reduce(|best, diagnostic| {
                    if diagnostic.span_start() > best.span_start() {
                        diagnostic
                    } else {
                        best
                    }
                }),
        }
    }

    fn no_matching_diagnostic(&self, diagnostics: Vec<Diagnostic>) -> VerifyError {
        match &self.target {
            FixTarget::Analyzer { expected, .. } => {
                let mut ids: Vec<String> = expected.iter().map(|it| it.id().to_owned()).collect();
                ids.dedup();
                VerifyError::NoMatchingDiagnostic {
                    expected: ids,
                    diagnostics,
                }
            }
            FixTarget::Compiler { id } => VerifyError::NoMatchingCompilerDiagnostic {
                id: (*id).to_owned(),
                diagnostics,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DiagnosticTestData;
    use crate::document::Workspace;
    use crate::fixture::TestCode;
    use crate::action::{CodeAction, CodeFixContext};
    use crate::test_utils::{
        word_descriptor, DuplicateFix, NoOpFix, OscillatingFix, PlainText,
        ReplaceWordFix, WordAnalyzer, ERROR_DIAGNOSTIC_ID,
    };
    use crate::text::{TextEdit, TextRange, TextSize};

    /// Replaces `foo` with `bar` and toggles a leading `NOTE` with `wait`.
    struct ToggleNoteFix;

    impl CodeFixProvider<PlainText> for ToggleNoteFix {
        fn fixable_diagnostic_ids(&self) -> Vec<String> {
            vec!["W0001".to_owned()]
        }

        fn register_code_fixes(&self, context: &mut CodeFixContext<'_, PlainText>) -> anyhow::Result<()> {
            let toggled = if context.document().text().starts_with("NOTE") {
                "wait"
            } else {
                "NOTE"
            };
            let edits = vec![
                TextEdit::replace(toggled.to_owned(), TextRange::up_to(TextSize::from(4))),
                TextEdit::replace("bar".to_owned(), context.span()),
            ];
            let action = CodeAction::document_edits("Toggle note", None, context.document(), edits);
            context.register_code_fix(action);
            Ok(())
        }
    }

    struct Setup {
        document: Document,
        expected: Vec<Diagnostic>,
        analyzer: WordAnalyzer,
        options: TestOptions,
    }

    fn setup(source: &str, word: &str) -> Setup {
        let code = TestCode::parse(source).unwrap();
        let descriptor = word_descriptor("W0001", word);
        let options = PlainText.default_options();
        let (document, _) = Workspace::new("txt")
            .create_document(&code.value, &[], &options)
            .unwrap();
        let expected =
            DiagnosticTestData::from_code(descriptor.clone(), &code).expected_diagnostics(&document);
        Setup {
            document,
            expected,
            analyzer: WordAnalyzer::new(descriptor, word),
            options,
        }
    }

    fn run(setup: &Setup, fix_provider: &dyn CodeFixProvider<PlainText>) -> VerifyResult<FixOutcome> {
        run_with(setup, fix_provider, None, &setup.options)
    }

    fn run_with(
        setup: &Setup,
        fix_provider: &dyn CodeFixProvider<PlainText>,
        equivalence_key: Option<&str>,
        options: &TestOptions,
    ) -> VerifyResult<FixOutcome> {
        FixLoop {
            language: &PlainText,
            target: FixTarget::Analyzer {
                analyzer: &setup.analyzer,
                expected: &setup.expected,
            },
            fix_provider,
            equivalence_key,
            expected_title: None,
            options,
            cancellation: &CancellationToken::new(),
        }
        .run(setup.document.clone())
    }

    #[test]
    fn terminates_after_k_fixes() {
        for (source, expected_text, expected_applied) in [
            ("[|foo|]", "bar", 1),
            ("[|foo|] foo foo", "bar bar bar", 3),
            ("a [|foo|]\nb [|foo|]", "a bar\nb bar", 2),
        ] {
            let setup = setup(source, "foo");
            let outcome = run(&setup, &ReplaceWordFix::new("foo", "bar")).unwrap();

            assert_eq!(outcome.document.text(), expected_text, "source: {source}");
            assert_eq!(outcome.applied, expected_applied, "source: {source}");
        }
    }

    #[test]
    fn no_diagnostic_fails() {
        let setup = setup("bar", "foo");
        assert!(matches!(
            run(&setup, &ReplaceWordFix::new("foo", "bar")),
            Err(VerifyError::NoDiagnosticFound)
        ));
    }

    #[test]
    fn no_op_fix_fails_on_second_iteration() {
        let setup = setup("[|foo|]", "foo");
        match run(&setup, &NoOpFix) {
            Err(VerifyError::FixHadNoEffect { diagnostics }) => assert_eq!(diagnostics.len(), 1),
            result => panic!("expected no-effect failure, got: {result:?}"),
        }
    }

    #[test]
    fn oscillation_is_detected() {
        let setup = setup("[|x|]", "x|yy");
        assert!(matches!(
            run(&setup, &OscillatingFix),
            Err(VerifyError::InfiniteLoop { .. })
        ));
    }

    #[test]
    fn iteration_limit_is_enforced() {
        let setup = setup("[|foo|] foo foo foo", "foo");
        let options = setup.options.with_max_fix_iterations(2);
        assert!(matches!(
            run_with(&setup, &ReplaceWordFix::new("foo", "bar"), None, &options),
            Err(VerifyError::IterationLimitExceeded { limit: 2, .. })
        ));
    }

    #[test]
    fn multiple_fixes_are_disambiguated_by_key() {
        let setup = setup("[|foo|]", "foo");

        match run(&setup, &DuplicateFix) {
            Err(VerifyError::MultipleFixesRegistered { provider, actions }) => {
                assert_eq!(provider, "DuplicateFix");
                assert_eq!(actions.len(), 2);
            }
            result => panic!("expected multiple fixes failure, got: {result:?}"),
        }

        let outcome = run_with(&setup, &DuplicateFix, Some("upper"), &setup.options).unwrap();
        assert_eq!(outcome.document.text(), "FOO_FIXED");

        match run_with(&setup, &DuplicateFix, Some("missing"), &setup.options) {
            Err(VerifyError::NoFixRegistered { candidates }) => assert_eq!(candidates.len(), 2),
            result => panic!("expected no fix failure, got: {result:?}"),
        }
    }

    #[test]
    fn new_compiler_diagnostics_fail() {
        // The fix introduces an error token.
        let setup = setup("[|foo|]", "foo");
        match run(&setup, &ReplaceWordFix::new("foo", "ERR")) {
            Err(VerifyError::CompilerDiagnostics { diagnostics, .. }) => {
                assert_eq!(diagnostics[0].id(), ERROR_DIAGNOSTIC_ID);
            }
            result => panic!("expected compiler diagnostics failure, got: {result:?}"),
        }

        // Tolerated by severity, but still new.
        let options = setup.options.add_allowed_compiler_diagnostic_id(ERROR_DIAGNOSTIC_ID);
        let outcome = run_with(&setup, &ReplaceWordFix::new("foo", "ERR"), None, &options).unwrap();
        assert_eq!(outcome.document.text(), "ERR");

        // Info notes are within the default ceiling, but new.
        assert!(matches!(
            run(&setup, &ReplaceWordFix::new("foo", "NOTE")),
            Err(VerifyError::NewCompilerDiagnostics { .. })
        ));
    }

    #[test]
    fn restored_compiler_diagnostics_are_not_new() {
        // The first fix removes the note, the second one restores it.
        let setup = setup("NOTE [|foo|] foo", "foo");
        let outcome = run(&setup, &ToggleNoteFix).unwrap();

        assert_eq!(outcome.document.text(), "NOTE bar bar");
        assert_eq!(outcome.applied, 2);
    }

    #[test]
    fn cancellation_aborts() {
        let setup = setup("[|foo|]", "foo");
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let result = FixLoop {
            language: &PlainText,
            target: FixTarget::Analyzer {
                analyzer: &setup.analyzer,
                expected: &setup.expected,
            },
            fix_provider: &ReplaceWordFix::new("foo", "bar"),
            equivalence_key: None,
            expected_title: None,
            options: &setup.options,
            cancellation: &cancellation,
        }
        .run(setup.document.clone());
        assert!(matches!(result, Err(VerifyError::Cancelled)));
    }

    #[test]
    fn compiler_target_fixes_last_diagnostic_first() {
        let options = PlainText.default_options().add_allowed_compiler_diagnostic_id(ERROR_DIAGNOSTIC_ID);
        let (document, _) = Workspace::new("txt")
            .create_document("ERR a ERR", &[], &options)
            .unwrap();
        let provider = ReplaceWordFix::new("ERR", "ok").for_id(ERROR_DIAGNOSTIC_ID);

        let outcome = FixLoop {
            language: &PlainText,
            target: FixTarget::Compiler {
                id: ERROR_DIAGNOSTIC_ID,
            },
            fix_provider: &provider,
            equivalence_key: None,
            expected_title: None,
            options: &options,
            cancellation: &CancellationToken::new(),
        }
        .run(document)
        .unwrap();

        assert_eq!(outcome.document.text(), "ok a ok");
        assert_eq!(outcome.applied, 2);
    }
}
