//! # fixcheck
//! A verification harness for static analysis diagnostics, code fixes and refactorings.
//!
//! Test authors describe a source fixture with inline markers, and the harness verifies that
//! an analyzer reports exactly the marked diagnostics, that a code fix provider converges to
//! the expected text, or that a refactoring produces the expected text.
//!
//! # Example
//! Verifying a diagnostic and its fix.
//!
//! ```
//! use std::sync::Arc;
//! use fixcheck::{
//!     AnalysisContext, Analyzer, CodeAction, CodeFixContext, CodeFixProvider, Diagnostic,
//!     DiagnosticDescriptor, DiagnosticVerifier, Language, Project, Severity, TextEdit,
//!     TextRange, TextSize,
//! };
//!
//! // Plain text without compiler diagnostics.
//! struct Text;
//!
//! impl Language for Text {
//!     type Compilation = Project;
//!
//!     fn name(&self) -> &str {
//!         "Text"
//!     }
//!
//!     fn file_extension(&self) -> &str {
//!         "txt"
//!     }
//!
//!     fn compile(&self, project: &Project) -> Project {
//!         project.clone()
//!     }
//!
//!     fn compiler_diagnostics(&self, _: &Project) -> Vec<Diagnostic> {
//!         Vec::new()
//!     }
//! }
//!
//! // Reports every `TODO`.
//! struct TodoAnalyzer(Arc<DiagnosticDescriptor>);
//!
//! impl Analyzer<Text> for TodoAnalyzer {
//!     fn supported_diagnostics(&self) -> Vec<Arc<DiagnosticDescriptor>> {
//!         vec![self.0.clone()]
//!     }
//!
//!     fn analyze(&self, project: &Project, context: &mut AnalysisContext<'_>) -> anyhow::Result<()> {
//!         for document in project.documents() {
//!             for (offset, _) in document.text().match_indices("TODO") {
//!                 let range = TextRange::at(TextSize::try_from(offset)?, TextSize::of("TODO"));
//!                 context.report(Diagnostic::new(self.0.clone(), document.location(range)));
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! // Replaces `TODO` with `DONE`.
//! struct DoneFix;
//!
//! impl CodeFixProvider<Text> for DoneFix {
//!     fn fixable_diagnostic_ids(&self) -> Vec<String> {
//!         vec!["TXT001".to_owned()]
//!     }
//!
//!     fn register_code_fixes(&self, context: &mut CodeFixContext<'_, Text>) -> anyhow::Result<()> {
//!         let edit = TextEdit::replace("DONE".to_owned(), context.span());
//!         let action = CodeAction::document_edits("Mark as done", None, context.document(), vec![edit]);
//!         context.register_code_fix(action);
//!         Ok(())
//!     }
//! }
//!
//! let descriptor = Arc::new(DiagnosticDescriptor::new(
//!     "TXT001",
//!     "Unfinished work",
//!     "Unfinished work",
//!     "Style",
//!     Severity::Warning,
//! ));
//! let verifier = DiagnosticVerifier::new(Text, TodoAnalyzer(descriptor.clone()), DoneFix, descriptor);
//!
//! verifier.verify_diagnostic("a [|TODO|] b [|TODO|]").unwrap();
//! verifier.verify_diagnostic_and_fix("a [|TODO|] b", "a DONE b").unwrap();
//! verifier.verify_no_diagnostic("a DONE b").unwrap();
//! ```

pub use self::action::{
    ActionSummary, CodeAction, CodeActionBody, CodeFixContext, CodeFixProvider,
    CodeFixRegistration, RefactoringContext, RefactoringProvider,
};
pub use self::cancel::CancellationToken;
pub use self::convergence::{FixLoop, FixOutcome, FixTarget};
pub use self::data::{CompilerDiagnosticFixTestData, DiagnosticTestData, RefactoringTestData};
pub use self::diagnostic::{
    deep_equal, deep_equal_all, DescriptorComparer, Diagnostic, DiagnosticComparer,
    DiagnosticDescriptor, InvariantFormatter, Location, MessageFormatter, Severity,
    SourceLocation,
};
pub use self::document::{
    AdditionalFile, Document, DocumentChanges, DocumentId, ExpectedDocument, Project, Workspace,
};
pub use self::driver::{AnalysisContext, Analyzer, Language};
pub use self::error::{VerifyError, VerifyResult};
pub use self::fixture::{ExpectedTestState, TestCode};
pub use self::naming::NameGenerator;
pub use self::options::{
    CompilationOptions, ParseOptions, ReportDiagnostic, TestOptions, DEFAULT_MAX_FIX_ITERATIONS,
    DEFAULT_METADATA_REFERENCES,
};
pub use self::text::{
    Annotation, AnnotationKind, LineMap, LinePosition, LinePositionSpan, TextEdit, TextRange,
    TextSize,
};
pub use self::verifier::{CompilerDiagnosticFixVerifier, DiagnosticVerifier, RefactoringVerifier};

pub mod action;
pub mod cancel;
pub mod convergence;
pub mod data;
pub mod diagnostic;
pub mod document;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod naming;
pub mod options;
pub mod text;
mod utils;
pub mod verifier;

#[cfg(test)]
mod test_utils;
