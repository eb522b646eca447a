//! Verifiers for analyzers, code fixes and refactorings.
//!
//! Every verification creates its own workspace, so verifiers can be shared by
//! tests that run in parallel.

pub mod common;
mod compiler;
mod diagnostic;
mod refactoring;

pub use compiler::CompilerDiagnosticFixVerifier;
pub use diagnostic::DiagnosticVerifier;
pub use refactoring::RefactoringVerifier;
