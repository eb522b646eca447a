//! # fixcheck host
//! A Rust host language for the [`fixcheck`] verification harness,
//! with sample analyzers, code fixes and refactorings built on [`ra_ap_syntax`].
//!
//! # Example
//! Verifying a diagnostic and its fix.
//!
//! ```
//! use fixcheck::DiagnosticVerifier;
//! use fixcheck_host::{descriptors, ComparisonAnalyzer, ComparisonFixProvider, RustLanguage};
//!
//! let verifier = DiagnosticVerifier::new(
//!     RustLanguage,
//!     ComparisonAnalyzer,
//!     ComparisonFixProvider,
//!     descriptors::COMPARISON_WITH_NONE.clone(),
//! );
//!
//! verifier
//!     .verify_diagnostic_and_fix(
//!         "fn f(x: Option<u8>) -> bool {\n    [|x == None|]\n}",
//!         "fn f(x: Option<u8>) -> bool {\n    x.is_none()\n}",
//!     )
//!     .unwrap();
//! ```

pub use self::language::{ParsedFile, RustCompilation, RustLanguage};
pub use self::refactorings::{IntroduceLocalRefactoring, SwapOperandsRefactoring};
pub use self::rules::{
    ComparisonAnalyzer, ComparisonFixProvider, EmptyElseAnalyzer, RemoveEmptyElseFixProvider,
    RemoveUnresolvedImportFixProvider,
};

pub mod compiler;
pub mod descriptors;
mod language;
mod refactorings;
mod rules;
mod utils;

#[cfg(test)]
mod test_utils;
