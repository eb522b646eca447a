//! Utilities for fixcheck host integration tests.

#![allow(dead_code)]

use fixcheck::{driver, Analyzer, CancellationToken, Diagnostic, Language, TestOptions, Workspace};
use fixcheck_host::RustLanguage;
use test_utils::{TestCase, TestCaseModification, TestCaseParams};

/// Returns the (modified) source code of a test case.
pub fn test_code(source: &str, test_case: &TestCase) -> String {
    let mut test_code = test_utils::get_source_code(source);
    if let Some(modifications) = &test_case.modifications {
        test_utils::apply_test_modifications(&mut test_code, modifications);
    }
    test_code
}

/// Returns the test code with `[|...|]` markers around the spans of the test case.
pub fn marked_code(test_code: &str, test_case: &TestCase) -> String {
    match &test_case.params {
        Some(params) => test_utils::mark_spans(test_code, &params.spans),
        None => test_code.to_owned(),
    }
}

/// Returns the expected source after the modifications.
pub fn expected_code(test_code: &str, edits: &[TestCaseModification]) -> String {
    let mut expected = test_code.to_owned();
    test_utils::apply_test_modifications(&mut expected, edits);
    expected
}

/// Returns the default options with the metadata references of the test case.
pub fn options(params: Option<&TestCaseParams>) -> TestOptions {
    params
        .into_iter()
        .flat_map(|params| params.metadata_references.iter())
        .fold(RustLanguage.default_options(), |options, reference| {
            options.add_metadata_reference(*reference)
        })
}

/// Runs the analyzer with all its rules enabled.
pub fn analyze<A: Analyzer<RustLanguage>>(analyzer: &A, code: &str) -> Vec<Diagnostic> {
    let options = analyzer
        .supported_diagnostics()
        .iter()
        .fold(RustLanguage.default_options(), |options, descriptor| {
            options.with_enabled(descriptor)
        });
    let workspace = Workspace::new(RustLanguage.file_extension());
    let (document, _) = workspace.create_document(code, &[], &options).unwrap();
    let cancellation = CancellationToken::new();
    let compilation = driver::compile(&RustLanguage, document.project(), &cancellation).unwrap();
    driver::run_analyzer::<RustLanguage, _>(analyzer, &compilation, document.project(), &cancellation)
        .unwrap()
}
