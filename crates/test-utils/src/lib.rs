//! Test utilities for the fixcheck host crate.

use std::cmp;
use std::fs;

pub mod fixtures;

/// Reads source code from a file in the `test_data` directory as a string.
///
/// `location` is the relative path of the source file minus the `.rs` extension.
pub fn get_source_code(location: &str) -> String {
    fs::read_to_string(format!("../../test_data/{location}.rs")).unwrap()
}

/// Returns the offset of `pat` in `subject`.
///
/// The offset is placed at the end of `pat` by default,
/// unless `pat` starts with `<-`, in which case it's placed at the beginning of `pat`.
///
/// `pat` is searched from the beginning of `subject` by default,
/// unless `pat` ends with `->`, in which case it's searched from the end of `subject`
/// (offsets are always calculated from the beginning of `subject`).
pub fn parse_offset_at(subject: &str, pat: Option<&str>) -> Option<usize> {
    let mut parsed_pat = pat;
    let mut position = Direction::End;
    let mut origin = Direction::Start;

    if let Some(substr) = parsed_pat {
        if substr.starts_with("<-") {
            parsed_pat = substr.strip_prefix("<-");
            position = Direction::Start;
        }

        if substr.ends_with("->") {
            parsed_pat = parsed_pat.and_then(|substr| substr.strip_suffix("->"));
            origin = Direction::End;
        }
    }

    offset_at(subject, parsed_pat, position, origin)
}

/// An origin or placement direction.
enum Direction {
    Start,
    End,
}

/// Returns the offset of `pat` in `subject`,
/// placed at the `position` side of `pat` and searched from the `origin` side of `subject`.
fn offset_at(
    subject: &str,
    pat: Option<&str>,
    position: Direction,
    origin: Direction,
) -> Option<usize> {
    match pat {
        Some(substr) => {
            let offset = match origin {
                Direction::Start => subject.find(substr),
                Direction::End => subject.rfind(substr),
            };
            match position {
                Direction::Start => offset,
                Direction::End => offset.map(|idx| cmp::min(idx + substr.len(), subject.len())),
            }
        }
        // No `pat` means the start or the end of `subject`.
        None => match position {
            Direction::Start => Some(0),
            Direction::End => Some(subject.len()),
        },
    }
}

/// Describes a group of tests to run on source code from a file in the `test_data` directory.
#[derive(Debug)]
pub struct TestGroup {
    /// Location of the source code (see [`get_source_code`] doc).
    pub source: &'static str,
    /// List of test cases.
    pub test_cases: Vec<TestCase>,
}

/// Describes a single test case in a [`TestGroup`].
#[derive(Debug)]
pub struct TestCase {
    /// List of modifications to perform on the original source before running the test.
    pub modifications: Option<Vec<TestCaseModification>>,
    /// Spans at which diagnostics are expected or refactorings are invoked.
    pub params: Option<TestCaseParams>,
    /// Expected results for the test case.
    pub results: TestCaseResults,
}

/// Describes a modification of the source code.
#[derive(Debug)]
pub struct TestCaseModification {
    /// Substring used to find the start offset of the replaced snippet (see [`parse_offset_at`] doc).
    pub start_pat: Option<&'static str>,
    /// Substring used to find the end offset of the replaced snippet (see [`parse_offset_at`] doc).
    pub end_pat: Option<&'static str>,
    /// Replacement snippet.
    pub replacement: &'static str,
}

/// Parameters for a [`TestCase`].
#[derive(Debug)]
pub struct TestCaseParams {
    /// Marked spans.
    pub spans: Vec<TestParamsRange>,
    /// Crates that can be imported.
    pub metadata_references: Vec<&'static str>,
}

/// A text range described by substrings.
#[derive(Debug)]
pub struct TestParamsRange {
    /// Substring used to find the start offset of the range (see [`parse_offset_at`] doc).
    pub start_pat: Option<&'static str>,
    /// Substring used to find the end offset of the range (see [`parse_offset_at`] doc).
    pub end_pat: Option<&'static str>,
}

/// Variants for [`TestCase`] results.
#[derive(Debug)]
pub enum TestCaseResults {
    /// Expected number of diagnostics reported by the analyzer.
    Diagnostic(usize),
    /// Expected modifications made by fixing all marked diagnostics of the rule.
    Fix {
        id: &'static str,
        edits: Vec<TestCaseModification>,
    },
    /// Expected modifications made by the refactoring (`None` if no refactoring is offered).
    Refactoring(Option<Vec<TestCaseModification>>),
    /// Expected modifications made by fixing the compiler diagnostic (`None` if there's no fix).
    CompilerFix {
        id: &'static str,
        edits: Option<Vec<TestCaseModification>>,
    },
}

/// Applies the test case modifications to the source code.
pub fn apply_test_modifications(source_code: &mut String, modifications: &[TestCaseModification]) {
    for modification in modifications {
        let start_offset = parse_offset_at(source_code, modification.start_pat).unwrap();
        let end_offset = parse_offset_at(source_code, modification.end_pat).unwrap();
        source_code.replace_range(start_offset..end_offset, modification.replacement);
    }
}

/// Returns the source code with `[|...|]` markers around the spans.
pub fn mark_spans(source_code: &str, spans: &[TestParamsRange]) -> String {
    let mut ranges: Vec<_> = spans
        .iter()
        .map(|span| {
            (
                parse_offset_at(source_code, span.start_pat).unwrap(),
                parse_offset_at(source_code, span.end_pat).unwrap(),
            )
        })
        .collect();
    ranges.sort();

    let mut marked = source_code.to_owned();
    for (start, end) in ranges.into_iter().rev() {
        marked.insert_str(end, "|]");
        marked.insert_str(start, "[|");
    }
    marked
}
