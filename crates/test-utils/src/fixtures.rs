//! Test fixtures for the fixcheck host crate.

use crate::{
    TestCase, TestCaseModification, TestCaseParams, TestCaseResults, TestGroup, TestParamsRange,
};

/// Returns a range that covers the first occurrence of `pat`.
fn span_of(pat: &'static str) -> TestParamsRange {
    TestParamsRange {
        start_pat: Some(leak(format!("<-{pat}"))),
        end_pat: Some(pat),
    }
}

/// Returns a modification that replaces the first occurrence of `pat`.
fn replace(pat: &'static str, replacement: &'static str) -> TestCaseModification {
    TestCaseModification {
        start_pat: Some(leak(format!("<-{pat}"))),
        end_pat: Some(pat),
        replacement,
    }
}

/// Returns a modification that inserts text before the first occurrence of `pat`.
fn insert_before(pat: &'static str, text: &'static str) -> TestCaseModification {
    let start_pat = leak(format!("<-{pat}"));
    TestCaseModification {
        start_pat: Some(start_pat),
        end_pat: Some(start_pat),
        replacement: text,
    }
}

fn leak(text: String) -> &'static str {
    Box::leak(text.into_boxed_str())
}

fn spans(spans: Vec<TestParamsRange>) -> Option<TestCaseParams> {
    Some(TestCaseParams {
        spans,
        metadata_references: Vec::new(),
    })
}

/// Describes tests for the comparison analyzer and its code fixes,
/// run against (optionally modified) code in the `test_data` directory in the project root.
pub fn comparison_fixtures() -> Vec<TestGroup> {
    vec![TestGroup {
        source: "comparisons/lookups",
        test_cases: vec![
            TestCase {
                modifications: None,
                params: None,
                // 3 comparisons with `None` and 2 comparisons with boolean literals.
                results: TestCaseResults::Diagnostic(5),
            },
            TestCase {
                modifications: Some(vec![
                    replace("find(map, key) == None", "find(map, key).is_none()"),
                    replace("map.is_empty() == true", "map.is_empty()"),
                ]),
                params: None,
                results: TestCaseResults::Diagnostic(3),
            },
            TestCase {
                modifications: None,
                params: spans(vec![
                    span_of("find(map, key) == None"),
                    span_of("None != find(map, key)"),
                    span_of("find(map, key) != None"),
                ]),
                results: TestCaseResults::Fix {
                    id: "FC0001",
                    edits: vec![
                        replace("find(map, key) == None", "find(map, key).is_none()"),
                        replace("None != find(map, key)", "find(map, key).is_some()"),
                        replace("find(map, key) != None", "find(map, key).is_some()"),
                    ],
                },
            },
            TestCase {
                modifications: None,
                params: spans(vec![
                    span_of("map.is_empty() == true"),
                    span_of("(map.len() >= capacity) != false"),
                ]),
                results: TestCaseResults::Fix {
                    id: "FC0002",
                    edits: vec![
                        replace("map.is_empty() == true", "map.is_empty()"),
                        replace("(map.len() >= capacity) != false", "(map.len() >= capacity)"),
                    ],
                },
            },
            TestCase {
                // Negated comparisons.
                modifications: Some(vec![replace("map.is_empty() == true", "map.is_empty() != true")]),
                params: spans(vec![
                    span_of("map.is_empty() != true"),
                    span_of("(map.len() >= capacity) != false"),
                ]),
                results: TestCaseResults::Fix {
                    id: "FC0002",
                    edits: vec![
                        replace("map.is_empty() != true", "!map.is_empty()"),
                        replace("(map.len() >= capacity) != false", "(map.len() >= capacity)"),
                    ],
                },
            },
        ],
    }]
}

/// Describes tests for the empty `else` analyzer and its code fix.
pub fn empty_else_fixtures() -> Vec<TestGroup> {
    vec![TestGroup {
        source: "branches/limits",
        test_cases: vec![
            TestCase {
                modifications: None,
                params: None,
                results: TestCaseResults::Diagnostic(2),
            },
            TestCase {
                modifications: Some(vec![replace(" else {}", "")]),
                params: None,
                results: TestCaseResults::Diagnostic(1),
            },
            TestCase {
                modifications: None,
                params: spans(vec![span_of("else {\n    }"), span_of("else {}")]),
                results: TestCaseResults::Fix {
                    id: "FC0003",
                    edits: vec![replace(" else {\n    }", ""), replace(" else {}", "")],
                },
            },
        ],
    }]
}

/// Describes tests for the swap operands refactoring.
pub fn swap_operands_fixtures() -> Vec<TestGroup> {
    vec![TestGroup {
        source: "expressions/bounds",
        test_cases: vec![
            TestCase {
                modifications: None,
                params: spans(vec![span_of("value < low")]),
                results: TestCaseResults::Refactoring(Some(vec![replace(
                    "value < low",
                    "low > value",
                )])),
            },
            TestCase {
                modifications: None,
                // Cursor before the right operand.
                params: spans(vec![TestParamsRange {
                    start_pat: Some("<-high {"),
                    end_pat: Some("<-high {"),
                }]),
                results: TestCaseResults::Refactoring(Some(vec![replace(
                    "value >= high",
                    "high <= value",
                )])),
            },
            TestCase {
                modifications: None,
                params: spans(vec![span_of("value * factor + 1")]),
                results: TestCaseResults::Refactoring(None),
            },
        ],
    }]
}

/// Describes tests for the introduce local refactoring.
pub fn introduce_local_fixtures() -> Vec<TestGroup> {
    vec![TestGroup {
        source: "expressions/bounds",
        test_cases: vec![
            TestCase {
                modifications: None,
                params: spans(vec![span_of("value * factor + 1")]),
                // `value` is taken.
                results: TestCaseResults::Refactoring(Some(vec![
                    insert_before("offset(value * factor", "let value2 = value * factor + 1;\n    "),
                    replace("value * factor + 1)", "value2)"),
                ])),
            },
            TestCase {
                modifications: None,
                params: spans(vec![span_of("total / count")]),
                results: TestCaseResults::Refactoring(Some(vec![
                    insert_before("let mean", "let value2 = total / count;\n    "),
                    TestCaseModification {
                        start_pat: Some("<-total / count->"),
                        end_pat: Some("total / count->"),
                        replacement: "value2",
                    },
                ])),
            },
            TestCase {
                // Tail expressions and statements.
                modifications: None,
                params: spans(vec![
                    span_of("offset(value * factor + 1)"),
                    span_of("let mean = total / count;"),
                ]),
                results: TestCaseResults::Refactoring(None),
            },
        ],
    }]
}

/// Describes tests for the unresolved import fix.
pub fn unresolved_import_fixtures() -> Vec<TestGroup> {
    vec![TestGroup {
        source: "imports/config",
        test_cases: vec![
            TestCase {
                modifications: None,
                params: None,
                results: TestCaseResults::CompilerFix {
                    id: "RS0003",
                    edits: Some(vec![
                        replace("use serde::Deserialize;\n", ""),
                        replace("use toml::Value;\n", ""),
                    ]),
                },
            },
            TestCase {
                modifications: None,
                params: Some(TestCaseParams {
                    spans: Vec::new(),
                    metadata_references: vec!["serde"],
                }),
                results: TestCaseResults::CompilerFix {
                    id: "RS0003",
                    edits: Some(vec![replace("use toml::Value;\n", "")]),
                },
            },
            TestCase {
                // Nested use trees are resolved by their first segment.
                modifications: Some(vec![replace(
                    "use toml::Value;",
                    "use toml::{de::Error, Value};",
                )]),
                params: None,
                results: TestCaseResults::CompilerFix {
                    id: "RS0003",
                    edits: Some(vec![
                        replace("use serde::Deserialize;\n", ""),
                        replace("use toml::{de::Error, Value};\n", ""),
                    ]),
                },
            },
            TestCase {
                modifications: None,
                params: Some(TestCaseParams {
                    spans: Vec::new(),
                    metadata_references: vec!["serde", "toml"],
                }),
                results: TestCaseResults::CompilerFix {
                    id: "RS0003",
                    edits: None,
                },
            },
        ],
    }]
}
