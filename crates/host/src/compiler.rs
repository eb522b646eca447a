//! Compiler diagnostics of the Rust host language.

use std::sync::Arc;

use fixcheck::{Diagnostic, DiagnosticDescriptor, Severity};
use once_cell::sync::Lazy;
use ra_ap_syntax::{ast, AstNode};

use crate::language::{ParsedFile, RustCompilation};
use crate::utils;

/// Syntax error.
pub const SYNTAX_ERROR: &str = "RS0001";
/// `async fn` in the 2015 edition.
pub const ASYNC_FN_IN_2015: &str = "RS0002";
/// `use` of an unknown crate.
pub const UNRESOLVED_IMPORT: &str = "RS0003";
/// `todo!()` invocation.
pub const TODO_MACRO: &str = "RS0004";

/// Crate-relative path roots that always resolve.
const PATH_ROOTS: [&str; 3] = ["crate", "self", "super"];

static SYNTAX_ERROR_DESCRIPTOR: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        SYNTAX_ERROR,
        "Syntax error",
        "{0}",
        "Compiler",
        Severity::Error,
    ))
});

static ASYNC_FN_IN_2015_DESCRIPTOR: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        ASYNC_FN_IN_2015,
        "`async fn` is not permitted in Rust 2015",
        "`async fn` is not permitted in Rust 2015",
        "Compiler",
        Severity::Error,
    ))
});

static UNRESOLVED_IMPORT_DESCRIPTOR: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        UNRESOLVED_IMPORT,
        "Unresolved import",
        "Unresolved import `{0}`",
        "Compiler",
        Severity::Error,
    ))
});

static TODO_MACRO_DESCRIPTOR: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        TODO_MACRO,
        "Not yet implemented",
        "`todo!()` is not implemented",
        "Compiler",
        Severity::Warning,
    ))
});

/// Returns the compiler diagnostics of all documents of the compilation.
pub fn diagnostics(compilation: &RustCompilation) -> Vec<Diagnostic> {
    let is_2015 = compilation.options().parse_options().language_version.as_deref() == Some("2015");
    let references = compilation.options().metadata_references();

    let mut results = Vec::new();
    for file in compilation.files() {
        syntax_errors(&mut results, file);
        if is_2015 {
            async_fns(&mut results, file);
        }
        unresolved_imports(&mut results, file, |name| {
            PATH_ROOTS.contains(&name) || references.contains(name)
        });
        todo_macros(&mut results, file);
    }
    tracing::trace!(diagnostics = results.len(), "compiler diagnostics computed");
    results
}

fn syntax_errors(results: &mut Vec<Diagnostic>, file: &ParsedFile) {
    for (message, range) in file.errors() {
        results.push(
            Diagnostic::new(SYNTAX_ERROR_DESCRIPTOR.clone(), file.document().location(*range))
                .with_arguments([message.as_str()]),
        );
    }
}

fn async_fns(results: &mut Vec<Diagnostic>, file: &ParsedFile) {
    for async_token in file
        .syntax()
        .descendants()
        .filter_map(ast::Fn::cast)
        .filter_map(|fn_item| fn_item.async_token())
    {
        results.push(Diagnostic::new(
            ASYNC_FN_IN_2015_DESCRIPTOR.clone(),
            file.document().location(async_token.text_range()),
        ));
    }
}

fn unresolved_imports<F>(results: &mut Vec<Diagnostic>, file: &ParsedFile, is_resolved: F)
where
    F: Fn(&str) -> bool,
{
    for use_item in file.syntax().descendants().filter_map(ast::Use::cast) {
        // Only the root of the path is resolved, nested trees share it.
        let Some(root) = use_item
            .use_tree()
            .and_then(|tree| tree.path())
            .and_then(|path| utils::path_root(&path))
        else {
            continue;
        };
        let name = root.text().to_string();
        if !is_resolved(&name) {
            results.push(
                Diagnostic::new(
                    UNRESOLVED_IMPORT_DESCRIPTOR.clone(),
                    file.document().location(root.syntax().text_range()),
                )
                .with_arguments([name]),
            );
        }
    }
}

fn todo_macros(results: &mut Vec<Diagnostic>, file: &ParsedFile) {
    for macro_call in file
        .syntax()
        .descendants()
        .filter_map(ast::MacroCall::cast)
        .filter(|macro_call| {
            macro_call
                .path()
                .map_or(false, |path| path.syntax().text() == "todo")
        })
    {
        results.push(Diagnostic::new(
            TODO_MACRO_DESCRIPTOR.clone(),
            file.document().location(macro_call.syntax().text_range()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::compile;
    use fixcheck::{ParseOptions, TestOptions};

    #[test]
    fn diagnostics_works() {
        for (code, options, expected) in [
            // Clean code.
            ("fn main() {}", None, vec![]),
            ("use std::fmt;\nuse crate::a::b;\nuse self::c;", None, vec![]),
            // Syntax error.
            ("fn main() {", None, vec![SYNTAX_ERROR]),
            // Unresolved imports.
            ("use serde::Serialize;", None, vec![UNRESOLVED_IMPORT]),
            ("use {serde::Serialize};", None, vec![]),
            (
                "use serde::Serialize;",
                Some(TestOptions::new("Rust").add_metadata_reference("serde")),
                vec![],
            ),
            // `todo!()` invocations.
            ("fn f() { todo!() }", None, vec![TODO_MACRO]),
            ("fn f() { unimplemented!() }", None, vec![]),
            // `async fn` depends on the edition.
            ("async fn f() {}", None, vec![]),
            (
                "async fn f() {}",
                Some(
                    TestOptions::new("Rust")
                        .with_parse_options(ParseOptions::default().with_language_version("2015")),
                ),
                vec![ASYNC_FN_IN_2015],
            ),
        ] {
            let compilation = compile(code, options.unwrap_or_else(|| TestOptions::new("Rust")));
            let results = diagnostics(&compilation);

            assert_eq!(
                results.iter().map(Diagnostic::id).collect::<Vec<_>>(),
                expected,
                "code: {code}"
            );
        }
    }

    #[test]
    fn unresolved_import_location_works() {
        let compilation = compile("use std::fmt;\nuse serde::Serialize;", TestOptions::new("Rust"));
        let results = diagnostics(&compilation);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].to_string(), "test.rs(2,5): error RS0003: Unresolved import `serde`");
    }
}
