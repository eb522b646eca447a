//! Test utilities: a plain text host language, a word analyzer and simple providers.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::action::{CodeAction, CodeFixContext, CodeFixProvider, RefactoringContext, RefactoringProvider};
use crate::diagnostic::{Diagnostic, DiagnosticDescriptor, Severity};
use crate::document::Project;
use crate::driver::{AnalysisContext, Analyzer, Language};
use crate::text::{AnnotationKind, TextEdit, TextRange};

pub const ERROR_DIAGNOSTIC_ID: &str = "PT0001";
pub const NOTE_DIAGNOSTIC_ID: &str = "PT0002";

static COMPILER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(ERR|NOTE)\b").unwrap());

static ERROR_DESCRIPTOR: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        ERROR_DIAGNOSTIC_ID,
        "Error token",
        "Error token found",
        "Compiler",
        Severity::Error,
    ))
});

static NOTE_DESCRIPTOR: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        NOTE_DIAGNOSTIC_ID,
        "Note token",
        "Note token found",
        "Compiler",
        Severity::Info,
    ))
});

/// Plain text "language".
///
/// The compiler reports an error for every `ERR` word and a note for every `NOTE` word.
#[derive(Debug, Clone, Copy)]
pub struct PlainText;

impl Language for PlainText {
    type Compilation = Project;

    fn name(&self) -> &str {
        "PlainText"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn compile(&self, project: &Project) -> Project {
        project.clone()
    }

    fn compiler_diagnostics(&self, compilation: &Project) -> Vec<Diagnostic> {
        compilation
            .documents()
            .flat_map(|document| {
                COMPILER_TOKEN
                    .find_iter(document.text())
                    .map(|found| {
                        let descriptor = match found.as_str() {
                            "ERR" => ERROR_DESCRIPTOR.clone(),
                            _ => NOTE_DESCRIPTOR.clone(),
                        };
                        Diagnostic::new(descriptor, document.location(range(found.start(), found.end())))
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new((start as u32).into(), (end as u32).into())
}

/// Returns a warning descriptor for the word analyzer.
pub fn word_descriptor(id: &str, word: &str) -> Arc<DiagnosticDescriptor> {
    Arc::new(DiagnosticDescriptor::new(
        id,
        &format!("Found {word}"),
        "Found '{0}'",
        "Style",
        Severity::Warning,
    ))
}

/// Reports every whole-word match of a pattern (e.g. `foo` or `x|yy`).
pub struct WordAnalyzer {
    descriptor: Arc<DiagnosticDescriptor>,
    pattern: Regex,
}

impl WordAnalyzer {
    pub fn new(descriptor: Arc<DiagnosticDescriptor>, word: &str) -> Self {
        Self {
            descriptor,
            pattern: Regex::new(&format!(r"\b(?:{word})\b")).unwrap(),
        }
    }

    pub fn descriptor(&self) -> Arc<DiagnosticDescriptor> {
        self.descriptor.clone()
    }
}

impl Analyzer<PlainText> for WordAnalyzer {
    fn supported_diagnostics(&self) -> Vec<Arc<DiagnosticDescriptor>> {
        vec![self.descriptor.clone()]
    }

    fn analyze(&self, compilation: &Project, context: &mut AnalysisContext<'_>) -> anyhow::Result<()> {
        for document in compilation.documents() {
            for found in self.pattern.find_iter(document.text()) {
                context.report(
                    Diagnostic::new(
                        self.descriptor.clone(),
                        document.location(range(found.start(), found.end())),
                    )
                    .with_arguments([found.as_str()]),
                );
            }
        }
        Ok(())
    }
}

/// An analyzer with a bug.
pub struct PanickingAnalyzer;

impl Analyzer<PlainText> for PanickingAnalyzer {
    fn supported_diagnostics(&self) -> Vec<Arc<DiagnosticDescriptor>> {
        vec![word_descriptor("P0001", "panic")]
    }

    fn analyze(&self, _: &Project, _: &mut AnalysisContext<'_>) -> anyhow::Result<()> {
        panic!("analyzer bug");
    }
}

fn span_text<'a>(context: &CodeFixContext<'a, PlainText>) -> &'a str {
    let span = context.span();
    &context.document().text()[span]
}

fn replace_span(context: &CodeFixContext<'_, PlainText>, title: &str, key: Option<&str>, text: &str) -> CodeAction {
    CodeAction::document_edits(
        title,
        key,
        context.document(),
        vec![TextEdit::replace(text.to_owned(), context.span())],
    )
}

/// Replaces a diagnostic span whose text is `from` with `to`.
pub struct ReplaceWordFix {
    from: String,
    to: String,
    ids: Vec<String>,
}

impl ReplaceWordFix {
    /// Creates a fix for `W0001` diagnostics.
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            ids: vec!["W0001".to_owned()],
        }
    }

    /// Returns a copy that fixes diagnostics with the given id instead.
    pub fn for_id(self, id: &str) -> Self {
        Self {
            ids: vec![id.to_owned()],
            ..self
        }
    }
}

impl CodeFixProvider<PlainText> for ReplaceWordFix {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        self.ids.clone()
    }

    fn register_code_fixes(&self, context: &mut CodeFixContext<'_, PlainText>) -> anyhow::Result<()> {
        if span_text(context) == self.from {
            let action = replace_span(context, &format!("Replace with '{}'", self.to), Some("replace"), &self.to);
            context.register_code_fix(action);
        }
        Ok(())
    }
}

/// Registers a fix without edits.
pub struct NoOpFix;

impl CodeFixProvider<PlainText> for NoOpFix {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        vec!["W0001".to_owned()]
    }

    fn register_code_fixes(&self, context: &mut CodeFixContext<'_, PlainText>) -> anyhow::Result<()> {
        let action = CodeAction::document_edits("Do nothing", None, context.document(), Vec::new());
        context.register_code_fix(action);
        Ok(())
    }
}

/// Replaces `x` with `yy` and `yy` with `x`.
pub struct OscillatingFix;

impl CodeFixProvider<PlainText> for OscillatingFix {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        vec!["W0001".to_owned()]
    }

    fn register_code_fixes(&self, context: &mut CodeFixContext<'_, PlainText>) -> anyhow::Result<()> {
        let replacement = if span_text(context) == "x" { "yy" } else { "x" };
        let action = replace_span(context, "Toggle", None, replacement);
        context.register_code_fix(action);
        Ok(())
    }
}

/// Registers a lowercase and an uppercase fix.
pub struct DuplicateFix;

impl CodeFixProvider<PlainText> for DuplicateFix {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        vec!["W0001".to_owned()]
    }

    fn register_code_fixes(&self, context: &mut CodeFixContext<'_, PlainText>) -> anyhow::Result<()> {
        let text = span_text(context);
        let lower = replace_span(context, "Fix lower", Some("lower"), &format!("{text}_fixed"));
        let upper = replace_span(
            context,
            "Fix upper",
            Some("upper"),
            &format!("{text}_fixed").to_uppercase(),
        );
        context.register_code_fix(lower);
        context.register_code_fix(upper);
        Ok(())
    }
}

/// Uppercases a non-empty selection, marking the result for renaming.
pub struct UppercaseRefactoring;

impl RefactoringProvider<PlainText> for UppercaseRefactoring {
    fn compute_refactorings(&self, context: &mut RefactoringContext<'_, PlainText>) -> anyhow::Result<()> {
        let span = context.span();
        if span.is_empty() {
            return Ok(());
        }
        let text = context.document().text()[span].to_uppercase();
        let edit = TextEdit::replace(text.clone(), span).with_annotation(
            AnnotationKind::Rename,
            TextRange::up_to((text.len() as u32).into()),
        );
        let action = CodeAction::document_edits("Uppercase", Some("uppercase"), context.document(), vec![edit]);
        context.register_refactoring(action);
        Ok(())
    }
}
