//! Host language contract and the analyzer driver.

use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::diagnostic::{Diagnostic, DiagnosticComparer, DiagnosticDescriptor};
use crate::document::Project;
use crate::error::{VerifyError, VerifyResult};
use crate::options::{ReportDiagnostic, TestOptions};
use crate::utils;

/// A host language: compiles projects and reports compiler diagnostics.
pub trait Language {
    /// The result of compiling a project snapshot.
    type Compilation;

    /// Language name (used for default options).
    fn name(&self) -> &str;

    /// File extension of documents (without the dot).
    fn file_extension(&self) -> &str;

    /// Compiles the project snapshot.
    fn compile(&self, project: &Project) -> Self::Compilation;

    /// Returns the compiler diagnostics of the compilation.
    fn compiler_diagnostics(&self, compilation: &Self::Compilation) -> Vec<Diagnostic>;

    /// Returns default options for the language.
    fn default_options(&self) -> TestOptions {
        TestOptions::new(self.name())
    }
}

/// A diagnostic analyzer.
pub trait Analyzer<L: Language> {
    /// Descriptors of all rules the analyzer can report.
    fn supported_diagnostics(&self) -> Vec<Arc<DiagnosticDescriptor>>;

    /// Analyzes the compilation, reporting diagnostics to the context.
    fn analyze(
        &self,
        compilation: &L::Compilation,
        context: &mut AnalysisContext<'_>,
    ) -> anyhow::Result<()>;

    /// Name used in failure messages.
    fn name(&self) -> &'static str {
        utils::short_type_name::<Self>()
    }
}

/// Context of a single analyzer run.
#[derive(Debug)]
pub struct AnalysisContext<'a> {
    project: &'a Project,
    cancellation: &'a CancellationToken,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(project: &'a Project, cancellation: &'a CancellationToken) -> Self {
        Self {
            project,
            cancellation,
            diagnostics: Vec::new(),
        }
    }

    /// Returns the analyzed project snapshot.
    pub fn project(&self) -> &'a Project {
        self.project
    }

    /// Returns true if the analysis should stop early.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Reports a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Compiles the project.
pub fn compile<L: Language>(
    language: &L,
    project: &Project,
    cancellation: &CancellationToken,
) -> VerifyResult<L::Compilation> {
    cancellation.check()?;
    let compilation = language.compile(project);
    tracing::trace!(language = language.name(), "project compiled");
    Ok(compilation)
}

/// Returns the compiler diagnostics of the compilation (sorted by path and span start).
pub fn compiler_diagnostics<L: Language>(language: &L, compilation: &L::Compilation) -> Vec<Diagnostic> {
    let mut diagnostics = language.compiler_diagnostics(compilation);
    diagnostics.sort_by(|a, b| {
        a.location()
            .path()
            .cmp(&b.location().path())
            .then_with(|| DiagnosticComparer::SpanStart.compare(a, b))
    });
    diagnostics
}

/// Runs the analyzer on the compilation.
///
/// Applies the report options of the project (suppression, severity overrides and
/// rules that are disabled by default) and returns diagnostics sorted by span start.
/// An analyzer error or panic is attributed to the analyzer.
pub fn run_analyzer<L: Language, A: Analyzer<L> + ?Sized>(
    analyzer: &A,
    compilation: &L::Compilation,
    project: &Project,
    cancellation: &CancellationToken,
) -> VerifyResult<Vec<Diagnostic>> {
    cancellation.check()?;

    let failed = |message: String| VerifyError::AnalyzerFailed {
        analyzer: analyzer.name().to_owned(),
        message,
    };

    let mut context = AnalysisContext::new(project, cancellation);
    utils::catch_failure(|| analyzer.analyze(compilation, &mut context)).map_err(failed)?;
    cancellation.check()?;

    let supported = analyzer.supported_diagnostics();
    let mut diagnostics = Vec::new();
    for diagnostic in context.into_diagnostics() {
        if !supported.iter().any(|descriptor| descriptor.id == diagnostic.id()) {
            return Err(failed(format!(
                "Reported diagnostic with id '{}' is not supported by the analyzer.",
                diagnostic.id()
            )));
        }
        if let Some(diagnostic) = apply_report_options(diagnostic, project.options()) {
            diagnostics.push(diagnostic);
        }
    }
    DiagnosticComparer::SpanStart.sort(&mut diagnostics);

    tracing::debug!(
        analyzer = analyzer.name(),
        diagnostics = diagnostics.len(),
        "analyzer run"
    );
    Ok(diagnostics)
}

fn apply_report_options(diagnostic: Diagnostic, options: &TestOptions) -> Option<Diagnostic> {
    match options.compilation_options().report_for(diagnostic.id()) {
        Some(ReportDiagnostic::Suppress) => None,
        Some(ReportDiagnostic::Report(severity)) => Some(diagnostic.with_severity(severity)),
        None if diagnostic.descriptor().is_enabled_by_default => Some(diagnostic),
        None => None,
    }
}
