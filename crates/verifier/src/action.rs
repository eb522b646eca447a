//! Code actions, code fix providers and refactoring providers.

use std::fmt;

use crate::cancel::CancellationToken;
use crate::diagnostic::{deep_equal, Diagnostic};
use crate::document::{Document, DocumentChanges};
use crate::driver::Language;
use crate::error::{VerifyError, VerifyResult};
use crate::text::{TextEdit, TextRange};
use crate::utils;

/// A titled (and optionally keyed) transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAction {
    title: String,
    equivalence_key: Option<String>,
    body: CodeActionBody,
}

/// What a code action does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeActionBody {
    /// Edits to documents of the project.
    Changes(Vec<DocumentChanges>),
    /// A group of child actions.
    Nested(Vec<CodeAction>),
}

impl CodeAction {
    /// Creates an action that applies changes to documents.
    pub fn new(title: impl Into<String>, equivalence_key: Option<&str>, changes: Vec<DocumentChanges>) -> Self {
        Self {
            title: title.into(),
            equivalence_key: equivalence_key.map(ToOwned::to_owned),
            body: CodeActionBody::Changes(changes),
        }
    }

    /// Creates an action that applies edits to a single document.
    pub fn document_edits(
        title: impl Into<String>,
        equivalence_key: Option<&str>,
        document: &Document,
        edits: Vec<TextEdit>,
    ) -> Self {
        Self::new(
            title,
            equivalence_key,
            vec![DocumentChanges::new(document.id(), edits)],
        )
    }

    /// Creates a group of child actions.
    pub fn nested(title: impl Into<String>, equivalence_key: Option<&str>, actions: Vec<CodeAction>) -> Self {
        Self {
            title: title.into(),
            equivalence_key: equivalence_key.map(ToOwned::to_owned),
            body: CodeActionBody::Nested(actions),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn equivalence_key(&self) -> Option<&str> {
        self.equivalence_key.as_deref()
    }

    pub fn body(&self) -> &CodeActionBody {
        &self.body
    }

    /// Returns the actions that apply changes (depth-first, in registration order).
    pub fn leaves(&self) -> Vec<&CodeAction> {
        match &self.body {
            CodeActionBody::Changes(_) => vec![self],
            CodeActionBody::Nested(actions) => actions.iter().flat_map(CodeAction::leaves).collect(),
        }
    }

    /// Returns true if the action matches the equivalence key filter (if any).
    pub fn matches_key(&self, equivalence_key: Option<&str>) -> bool {
        equivalence_key.map_or(true, |key| self.equivalence_key() == Some(key))
    }

    /// Returns a printable summary of the action.
    pub fn summary(&self) -> ActionSummary {
        ActionSummary {
            title: self.title.clone(),
            equivalence_key: self.equivalence_key.clone(),
        }
    }

    /// Applies the action, returning the document in the new snapshot.
    ///
    /// Applying a group applies all its leaves in order.
    pub fn apply(&self, document: &Document) -> VerifyResult<Document> {
        tracing::debug!(
            title = self.title.as_str(),
            equivalence_key = self.equivalence_key.as_deref(),
            "applying code action"
        );
        match &self.body {
            CodeActionBody::Changes(changes) => document.apply_changes(changes),
            CodeActionBody::Nested(actions) => actions
                .iter()
                .try_fold(document.clone(), |document, action| action.apply(&document)),
        }
    }
}

/// The title and equivalence key of a code action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSummary {
    pub title: String,
    pub equivalence_key: Option<String>,
}

impl ActionSummary {
    pub fn new(title: &str, equivalence_key: Option<&str>) -> Self {
        Self {
            title: title.to_owned(),
            equivalence_key: equivalence_key.map(ToOwned::to_owned),
        }
    }
}

impl fmt::Display for ActionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.title)?;
        if let Some(key) = &self.equivalence_key {
            write!(f, " (equivalence key: {key})")?;
        }
        Ok(())
    }
}

/// Proposes code actions that fix diagnostics.
pub trait CodeFixProvider<L: Language> {
    /// Ids of the diagnostics the provider can fix.
    fn fixable_diagnostic_ids(&self) -> Vec<String>;

    /// Registers code fixes for the diagnostic of the context.
    fn register_code_fixes(&self, context: &mut CodeFixContext<'_, L>) -> anyhow::Result<()>;

    /// Name used in failure messages.
    fn name(&self) -> &'static str {
        utils::short_type_name::<Self>()
    }
}

/// A registered code fix and the diagnostics it fixes.
#[derive(Debug, Clone)]
pub struct CodeFixRegistration {
    pub action: CodeAction,
    pub diagnostics: Vec<Diagnostic>,
}

/// Context for registering code fixes for a diagnostic.
pub struct CodeFixContext<'a, L: Language> {
    document: &'a Document,
    compilation: &'a L::Compilation,
    diagnostic: &'a Diagnostic,
    cancellation: &'a CancellationToken,
    registrations: Vec<CodeFixRegistration>,
}

impl<'a, L: Language> CodeFixContext<'a, L> {
    pub fn new(
        document: &'a Document,
        compilation: &'a L::Compilation,
        diagnostic: &'a Diagnostic,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            document,
            compilation,
            diagnostic,
            cancellation,
            registrations: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn compilation(&self) -> &'a L::Compilation {
        self.compilation
    }

    /// Returns the diagnostic to fix.
    pub fn diagnostic(&self) -> &'a Diagnostic {
        self.diagnostic
    }

    /// Returns the range of the diagnostic to fix (empty if it has no location).
    pub fn span(&self) -> TextRange {
        self.diagnostic
            .location()
            .range()
            .unwrap_or_else(|| TextRange::empty(0.into()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Registers a code fix for the given diagnostics.
    pub fn register(&mut self, action: CodeAction, diagnostics: Vec<Diagnostic>) {
        self.registrations.push(CodeFixRegistration { action, diagnostics });
    }

    /// Registers a code fix for the diagnostic of the context.
    pub fn register_code_fix(&mut self, action: CodeAction) {
        let diagnostic = self.diagnostic.clone();
        self.register(action, vec![diagnostic]);
    }

    fn into_registrations(self) -> Vec<CodeFixRegistration> {
        self.registrations
    }
}

/// Proposes code actions at a text span.
pub trait RefactoringProvider<L: Language> {
    /// Registers refactorings for the span of the context.
    fn compute_refactorings(&self, context: &mut RefactoringContext<'_, L>) -> anyhow::Result<()>;

    /// Name used in failure messages.
    fn name(&self) -> &'static str {
        utils::short_type_name::<Self>()
    }
}

/// Context for registering refactorings at a span.
pub struct RefactoringContext<'a, L: Language> {
    document: &'a Document,
    compilation: &'a L::Compilation,
    span: TextRange,
    cancellation: &'a CancellationToken,
    actions: Vec<CodeAction>,
}

impl<'a, L: Language> RefactoringContext<'a, L> {
    pub fn new(
        document: &'a Document,
        compilation: &'a L::Compilation,
        span: TextRange,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            document,
            compilation,
            span,
            cancellation,
            actions: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn compilation(&self) -> &'a L::Compilation {
        self.compilation
    }

    /// Returns the span at which refactorings are requested.
    pub fn span(&self) -> TextRange {
        self.span
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Registers a refactoring.
    pub fn register_refactoring(&mut self, action: CodeAction) {
        self.actions.push(action);
    }

    fn into_actions(self) -> Vec<CodeAction> {
        self.actions
    }
}

/// Requests code fixes for a diagnostic.
pub fn request_code_fixes<L, F>(
    provider: &F,
    document: &Document,
    compilation: &L::Compilation,
    diagnostic: &Diagnostic,
    cancellation: &CancellationToken,
) -> VerifyResult<Vec<CodeFixRegistration>>
where
    L: Language,
    F: CodeFixProvider<L> + ?Sized,
{
    cancellation.check()?;
    let mut context = CodeFixContext::new(document, compilation, diagnostic, cancellation);
    utils::catch_failure(|| provider.register_code_fixes(&mut context)).map_err(|message| {
        VerifyError::ProviderFailed {
            provider: provider.name().to_owned(),
            message,
        }
    })?;
    let registrations = context.into_registrations();
    tracing::trace!(
        provider = provider.name(),
        diagnostic = diagnostic.id(),
        registrations = registrations.len(),
        "code fixes requested"
    );
    Ok(registrations)
}

/// Requests refactorings at a span.
pub fn request_refactorings<L, R>(
    provider: &R,
    document: &Document,
    compilation: &L::Compilation,
    span: TextRange,
    cancellation: &CancellationToken,
) -> VerifyResult<Vec<CodeAction>>
where
    L: Language,
    R: RefactoringProvider<L> + ?Sized,
{
    cancellation.check()?;
    let mut context = RefactoringContext::new(document, compilation, span, cancellation);
    utils::catch_failure(|| provider.compute_refactorings(&mut context)).map_err(|message| {
        VerifyError::ProviderFailed {
            provider: provider.name().to_owned(),
            message,
        }
    })?;
    let actions = context.into_actions();
    tracing::trace!(
        provider = provider.name(),
        span = ?span,
        actions = actions.len(),
        "refactorings requested"
    );
    Ok(actions)
}

/// Leaf actions of a set of code fix registrations that match the diagnostic and key filter.
pub fn matching_fixes<'a>(
    registrations: &'a [CodeFixRegistration],
    diagnostic: &Diagnostic,
    equivalence_key: Option<&str>,
) -> Vec<&'a CodeAction> {
    registrations
        .iter()
        .filter(|registration| {
            registration
                .diagnostics
                .iter()
                .any(|it| deep_equal(it, diagnostic))
        })
        .flat_map(|registration| registration.action.leaves())
        .filter(|action| action.matches_key(equivalence_key))
        .collect()
}

/// Leaf actions that match the key filter.
pub fn matching_actions<'a>(actions: &'a [CodeAction], equivalence_key: Option<&str>) -> Vec<&'a CodeAction> {
    actions
        .iter()
        .flat_map(CodeAction::leaves)
        .filter(|action| action.matches_key(equivalence_key))
        .collect()
}

/// Summaries of all leaf actions of the registrations.
pub fn registration_summaries(registrations: &[CodeFixRegistration]) -> Vec<ActionSummary> {
    registrations
        .iter()
        .flat_map(|registration| registration.action.leaves())
        .map(CodeAction::summary)
        .collect()
}
