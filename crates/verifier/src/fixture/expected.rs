//! Expected post-transformation state.

use std::collections::BTreeMap;

use super::parser::{self, MarkerSyntax, SpanKind};
use crate::error::VerifyResult;
use crate::text::{AnnotationKind, TextRange};

/// The expected state of a document after a fix or refactoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedTestState {
    /// Expected source text (annotation markers removed).
    pub source: String,
    /// Expected title of the applied code action.
    pub code_action_title: Option<String>,
    /// Expected annotation ranges grouped by kind.
    pub annotations: BTreeMap<AnnotationKind, Vec<TextRange>>,
}

impl ExpectedTestState {
    /// Parses expected text with `{|kind:...|}` annotation markers.
    pub fn parse(text: &str) -> VerifyResult<Self> {
        let parsed = parser::parse(text, MarkerSyntax::Expected)?;
        let mut annotations: BTreeMap<AnnotationKind, Vec<TextRange>> = BTreeMap::new();
        for span in &parsed.spans {
            if let SpanKind::Annotation(kind) = &span.kind {
                annotations.entry(kind.clone()).or_default().push(span.range);
            }
        }
        for ranges in annotations.values_mut() {
            ranges.sort_by_key(|range| (range.start(), range.end()));
        }

        Ok(Self {
            source: parsed.text,
            code_action_title: None,
            annotations,
        })
    }

    /// Creates an expected state without annotations.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Returns a copy of the state that also expects the given code action title.
    pub fn with_code_action_title(&self, title: impl Into<String>) -> Self {
        Self {
            code_action_title: Some(title.into()),
            ..self.clone()
        }
    }

    /// Returns the expected ranges for the annotation kind (sorted by position).
    pub fn annotations_of(&self, kind: &AnnotationKind) -> &[TextRange] {
        self.annotations.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }
}
