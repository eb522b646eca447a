//! Parsed source fixtures.

use super::parser::{self, MarkerSyntax, SpanKind};
use crate::error::{VerifyError, VerifyResult};
use crate::text::{LinePosition, TextRange};

const PLACEHOLDER: &str = "[||]";

/// A source fixture with its markers removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCode {
    /// Marker-free source text.
    pub value: String,
    /// `[|...|]` spans in the order they appear.
    pub spans: Vec<TextRange>,
    /// `{|...|}` spans in the order they appear.
    pub additional_spans: Vec<TextRange>,
    /// Expected text with annotation markers (only set for placeholder fixtures).
    pub expected_value: Option<String>,
}

impl TestCode {
    /// Parses a source fixture.
    pub fn parse(source: &str) -> VerifyResult<Self> {
        let parsed = parser::parse(source, MarkerSyntax::Source)?;
        Ok(Self {
            spans: parsed.ranges_of(&SpanKind::Primary),
            additional_spans: parsed.ranges_of(&SpanKind::Additional),
            value: parsed.text,
            expected_value: None,
        })
    }

    /// Parses a placeholder fixture.
    ///
    /// The first `[||]` in `source` is replaced with `source_data` to build the input,
    /// and with `expected_data` to build the expected text.
    /// `{|kind:...|}` annotations in the expected text are left in place.
    /// If the input has no `[|...|]` span, the inserted `source_data` becomes the span.
    pub fn parse_with_data(source: &str, source_data: &str, expected_data: &str) -> VerifyResult<Self> {
        let Some(idx) = source.find(PLACEHOLDER) else {
            return Err(VerifyError::InvalidFixture {
                message: format!("missing `{PLACEHOLDER}` placeholder"),
                position: LinePosition::default(),
            });
        };
        let (prefix, suffix) = (&source[..idx], &source[idx + PLACEHOLDER.len()..]);

        let mut code = Self::parse(&format!("{prefix}{source_data}{suffix}"))?;
        if code.spans.is_empty() {
            code = Self::parse(&format!("{prefix}[|{source_data}|]{suffix}"))?;
        }
        // Annotations are kept for `ExpectedTestState::parse`, span markers aren't.
        let expected = format!("{prefix}{expected_data}{suffix}")
            .replace(PLACEHOLDER, "")
            .replace("[|", "")
            .replace("|]", "");
        code.expected_value = Some(expected);

        Ok(code)
    }
}
