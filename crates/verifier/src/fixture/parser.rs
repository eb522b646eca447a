//! Single-pass fixture marker scanner.
//!
//! Markers are removed while scanning and every recorded span refers to offsets in the
//! marker-free output text.

use crate::error::{VerifyError, VerifyResult};
use crate::text::{AnnotationKind, LineMap, TextRange, TextSize};

/// The markers recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSyntax {
    /// `[|...|]` primary spans and `{|...|}` additional spans.
    Source,
    /// `{|kind:...|}` annotations.
    ///
    /// Any other brace/bar sequence is literal text.
    Expected,
}

/// The kind of a marked span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// A `[|...|]` span.
    Primary,
    /// A `{|...|}` span.
    Additional,
    /// A `{|kind:...|}` span.
    Annotation(AnnotationKind),
}

impl SpanKind {
    fn open_marker(&self) -> String {
        match self {
            SpanKind::Primary => "[|".to_owned(),
            SpanKind::Additional => "{|".to_owned(),
            SpanKind::Annotation(kind) => format!("{{|{}:", kind.code()),
        }
    }

    fn close_marker(&self) -> &'static str {
        match self {
            SpanKind::Primary => "|]",
            SpanKind::Additional | SpanKind::Annotation(_) => "|}",
        }
    }
}

/// A span recorded by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkedSpan {
    pub kind: SpanKind,
    pub range: TextRange,
    /// Number of spans enclosing this one when it was opened.
    pub depth: usize,
}

/// Marker-free text and its spans (in the order their opening markers appear).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedText {
    pub text: String,
    pub spans: Vec<MarkedSpan>,
}

impl MarkedText {
    /// Returns the ranges of spans of the given kind.
    pub fn ranges_of(&self, kind: &SpanKind) -> Vec<TextRange> {
        self.spans
            .iter()
            .filter(|span| &span.kind == kind)
            .map(|span| span.range)
            .collect()
    }

    /// Re-inserts markers for all recorded spans.
    ///
    /// Produces the original input for any text returned by [`parse`].
    pub fn to_marked_text(&self) -> String {
        let mut offsets: Vec<TextSize> = self
            .spans
            .iter()
            .flat_map(|span| [span.range.start(), span.range.end()])
            .collect();
        offsets.sort();
        offsets.dedup();

        let mut result = String::with_capacity(self.text.len() + self.spans.len() * 4);
        let mut stack: Vec<&MarkedSpan> = Vec::new();
        let mut last = 0usize;
        let mut next_span = 0usize;
        for offset in offsets {
            let pos = usize::from(offset);
            result.push_str(&self.text[last..pos]);
            last = pos;

            // Opens spans starting here (in opening order),
            // closing the enclosing spans that don't contain them.
            while let Some(span) = self
                .spans
                .get(next_span)
                .filter(|span| span.range.start() == offset)
            {
                while stack.len() > span.depth {
                    if let Some(closed) = stack.pop() {
                        result.push_str(closed.kind.close_marker());
                    }
                }
                result.push_str(&span.kind.open_marker());
                stack.push(span);
                next_span += 1;
            }

            while let Some(closed) = stack.last().filter(|span| span.range.end() == offset) {
                result.push_str(closed.kind.close_marker());
                stack.pop();
            }
        }
        result.push_str(&self.text[last..]);
        result
    }
}

/// Scans the input, removing markers and recording spans.
pub fn parse(input: &str, syntax: MarkerSyntax) -> VerifyResult<MarkedText> {
    let mut text = String::with_capacity(input.len());
    let mut spans: Vec<MarkedSpan> = Vec::new();
    // Index into `spans` and input offset of the opening marker.
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let error = |message: String, input_offset: usize| {
        let position = TextSize::try_from(input_offset)
            .map(|offset| LineMap::new(input).position(offset))
            .unwrap_or_default();
        VerifyError::InvalidFixture { message, position }
    };
    let output_offset = |text: &str| {
        TextSize::try_from(text.len())
            .map_err(|_| error("fixture is too large".to_owned(), input.len()))
    };

    let mut idx = 0;
    while idx < input.len() {
        let rest = &input[idx..];
        let opened = match syntax {
            MarkerSyntax::Source if rest.starts_with("[|") => Some((SpanKind::Primary, 2)),
            MarkerSyntax::Source if rest.starts_with("{|") => Some((SpanKind::Additional, 2)),
            MarkerSyntax::Expected if rest.starts_with("{|") => annotation_code(&rest[2..])
                .map(|code| {
                    (
                        SpanKind::Annotation(AnnotationKind::from_code(code)),
                        2 + code.len() + 1,
                    )
                }),
            _ => None,
        };
        if let Some((kind, marker_len)) = opened {
            let start = output_offset(&text)?;
            stack.push((spans.len(), idx));
            spans.push(MarkedSpan {
                kind,
                range: TextRange::empty(start),
                depth: stack.len() - 1,
            });
            idx += marker_len;
            continue;
        }

        let closed = match syntax {
            MarkerSyntax::Source if rest.starts_with("|]") => Some(SpanKind::Primary),
            MarkerSyntax::Source if rest.starts_with("|}") => Some(SpanKind::Additional),
            // Closing markers without an open annotation are literal text.
            MarkerSyntax::Expected if rest.starts_with("|}") && !stack.is_empty() => {
                stack.last().map(|(span_idx, _)| spans[*span_idx].kind.clone())
            }
            _ => None,
        };
        if let Some(kind) = closed {
            match stack.pop() {
                Some((span_idx, _)) if spans[span_idx].kind == kind => {
                    let start = spans[span_idx].range.start();
                    spans[span_idx].range = TextRange::new(start, output_offset(&text)?);
                }
                Some((span_idx, open_idx)) => {
                    return Err(error(
                        format!(
                            "`{}` closes a span opened with `{}` at offset {open_idx}",
                            kind.close_marker(),
                            spans[span_idx].kind.open_marker()
                        ),
                        idx,
                    ));
                }
                None => {
                    return Err(error(
                        format!(
                            "`{}` without a matching `{}`",
                            kind.close_marker(),
                            kind.open_marker()
                        ),
                        idx,
                    ));
                }
            }
            idx += 2;
            continue;
        }

        // Copies the next char.
        let len = rest.chars().next().map_or(1, char::len_utf8);
        text.push_str(&rest[..len]);
        idx += len;
    }

    if let Some((span_idx, open_idx)) = stack.pop() {
        let kind = &spans[span_idx].kind;
        return Err(error(
            format!(
                "`{}` is never closed with `{}`",
                kind.open_marker(),
                kind.close_marker()
            ),
            open_idx,
        ));
    }

    Ok(MarkedText { text, spans })
}

/// Returns the annotation kind code if the text starts with `<ascii letters>:`.
fn annotation_code(text: &str) -> Option<&str> {
    let len = text
        .bytes()
        .take_while(|byte| byte.is_ascii_alphabetic())
        .count();
    (len > 0 && text[len..].starts_with(':')).then(|| &text[..len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn source_markers_work() {
        for (input, expected_text, expected_spans) in [
            // Zero spans.
            ("let a = 1;", "let a = 1;", vec![]),
            // Single span.
            (
                "if [|x == None|] {}",
                "if x == None {}",
                vec![(SpanKind::Primary, range(3, 12))],
            ),
            // Multiple spans, offsets are rebased as markers are removed.
            (
                "[|a|] + [|b|]",
                "a + b",
                vec![
                    (SpanKind::Primary, range(0, 1)),
                    (SpanKind::Primary, range(4, 5)),
                ],
            ),
            // Additional spans.
            (
                "[|a|] == {|b|}",
                "a == b",
                vec![
                    (SpanKind::Primary, range(0, 1)),
                    (SpanKind::Additional, range(5, 6)),
                ],
            ),
            // Empty span.
            ("fn [||]main() {}", "fn main() {}", vec![(SpanKind::Primary, range(3, 3))]),
            // Nested spans.
            (
                "[|a {|b|} c|]",
                "a b c",
                vec![
                    (SpanKind::Primary, range(0, 5)),
                    (SpanKind::Additional, range(2, 3)),
                ],
            ),
            // Multi-byte chars.
            ("é[|ü|]", "éü", vec![(SpanKind::Primary, range(2, 4))]),
        ] {
            let parsed = parse(input, MarkerSyntax::Source).unwrap();
            assert_eq!(parsed.text, expected_text, "input: {input}");
            let spans: Vec<_> = parsed
                .spans
                .iter()
                .map(|span| (span.kind.clone(), span.range))
                .collect();
            assert_eq!(spans, expected_spans, "input: {input}");
        }
    }

    #[test]
    fn expected_markers_work() {
        for (input, expected_text, expected_spans) in [
            ("x.is_none()", "x.is_none()", vec![]),
            (
                "let {|r:value|} = 1;",
                "let value = 1;",
                vec![(AnnotationKind::Rename, range(4, 9))],
            ),
            (
                "{|n:{|r:a|}|}",
                "a",
                vec![
                    (AnnotationKind::Navigation, range(0, 1)),
                    (AnnotationKind::Rename, range(0, 1)),
                ],
            ),
            (
                "{|custom:a|}",
                "a",
                vec![(AnnotationKind::Other("custom".to_owned()), range(0, 1))],
            ),
            // Source markers and unmatched closers are literal text in expected text.
            ("[|a|] {|b|}", "[|a|] {|b|}", vec![]),
            ("|} {|1:", "|} {|1:", vec![]),
        ] {
            let parsed = parse(input, MarkerSyntax::Expected).unwrap();
            assert_eq!(parsed.text, expected_text, "input: {input}");
            let spans: Vec<_> = parsed
                .spans
                .iter()
                .map(|span| match &span.kind {
                    SpanKind::Annotation(kind) => (kind.clone(), span.range),
                    kind => panic!("unexpected span kind: {kind:?}"),
                })
                .collect();
            assert_eq!(spans, expected_spans, "input: {input}");
        }
    }

    #[test]
    fn invalid_markers_fail() {
        for (input, expected_line, expected_column) in [
            // Unclosed span.
            ("a\n[|b", 1, 0),
            // Closer without opener.
            ("ab|]", 0, 2),
            // Mismatched closer.
            ("[|a|}", 0, 3),
            ("{|a|]", 0, 3),
        ] {
            match parse(input, MarkerSyntax::Source) {
                Err(VerifyError::InvalidFixture { position, .. }) => {
                    assert_eq!(
                        (position.line, position.character),
                        (expected_line, expected_column),
                        "input: {input}"
                    );
                }
                result => panic!("expected invalid fixture for {input:?}, got: {result:?}"),
            }
        }

        assert!(matches!(
            parse("{|r:a", MarkerSyntax::Expected),
            Err(VerifyError::InvalidFixture { .. })
        ));
    }

    #[test]
    fn marker_removal_is_reversible() {
        for (input, syntax) in [
            ("", MarkerSyntax::Source),
            ("no markers", MarkerSyntax::Source),
            ("[|a|]", MarkerSyntax::Source),
            ("[|a|][|b|]", MarkerSyntax::Source),
            ("[|a|] + [|b|] + {|c|}", MarkerSyntax::Source),
            ("[||]", MarkerSyntax::Source),
            ("[||][||]", MarkerSyntax::Source),
            ("[|[||]a|]", MarkerSyntax::Source),
            ("[||][|a|]", MarkerSyntax::Source),
            ("[|a[||]|]", MarkerSyntax::Source),
            ("[|a|][||]", MarkerSyntax::Source),
            ("[|{|a|}|]", MarkerSyntax::Source),
            ("[|x {|y|}|] z {|w|}", MarkerSyntax::Source),
            ("let {|r:value|} = 1;", MarkerSyntax::Expected),
            ("{|n:{|r:a|}|} b", MarkerSyntax::Expected),
            ("{|r:|}{|n:x|}", MarkerSyntax::Expected),
            ("|} {|r:a|} [|b|]", MarkerSyntax::Expected),
        ] {
            let parsed = parse(input, syntax).unwrap();
            assert_eq!(parsed.to_marked_text(), input, "input: {input}");
        }
    }
}
