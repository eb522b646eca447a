//! Text ranges, line positions and text edits.

use std::fmt;

use line_index::LineIndex;

pub use text_size::{TextRange, TextSize};

/// A zero-based line and column position.
///
/// Columns are measured in UTF-8 code units from the start of the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinePosition {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column.
    pub character: u32,
}

impl LinePosition {
    /// Creates a line position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Displays the position in the 1-based form used in failure messages.
impl fmt::Display for LinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line + 1, self.character + 1)
    }
}

/// A span expressed as a pair of line positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinePositionSpan {
    pub start: LinePosition,
    pub end: LinePosition,
}

impl LinePositionSpan {
    /// Creates a line position span.
    pub fn new(start: LinePosition, end: LinePosition) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for LinePositionSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})-({})", self.start, self.end)
    }
}

/// A line position span in a named file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileLinePositionSpan {
    pub path: String,
    pub span: LinePositionSpan,
}

/// Converts byte offsets in a text into line positions.
#[derive(Debug)]
pub struct LineMap {
    index: LineIndex,
    len: TextSize,
}

impl LineMap {
    /// Builds the line map for the text.
    pub fn new(text: &str) -> Self {
        Self {
            index: LineIndex::new(text),
            len: TextSize::of(text),
        }
    }

    /// Returns the line position of the offset.
    ///
    /// Offsets past the end of the text are clamped to the end of the text.
    pub fn position(&self, offset: TextSize) -> LinePosition {
        let offset = offset.min(self.len);
        self.index
            .try_line_col(offset)
            .or_else(|| self.index.try_line_col(self.len))
            .map(|line_col| LinePosition::new(line_col.line, line_col.col))
            .unwrap_or_default()
    }

    /// Returns the line position span of the range.
    pub fn span(&self, range: TextRange) -> LinePositionSpan {
        LinePositionSpan::new(self.position(range.start()), self.position(range.end()))
    }
}

/// Describes the first position at which two texts differ (if any).
pub fn first_difference(expected: &str, actual: &str) -> Option<LinePosition> {
    let offset = expected
        .char_indices()
        .zip(actual.chars())
        .find(|((_, expected_char), actual_char)| expected_char != actual_char)
        .map(|((idx, _), _)| idx)
        .or_else(|| {
            (expected.len() != actual.len()).then(|| expected.len().min(actual.len()))
        })?;
    let offset = TextSize::try_from(offset).ok()?;
    let map = LineMap::new(if offset <= TextSize::of(expected) {
        expected
    } else {
        actual
    });
    Some(map.position(offset))
}

/// The kind of an annotation attached to a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    /// Marks an identifier the user is expected to rename (fixture code `r`).
    Rename,
    /// Marks the position the editor should navigate to (fixture code `n`).
    Navigation,
    /// Marks text that should be presented with a warning (fixture code `w`).
    Warning,
    /// Any other annotation kind, identified by its fixture code.
    Other(String),
}

impl AnnotationKind {
    /// Resolves an annotation kind from its fixture code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "r" => AnnotationKind::Rename,
            "n" => AnnotationKind::Navigation,
            "w" => AnnotationKind::Warning,
            _ => AnnotationKind::Other(code.to_owned()),
        }
    }

    /// Returns the fixture code of the annotation kind.
    pub fn code(&self) -> &str {
        match self {
            AnnotationKind::Rename => "r",
            AnnotationKind::Navigation => "n",
            AnnotationKind::Warning => "w",
            AnnotationKind::Other(code) => code,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKind::Rename => f.write_str("rename"),
            AnnotationKind::Navigation => f.write_str("navigation"),
            AnnotationKind::Warning => f.write_str("warning"),
            AnnotationKind::Other(code) => f.write_str(code),
        }
    }
}

/// An annotation on a text range of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub range: TextRange,
}

impl Annotation {
    /// Creates an annotation.
    pub fn new(kind: AnnotationKind, range: TextRange) -> Self {
        Self { kind, range }
    }
}

/// A text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Replacement text for the text edit.
    pub text: String,
    /// Range to which the text edit will be applied.
    pub range: TextRange,
    /// Annotations on the replacement text.
    ///
    /// Ranges are relative to the start of `text`.
    pub annotations: Vec<Annotation>,
}

impl TextEdit {
    /// Creates text edit.
    pub fn new(text: String, range: TextRange) -> Self {
        Self {
            text,
            range,
            annotations: Vec::new(),
        }
    }

    /// Creates a text edit for inserting at the given offset.
    pub fn insert(text: String, offset: TextSize) -> Self {
        Self::new(text, TextRange::empty(offset))
    }

    /// Creates a text edit for replacing the given range (alias of new).
    pub fn replace(text: String, range: TextRange) -> Self {
        Self::new(text, range)
    }

    /// Creates a text edit for deleting the specified range.
    pub fn delete(range: TextRange) -> Self {
        Self::new(String::new(), range)
    }

    /// Annotates a range of the replacement text (relative to the start of the replacement text).
    pub fn with_annotation(mut self, kind: AnnotationKind, range: TextRange) -> Self {
        self.annotations.push(Annotation::new(kind, range));
        self
    }
}
