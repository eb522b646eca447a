//! Diagnostics, descriptors and message formatting.

use std::fmt;
use std::sync::Arc;

use crate::text::{LinePositionSpan, TextRange, TextSize};

pub use comparer::{deep_equal, deep_equal_all, DescriptorComparer, DiagnosticComparer};

mod comparer;

/// The severity level of a diagnostic.
///
/// Variants are ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// A diagnostic that is not surfaced to the user.
    Hidden,
    /// An informational diagnostic.
    Info,
    /// A diagnostic warning.
    Warning,
    /// A diagnostic error.
    Error,
}

impl Severity {
    /// Returns the default warning level of the severity.
    pub fn warning_level(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Info | Severity::Hidden => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Describes a diagnostic rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticDescriptor {
    /// Stable rule identifier (e.g. `FC0001`).
    pub id: String,
    /// Short title of the rule.
    pub title: String,
    /// Message format with `{0}`, `{1}` ... argument placeholders.
    pub message_format: String,
    /// Category of the rule.
    pub category: String,
    /// Severity reported when no override applies.
    pub default_severity: Severity,
    /// Whether the rule reports without being explicitly enabled.
    pub is_enabled_by_default: bool,
}

impl DiagnosticDescriptor {
    /// Creates a descriptor that is enabled by default.
    pub fn new(
        id: &str,
        title: &str,
        message_format: &str,
        category: &str,
        default_severity: Severity,
    ) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            message_format: message_format.to_owned(),
            category: category.to_owned(),
            default_severity,
            is_enabled_by_default: true,
        }
    }

    /// Returns a copy of the descriptor that is disabled by default.
    pub fn disabled_by_default(mut self) -> Self {
        self.is_enabled_by_default = false;
        self
    }
}

/// A location in a source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the document.
    pub path: String,
    /// Byte range in the document.
    pub range: TextRange,
    /// Line position span of the range.
    pub line_span: LinePositionSpan,
}

/// The location of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// The diagnostic is not attached to any source.
    None,
    /// A location in a source document.
    Source(SourceLocation),
}

impl Location {
    /// Returns the source location (if any).
    pub fn source(&self) -> Option<&SourceLocation> {
        match self {
            Location::None => None,
            Location::Source(location) => Some(location),
        }
    }

    /// Returns the byte range (if any).
    pub fn range(&self) -> Option<TextRange> {
        self.source().map(|location| location.range)
    }

    /// Returns the document path (if any).
    pub fn path(&self) -> Option<&str> {
        self.source().map(|location| location.path.as_str())
    }

    /// Returns the line position span (if any).
    pub fn line_span(&self) -> Option<LinePositionSpan> {
        self.source().map(|location| location.line_span)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::None => f.write_str("<no location>"),
            Location::Source(location) => {
                write!(f, "{}{}", location.path, location.line_span)
            }
        }
    }
}

/// Formats diagnostic message arguments.
///
/// Analogous to a culture-aware format provider.
pub trait MessageFormatter: Send + Sync {
    /// Formats a single message argument.
    fn format_argument(&self, argument: &str) -> String;
}

/// A message formatter that leaves arguments untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantFormatter;

impl MessageFormatter for InvariantFormatter {
    fn format_argument(&self, argument: &str) -> String {
        argument.to_owned()
    }
}

/// A reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    descriptor: Arc<DiagnosticDescriptor>,
    severity: Severity,
    warning_level: u8,
    location: Location,
    additional_locations: Vec<Location>,
    arguments: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic for the descriptor with its default severity.
    pub fn new(descriptor: Arc<DiagnosticDescriptor>, location: Location) -> Self {
        let severity = descriptor.default_severity;
        Self {
            descriptor,
            severity,
            warning_level: severity.warning_level(),
            location,
            additional_locations: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Returns a copy of the diagnostic with the given severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self.warning_level = severity.warning_level();
        self
    }

    /// Returns a copy of the diagnostic with the given additional locations.
    pub fn with_additional_locations(mut self, locations: Vec<Location>) -> Self {
        self.additional_locations = locations;
        self
    }

    /// Returns a copy of the diagnostic with the given message arguments.
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the rule identifier.
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &Arc<DiagnosticDescriptor> {
        &self.descriptor
    }

    /// Returns the severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the warning level.
    pub fn warning_level(&self) -> u8 {
        self.warning_level
    }

    /// Returns the primary location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the additional locations.
    pub fn additional_locations(&self) -> &[Location] {
        &self.additional_locations
    }

    /// Returns the message arguments.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns the start offset of the primary location.
    ///
    /// Diagnostics without a location sort before every located diagnostic.
    pub fn span_start(&self) -> Option<TextSize> {
        self.location.range().map(|range| range.start())
    }

    /// Returns the message formatted with the invariant formatter.
    pub fn message(&self) -> String {
        self.message_with(&InvariantFormatter)
    }

    /// Returns the message formatted with the given formatter.
    pub fn message_with(&self, formatter: &dyn MessageFormatter) -> String {
        format_message(&self.descriptor.message_format, &self.arguments, formatter)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Location::None => {}
            Location::Source(location) => write!(
                f,
                "{}({},{}): ",
                location.path,
                location.line_span.start.line + 1,
                location.line_span.start.character + 1
            )?,
        }
        write!(f, "{} {}: {}", self.severity, self.id(), self.message())
    }
}

/// Substitutes `{N}` placeholders in the format with the formatted arguments.
///
/// `{{` and `}}` are escapes for literal braces.
/// Placeholders without a matching argument are kept verbatim.
fn format_message(format: &str, arguments: &[String], formatter: &dyn MessageFormatter) -> String {
    let mut result = String::with_capacity(format.len());
    let mut chars = format.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|(_, next)| *next) == Some('{') => {
                chars.next();
                result.push('{');
            }
            '}' if chars.peek().map(|(_, next)| *next) == Some('}') => {
                chars.next();
                result.push('}');
            }
            '{' => {
                let rest = &format[idx + 1..];
                let argument = rest.find('}').and_then(|end| {
                    let index = rest[..end].parse::<usize>().ok()?;
                    Some((end, arguments.get(index)?))
                });
                match argument {
                    Some((end, argument)) => {
                        result.push_str(&formatter.format_argument(argument));
                        // Skips the digits and the closing brace.
                        for _ in 0..=rest[..end].chars().count() {
                            chars.next();
                        }
                    }
                    None => result.push('{'),
                }
            }
            _ => result.push(c),
        }
    }
    result
}
