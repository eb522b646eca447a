//! Ordering and equality strategies for diagnostics and descriptors.

use std::cmp::Ordering;

use super::{Diagnostic, DiagnosticDescriptor};

/// A diagnostic ordering/equality strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticComparer {
    /// Compares rule identifiers (ordinal).
    Id,
    /// Compares the start offset of the primary location.
    SpanStart,
    /// Compares rule identifiers, then the start offset of the primary location.
    IdAndSpanStart,
}

impl DiagnosticComparer {
    /// Compares two diagnostics.
    pub fn compare(self, a: &Diagnostic, b: &Diagnostic) -> Ordering {
        match self {
            DiagnosticComparer::Id => a.id().cmp(b.id()),
            DiagnosticComparer::SpanStart => a.span_start().cmp(&b.span_start()),
            DiagnosticComparer::IdAndSpanStart => DiagnosticComparer::Id
                .compare(a, b)
                .then_with(|| DiagnosticComparer::SpanStart.compare(a, b)),
        }
    }

    /// Returns true if two diagnostics are equal under the strategy.
    pub fn equals(self, a: &Diagnostic, b: &Diagnostic) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Sorts diagnostics in place (stable).
    pub fn sort(self, diagnostics: &mut [Diagnostic]) {
        diagnostics.sort_by(|a, b| self.compare(a, b));
    }
}

/// A descriptor ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorComparer {
    /// Compares rule identifiers (ordinal).
    Id,
}

impl DescriptorComparer {
    /// Compares two descriptors.
    pub fn compare(self, a: &DiagnosticDescriptor, b: &DiagnosticDescriptor) -> Ordering {
        match self {
            DescriptorComparer::Id => a.id.cmp(&b.id),
        }
    }
}

/// Returns true if two diagnostics are structurally equal.
///
/// Compares the rule identifier, the document path and line span of the primary location,
/// the severity and the warning level.
pub fn deep_equal(a: &Diagnostic, b: &Diagnostic) -> bool {
    a.id() == b.id()
        && a.location().path() == b.location().path()
        && a.location().line_span() == b.location().line_span()
        && a.severity() == b.severity()
        && a.warning_level() == b.warning_level()
}

/// Returns true if two diagnostic lists have the same length and are pairwise deep-equal.
pub fn deep_equal_all(a: &[Diagnostic], b: &[Diagnostic]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| deep_equal(a, b))
}
