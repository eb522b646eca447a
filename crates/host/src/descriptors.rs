//! Descriptors of the sample rules.

use std::sync::Arc;

use fixcheck::{DiagnosticDescriptor, Severity};
use once_cell::sync::Lazy;

/// Comparison with `None` (`x == None`, `x != None`).
pub static COMPARISON_WITH_NONE: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        "FC0001",
        "Comparison with `None`",
        "Use `{0}` instead of comparing with `None`",
        "Style",
        Severity::Warning,
    ))
});

/// Comparison with a boolean literal (`x == true`, `x != false`, ...).
pub static COMPARISON_WITH_BOOL: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(DiagnosticDescriptor::new(
        "FC0002",
        "Comparison with a boolean literal",
        "Redundant comparison with `{0}`",
        "Style",
        Severity::Warning,
    ))
});

/// Empty `else` block.
pub static EMPTY_ELSE: Lazy<Arc<DiagnosticDescriptor>> = Lazy::new(|| {
    Arc::new(
        DiagnosticDescriptor::new(
            "FC0003",
            "Empty `else` block",
            "Remove the empty `else` block",
            "Style",
            Severity::Info,
        )
        .disabled_by_default(),
    )
});
