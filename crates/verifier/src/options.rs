//! Immutable verification options.
//!
//! All `with_*`/`add_*` methods return new instances and leave the receiver untouched.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostic::{DiagnosticDescriptor, Severity};
use crate::error::{VerifyError, VerifyResult};

/// Metadata references available to every test project by default.
pub static DEFAULT_METADATA_REFERENCES: Lazy<BTreeSet<String>> = Lazy::new(|| {
    ["alloc", "core", "std"]
        .into_iter()
        .map(String::from)
        .collect()
});

/// Characters that are not allowed in document and directory names.
static INVALID_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"|?*\\\x00-\x1F]"#).unwrap());

/// Default ceiling for applied fixes in one convergence loop.
pub const DEFAULT_MAX_FIX_ITERATIONS: usize = 100;

/// Options that control how source text is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Language version (e.g. a Rust edition like `2015`).
    pub language_version: Option<String>,
    /// Conditional compilation symbols.
    pub preprocessor_symbols: BTreeSet<String>,
}

impl ParseOptions {
    /// Returns a copy with the given language version.
    pub fn with_language_version(&self, version: impl Into<String>) -> Self {
        Self {
            language_version: Some(version.into()),
            ..self.clone()
        }
    }

    /// Returns a copy with an additional preprocessor symbol.
    pub fn add_preprocessor_symbol(&self, symbol: impl Into<String>) -> Self {
        let mut options = self.clone();
        options.preprocessor_symbols.insert(symbol.into());
        options
    }
}

/// How a rule is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDiagnostic {
    /// The rule never reports.
    Suppress,
    /// The rule reports with the given severity.
    Report(Severity),
}

/// Options that control compilation and diagnostic reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Per-rule report overrides.
    pub specific_diagnostic_options: BTreeMap<String, ReportDiagnostic>,
}

impl CompilationOptions {
    /// Returns a copy with the report override for the rule.
    pub fn with_diagnostic_option(&self, id: impl Into<String>, report: ReportDiagnostic) -> Self {
        let mut options = self.clone();
        options.specific_diagnostic_options.insert(id.into(), report);
        options
    }

    /// Returns the report override for the rule (if any).
    pub fn report_for(&self, id: &str) -> Option<ReportDiagnostic> {
        self.specific_diagnostic_options.get(id).copied()
    }
}

/// Options for a single verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOptions {
    language: String,
    parse_options: ParseOptions,
    compilation_options: CompilationOptions,
    metadata_references: BTreeSet<String>,
    allowed_compiler_diagnostic_severity: Severity,
    allowed_compiler_diagnostic_ids: BTreeSet<String>,
    document_directory: Option<String>,
    document_name: String,
    max_fix_iterations: usize,
}

impl TestOptions {
    /// Creates default options for the language.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            parse_options: ParseOptions::default(),
            compilation_options: CompilationOptions::default(),
            metadata_references: DEFAULT_METADATA_REFERENCES.clone(),
            allowed_compiler_diagnostic_severity: Severity::Info,
            allowed_compiler_diagnostic_ids: BTreeSet::new(),
            document_directory: None,
            document_name: "test".to_owned(),
            max_fix_iterations: DEFAULT_MAX_FIX_ITERATIONS,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse_options
    }

    pub fn compilation_options(&self) -> &CompilationOptions {
        &self.compilation_options
    }

    pub fn metadata_references(&self) -> &BTreeSet<String> {
        &self.metadata_references
    }

    /// Highest compiler diagnostic severity that is tolerated (inclusive).
    pub fn allowed_compiler_diagnostic_severity(&self) -> Severity {
        self.allowed_compiler_diagnostic_severity
    }

    pub fn allowed_compiler_diagnostic_ids(&self) -> &BTreeSet<String> {
        &self.allowed_compiler_diagnostic_ids
    }

    pub fn document_directory(&self) -> Option<&str> {
        self.document_directory.as_deref()
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn max_fix_iterations(&self) -> usize {
        self.max_fix_iterations
    }

    /// Returns a copy with the given parse options.
    pub fn with_parse_options(&self, parse_options: ParseOptions) -> Self {
        Self {
            parse_options,
            ..self.clone()
        }
    }

    /// Returns a copy with the given compilation options.
    pub fn with_compilation_options(&self, compilation_options: CompilationOptions) -> Self {
        Self {
            compilation_options,
            ..self.clone()
        }
    }

    /// Returns a copy with an additional metadata reference.
    pub fn add_metadata_reference(&self, reference: impl Into<String>) -> Self {
        let mut options = self.clone();
        options.metadata_references.insert(reference.into());
        options
    }

    /// Returns a copy with the given metadata references (replacing the defaults).
    pub fn with_metadata_references<I, S>(&self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metadata_references: references.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    /// Returns a copy with the given compiler diagnostic severity ceiling.
    pub fn with_allowed_compiler_diagnostic_severity(&self, severity: Severity) -> Self {
        Self {
            allowed_compiler_diagnostic_severity: severity,
            ..self.clone()
        }
    }

    /// Returns a copy that tolerates the compiler diagnostic id.
    pub fn add_allowed_compiler_diagnostic_id(&self, id: impl Into<String>) -> Self {
        let mut options = self.clone();
        options.allowed_compiler_diagnostic_ids.insert(id.into());
        options
    }

    /// Returns a copy that tolerates the compiler diagnostic ids.
    pub fn add_allowed_compiler_diagnostic_ids<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = self.clone();
        options
            .allowed_compiler_diagnostic_ids
            .extend(ids.into_iter().map(Into::into));
        options
    }

    /// Returns a copy with the given fix iteration ceiling.
    pub fn with_max_fix_iterations(&self, max_fix_iterations: usize) -> Self {
        Self {
            max_fix_iterations,
            ..self.clone()
        }
    }

    /// Returns a copy in which the rule reports with its default severity.
    pub fn with_enabled(&self, descriptor: &DiagnosticDescriptor) -> Self {
        self.with_compilation_options(self.compilation_options.with_diagnostic_option(
            descriptor.id.as_str(),
            ReportDiagnostic::Report(descriptor.default_severity),
        ))
    }

    /// Returns a copy in which the rule reports with its default severity,
    /// unless the compilation options already have a report override for it.
    pub fn with_enabled_unless_overridden(&self, descriptor: &DiagnosticDescriptor) -> Self {
        match self.compilation_options.report_for(&descriptor.id) {
            Some(_) => self.clone(),
            None => self.with_enabled(descriptor),
        }
    }

    /// Returns a copy in which the rule is suppressed.
    pub fn with_disabled(&self, descriptor: &DiagnosticDescriptor) -> Self {
        self.with_compilation_options(
            self.compilation_options
                .with_diagnostic_option(descriptor.id.as_str(), ReportDiagnostic::Suppress),
        )
    }

    /// Returns a copy with the given base document name.
    pub fn with_document_name(&self, name: &str) -> VerifyResult<Self> {
        validate_name(name, "document name")?;
        Ok(Self {
            document_name: name.to_owned(),
            ..self.clone()
        })
    }

    /// Returns a copy with the given document directory (`/` separated).
    pub fn with_document_directory(&self, directory: &str) -> VerifyResult<Self> {
        for segment in directory.split('/').filter(|segment| !segment.is_empty()) {
            validate_name(segment, "directory name")?;
        }
        Ok(Self {
            document_directory: Some(directory.trim_matches('/').to_owned()),
            ..self.clone()
        })
    }

    /// Returns the path of a document with the given file name.
    pub fn document_path(&self, file_name: &str) -> String {
        match self.document_directory() {
            Some(directory) if !directory.is_empty() => format!("{directory}/{file_name}"),
            _ => file_name.to_owned(),
        }
    }

    /// Returns true if a compiler diagnostic is tolerated.
    ///
    /// A diagnostic is tolerated when its severity doesn't exceed the ceiling (inclusive)
    /// or its id is allow-listed.
    pub fn is_allowed_compiler_diagnostic(&self, id: &str, severity: Severity) -> bool {
        severity <= self.allowed_compiler_diagnostic_severity
            || self.allowed_compiler_diagnostic_ids.contains(id)
    }
}

fn validate_name(name: &str, what: &'static str) -> VerifyResult<()> {
    let invalid = name.is_empty() || name == "." || name == ".." || INVALID_NAME_CHARS.is_match(name);
    if invalid {
        return Err(VerifyError::InvalidPath {
            name: name.to_owned(),
            reason: format!("invalid {what}"),
        });
    }
    Ok(())
}
