//! Rust host language.

use fixcheck::{Diagnostic, Document, DocumentId, Language, Project, TestOptions};
use ra_ap_syntax::{AstNode, SourceFile, SyntaxNode, TextRange};

use crate::compiler;

/// Rust as a host language for the verification harness.
///
/// "Compiling" a project parses every document into a syntax tree.
/// Compiler diagnostics are syntax errors and a few name resolution and edition checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustLanguage;

impl Language for RustLanguage {
    type Compilation = RustCompilation;

    fn name(&self) -> &str {
        "Rust"
    }

    fn file_extension(&self) -> &str {
        "rs"
    }

    fn compile(&self, project: &Project) -> RustCompilation {
        RustCompilation::new(project)
    }

    fn compiler_diagnostics(&self, compilation: &RustCompilation) -> Vec<Diagnostic> {
        compiler::diagnostics(compilation)
    }
}

/// A parsed project snapshot.
#[derive(Debug)]
pub struct RustCompilation {
    project: Project,
    files: Vec<ParsedFile>,
}

/// A parsed document.
#[derive(Debug)]
pub struct ParsedFile {
    document: Document,
    tree: SourceFile,
    errors: Vec<(String, TextRange)>,
}

impl RustCompilation {
    /// Parses all documents of the project.
    pub fn new(project: &Project) -> Self {
        let files = project
            .documents()
            .map(|document| {
                let parse = SourceFile::parse(document.text());
                let errors = parse
                    .errors()
                    .into_iter()
                    .map(|error| (error.to_string(), error.range()))
                    .collect();
                ParsedFile {
                    tree: parse.tree(),
                    errors,
                    document,
                }
            })
            .collect();
        Self {
            project: project.clone(),
            files,
        }
    }

    /// Returns the compiled project snapshot.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the options the project was created with.
    pub fn options(&self) -> &TestOptions {
        self.project.options()
    }

    /// Returns all parsed documents.
    pub fn files(&self) -> &[ParsedFile] {
        &self.files
    }

    /// Returns the parsed document (if any).
    pub fn file(&self, id: DocumentId) -> Option<&ParsedFile> {
        self.files.iter().find(|file| file.document.id() == id)
    }
}

impl ParsedFile {
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the syntax tree.
    pub fn tree(&self) -> &SourceFile {
        &self.tree
    }

    /// Returns the root syntax node.
    pub fn syntax(&self) -> &SyntaxNode {
        self.tree.syntax()
    }

    /// Returns syntax errors as (message, range) pairs.
    pub fn errors(&self) -> &[(String, TextRange)] {
        &self.errors
    }
}
