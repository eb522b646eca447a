//! Test utilities for the Rust host language.

#![cfg(test)]

use fixcheck::{Language, TestOptions, Workspace};

use crate::language::{RustCompilation, RustLanguage};

/// Compiles a single document project.
pub fn compile(code: &str, options: TestOptions) -> RustCompilation {
    let language = RustLanguage;
    let workspace = Workspace::new(language.file_extension());
    let (document, _) = workspace.create_document(code, &[], &options).unwrap();
    language.compile(document.project())
}
