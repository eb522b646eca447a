//! Immutable document and project snapshots, and the per-test workspace.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::diagnostic::{Location, SourceLocation};
use crate::error::{VerifyError, VerifyResult};
use crate::naming::NameGenerator;
use crate::options::TestOptions;
use crate::text::{Annotation, AnnotationKind, LineMap, TextEdit, TextRange, TextSize};

/// Identifies a document in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct DocumentState {
    id: DocumentId,
    name: String,
    path: String,
    text: String,
    annotations: Vec<Annotation>,
    line_map: OnceCell<LineMap>,
}

impl DocumentState {
    fn new(id: DocumentId, name: String, path: String, text: String) -> Self {
        Self {
            id,
            name,
            path,
            text,
            annotations: Vec::new(),
            line_map: OnceCell::new(),
        }
    }
}

/// An immutable project snapshot.
///
/// Cloning is cheap, snapshots share unchanged documents.
#[derive(Debug, Clone)]
pub struct Project {
    documents: Arc<Vec<Arc<DocumentState>>>,
    options: Arc<TestOptions>,
}

impl Project {
    /// Returns the options the project was created with.
    pub fn options(&self) -> &TestOptions {
        &self.options
    }

    /// Returns all documents (in creation order).
    pub fn documents(&self) -> impl Iterator<Item = Document> + '_ {
        self.documents.iter().map(|state| Document {
            id: state.id,
            project: self.clone(),
        })
    }

    /// Returns the document with the given id (if any).
    pub fn document(&self, id: DocumentId) -> Option<Document> {
        self.state(id).map(|_| Document {
            id,
            project: self.clone(),
        })
    }

    /// Returns a new snapshot with all changes applied.
    ///
    /// Changes for the same document are merged and applied as one batch of edits.
    pub fn apply_changes(&self, changes: &[DocumentChanges]) -> VerifyResult<Project> {
        if let Some(change) = changes.iter().find(|change| self.state(change.document).is_none()) {
            return Err(VerifyError::InvalidEdit {
                path: change.document.to_string(),
                message: "unknown document".to_owned(),
            });
        }

        let mut documents: Vec<Arc<DocumentState>> = self.documents.as_ref().clone();
        for state in documents.iter_mut() {
            let edits: Vec<&TextEdit> = changes
                .iter()
                .filter(|change| change.document == state.id)
                .flat_map(|change| change.edits.iter())
                .collect();
            if edits.is_empty() {
                continue;
            }
            let (text, annotations) =
                apply_edits(&state.path, &state.text, &state.annotations, edits)?;
            let mut new_state =
                DocumentState::new(state.id, state.name.clone(), state.path.clone(), text);
            new_state.annotations = annotations;
            *state = Arc::new(new_state);
        }

        Ok(Project {
            documents: Arc::new(documents),
            options: self.options.clone(),
        })
    }

    fn state(&self, id: DocumentId) -> Option<&Arc<DocumentState>> {
        self.documents.get(id.0 as usize).filter(|state| state.id == id)
    }
}

/// A document in a project snapshot.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    project: Project,
}

impl Document {
    fn state(&self) -> &DocumentState {
        // Document ids are only handed out for documents of the project.
        &self.project.documents[self.id.0 as usize]
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the file name without extension.
    pub fn name(&self) -> &str {
        &self.state().name
    }

    /// Returns the file path.
    pub fn path(&self) -> &str {
        &self.state().path
    }

    /// Returns the source text.
    pub fn text(&self) -> &str {
        &self.state().text
    }

    /// Returns all annotations (sorted by position).
    pub fn annotations(&self) -> &[Annotation] {
        &self.state().annotations
    }

    /// Returns the ranges of annotations of the given kind (sorted by position).
    pub fn annotations_of(&self, kind: &AnnotationKind) -> Vec<TextRange> {
        self.annotations()
            .iter()
            .filter(|annotation| &annotation.kind == kind)
            .map(|annotation| annotation.range)
            .collect()
    }

    /// Returns the project snapshot the document belongs to.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the line map of the source text.
    pub fn line_map(&self) -> &LineMap {
        let state = self.state();
        state.line_map.get_or_init(|| LineMap::new(&state.text))
    }

    /// Returns a source location in the document.
    pub fn location(&self, range: TextRange) -> Location {
        Location::Source(SourceLocation {
            path: self.path().to_owned(),
            range,
            line_span: self.line_map().span(range),
        })
    }

    /// Returns the same document in a new snapshot with the changes applied.
    pub fn apply_changes(&self, changes: &[DocumentChanges]) -> VerifyResult<Document> {
        let project = self.project.apply_changes(changes)?;
        Ok(Document {
            id: self.id,
            project,
        })
    }

    /// Returns the same document in a new snapshot with the edits applied to it.
    pub fn apply_edits(&self, edits: Vec<TextEdit>) -> VerifyResult<Document> {
        self.apply_changes(&[DocumentChanges::new(self.id, edits)])
    }
}

/// Edits to a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChanges {
    pub document: DocumentId,
    pub edits: Vec<TextEdit>,
}

impl DocumentChanges {
    pub fn new(document: DocumentId, edits: Vec<TextEdit>) -> Self {
        Self { document, edits }
    }
}

/// Applies non-overlapping edits to the text, rebasing existing annotations.
///
/// Annotations that intersect an edited range are dropped.
fn apply_edits(
    path: &str,
    text: &str,
    annotations: &[Annotation],
    mut edits: Vec<&TextEdit>,
) -> VerifyResult<(String, Vec<Annotation>)> {
    let invalid = |message: String| VerifyError::InvalidEdit {
        path: path.to_owned(),
        message,
    };

    edits.sort_by_key(|edit| (edit.range.start(), edit.range.end()));
    let len = TextSize::of(text);
    for edit in &edits {
        if edit.range.end() > len {
            return Err(invalid(format!(
                "range {:?} is out of bounds for text of length {len:?}",
                edit.range
            )));
        }
        for offset in [edit.range.start(), edit.range.end()] {
            if !text.is_char_boundary(usize::from(offset)) {
                return Err(invalid(format!("offset {offset:?} is not on a char boundary")));
            }
        }
    }
    for pair in edits.windows(2) {
        if pair[0].range.end() > pair[1].range.start() {
            return Err(invalid(format!(
                "overlapping edits at {:?} and {:?}",
                pair[0].range, pair[1].range
            )));
        }
    }

    let mut result = String::with_capacity(text.len());
    let mut new_annotations: Vec<Annotation> = Vec::new();
    let mut last = 0usize;
    for edit in &edits {
        result.push_str(&text[last..usize::from(edit.range.start())]);
        let edit_start = TextSize::of(result.as_str());
        result.push_str(&edit.text);
        new_annotations.extend(edit.annotations.iter().map(|annotation| {
            Annotation::new(annotation.kind.clone(), annotation.range + edit_start)
        }));
        last = usize::from(edit.range.end());
    }
    result.push_str(&text[last..]);

    for annotation in annotations {
        let range = annotation.range;
        let intersects = edits.iter().any(|edit| {
            let edit_range = edit.range;
            (edit_range.start() < range.end() && range.start() < edit_range.end())
                || (edit_range.is_empty()
                    && range.start() < edit_range.start()
                    && edit_range.start() < range.end())
        });
        if intersects {
            continue;
        }
        let delta: i64 = edits
            .iter()
            .filter(|edit| edit.range.end() <= range.start())
            .map(|edit| {
                i64::from(u32::from(TextSize::of(edit.text.as_str())))
                    - i64::from(u32::from(edit.range.len()))
            })
            .sum();
        let start = i64::from(u32::from(range.start())) + delta;
        let Ok(start) = u32::try_from(start) else {
            continue;
        };
        new_annotations.push(Annotation::new(
            annotation.kind.clone(),
            TextRange::at(TextSize::from(start), range.len()),
        ));
    }
    new_annotations.sort_by_key(|annotation| (annotation.range.start(), annotation.range.end()));

    Ok((result, new_annotations))
}

/// An additional document in a test project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalFile {
    /// Source text.
    pub source: String,
    /// Expected text after the transformation (if it should be verified).
    pub expected_source: Option<String>,
}

impl AdditionalFile {
    /// Creates an additional file that isn't verified after the transformation.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            expected_source: None,
        }
    }

    /// Creates an additional file with an expected text.
    pub fn with_expected(source: impl Into<String>, expected_source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            expected_source: Some(expected_source.into()),
        }
    }
}

/// The expected text of an additional document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDocument {
    pub id: DocumentId,
    pub text: String,
}

/// An ephemeral workspace owning the documents of a single verification.
#[derive(Debug)]
pub struct Workspace {
    file_extension: String,
}

impl Workspace {
    /// Creates a workspace for documents with the given file extension.
    pub fn new(file_extension: &str) -> Self {
        tracing::trace!(file_extension, "workspace created");
        Self {
            file_extension: file_extension.to_owned(),
        }
    }

    /// Creates a project with the main document and the additional documents.
    ///
    /// Returns the main document and the expected texts of additional documents.
    pub fn create_document(
        &self,
        source: &str,
        additional_files: &[AdditionalFile],
        options: &TestOptions,
    ) -> VerifyResult<(Document, Vec<ExpectedDocument>)> {
        let main_name = options.document_name().to_owned();
        let additional_names = NameGenerator::NumberedFromOne.unique_names(
            &main_name,
            additional_files.len(),
            |name| name == main_name,
        );

        let mut documents = Vec::with_capacity(additional_files.len() + 1);
        let mut expected = Vec::new();
        for (idx, (name, text)) in std::iter::once((main_name.clone(), source))
            .chain(
                additional_names
                    .into_iter()
                    .zip(additional_files.iter().map(|file| file.source.as_str())),
            )
            .enumerate()
        {
            let id = DocumentId(u32::try_from(idx).map_err(|_| VerifyError::InvalidPath {
                name: name.clone(),
                reason: "too many documents".to_owned(),
            })?);
            let path = options.document_path(&format!("{name}.{}", self.file_extension));
            if let Some(expected_source) = idx
                .checked_sub(1)
                .and_then(|file_idx| additional_files.get(file_idx))
                .and_then(|file| file.expected_source.as_ref())
            {
                expected.push(ExpectedDocument {
                    id,
                    text: expected_source.clone(),
                });
            }
            documents.push(Arc::new(DocumentState::new(id, name, path, text.to_owned())));
        }

        let project = Project {
            documents: Arc::new(documents),
            options: Arc::new(options.clone()),
        };
        let document = Document {
            id: DocumentId(0),
            project,
        };
        tracing::debug!(
            path = document.path(),
            additional_documents = additional_files.len(),
            "document created"
        );

        Ok((document, expected))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        tracing::trace!(file_extension = %self.file_extension, "workspace released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::LinePosition;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    fn document(source: &str) -> Document {
        let (document, _) = Workspace::new("txt")
            .create_document(source, &[], &TestOptions::new("PlainText"))
            .unwrap();
        document
    }

    #[test]
    fn create_document_works() {
        let options = TestOptions::new("PlainText")
            .with_document_directory("src")
            .unwrap();
        let (document, expected) = Workspace::new("txt")
            .create_document(
                "main",
                &[
                    AdditionalFile::new("first"),
                    AdditionalFile::with_expected("second", "second fixed"),
                ],
                &options,
            )
            .unwrap();

        assert_eq!(document.path(), "src/test.txt");
        assert_eq!(document.text(), "main");
        let paths: Vec<_> = document
            .project()
            .documents()
            .map(|document| document.path().to_owned())
            .collect();
        assert_eq!(paths, vec!["src/test.txt", "src/test1.txt", "src/test2.txt"]);

        assert_eq!(expected.len(), 1);
        let second = document.project().document(expected[0].id).unwrap();
        assert_eq!(second.text(), "second");
        assert_eq!(expected[0].text, "second fixed");
    }

    #[test]
    fn apply_edits_works() {
        let document = document("let a = b == None;");
        let fixed = document
            .apply_edits(vec![
                TextEdit::replace("b.is_none()".to_owned(), range(8, 17)),
                TextEdit::replace("value".to_owned(), range(4, 5)),
            ])
            .unwrap();

        assert_eq!(fixed.text(), "let value = b.is_none();");
        // Snapshots are immutable.
        assert_eq!(document.text(), "let a = b == None;");
        assert_eq!(fixed.line_map().position(TextSize::from(12)), LinePosition::new(0, 12));
    }

    #[test]
    fn overlapping_edits_fail() {
        let document = document("abcdef");
        for edits in [
            vec![
                TextEdit::replace("x".to_owned(), range(0, 3)),
                TextEdit::replace("y".to_owned(), range(2, 4)),
            ],
            vec![TextEdit::delete(range(4, 10))],
        ] {
            assert!(matches!(
                document.apply_edits(edits),
                Err(VerifyError::InvalidEdit { .. })
            ));
        }

        // Adjacent edits don't overlap.
        let fixed = document
            .apply_edits(vec![
                TextEdit::replace("x".to_owned(), range(0, 3)),
                TextEdit::replace("y".to_owned(), range(3, 6)),
            ])
            .unwrap();
        assert_eq!(fixed.text(), "xy");
    }

    #[test]
    fn annotations_are_rebased() {
        let document = document("let a = 1;\na;");
        let introduced = document
            .apply_edits(vec![TextEdit::replace("value".to_owned(), range(4, 5))
                .with_annotation(AnnotationKind::Rename, range(0, 5))])
            .unwrap();
        assert_eq!(introduced.text(), "let value = 1;\na;");
        assert_eq!(introduced.annotations_of(&AnnotationKind::Rename), vec![range(4, 9)]);

        // Edits before an annotation shift it.
        let shifted = introduced
            .apply_edits(vec![TextEdit::insert("// c\n".to_owned(), TextSize::from(0))])
            .unwrap();
        assert_eq!(shifted.annotations_of(&AnnotationKind::Rename), vec![range(9, 14)]);

        // Edits after an annotation don't.
        let appended = shifted
            .apply_edits(vec![TextEdit::insert("\n".to_owned(), TextSize::of(shifted.text()))])
            .unwrap();
        assert_eq!(appended.annotations_of(&AnnotationKind::Rename), vec![range(9, 14)]);

        // Edits inside an annotation drop it.
        let edited = appended
            .apply_edits(vec![TextEdit::replace("x".to_owned(), range(10, 11))])
            .unwrap();
        assert!(edited.annotations().is_empty());
    }
}
