use crate::error::{invalid_argument, FirestoreResult};

/// A path to a document field, or the special document-id path.
///
/// The document-id form carries no segments; it addresses the document's
/// identifier rather than any stored field, and adapters translate it to
/// whatever marker their native SDK uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    document_id: bool,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<I, S>(segments: I) -> FirestoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(invalid_argument("field path must contain at least one segment"));
        }
        if segments.iter().any(String::is_empty) {
            return Err(invalid_argument("field path segments must not be empty"));
        }
        Ok(Self {
            document_id: false,
            segments,
        })
    }

    pub fn from_dot_separated(path: &str) -> FirestoreResult<Self> {
        Self::new(path.split('.'))
    }

    /// The path addressing the document identifier itself.
    pub fn document_id() -> Self {
        Self {
            document_id: true,
            segments: Vec::new(),
        }
    }

    pub fn is_document_id(&self) -> bool {
        self.document_id
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}
