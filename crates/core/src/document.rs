//! Document trait: a stored record with an internal id and a unique external key.

use crate::id::DocumentId;

/// A record persisted in one collection of the document store.
pub trait Document: Clone + Send + Sync + 'static {
    /// Collection name (`courses`, `quizzes`).
    const COLLECTION: &'static str;

    /// JSON name of the unique external key field.
    const KEY_FIELD: &'static str;

    /// Store-internal identifier.
    fn document_id(&self) -> DocumentId;

    /// Value of the unique external key.
    fn key(&self) -> &str;
}
