use thiserror::Error;

use eduplatform_core::{Course, CourseInput, Document, DomainError, Quiz, QuizInput};

/// Name of the collection-wide index over chapter ids.
pub const CHAPTER_ID_INDEX: &str = "chapters.id_1";

/// Document store operation error.
///
/// These are **infrastructure errors** (key conflicts, driver failures, undecodable
/// rows), plus domain validation raised while applying a patch inside the store.
/// Every variant is reported to API callers as a failure with its message.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("duplicate key error collection: {collection} index: {index} dup key: {{ {field}: \"{value}\" }}")]
    Duplicate {
        collection: &'static str,
        index: String,
        field: &'static str,
        value: String,
    },

    /// A patch applied inside the store failed validation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A stored document could not be decoded.
    #[error("corrupt document in {collection}: {message}")]
    Corrupt {
        collection: &'static str,
        message: String,
    },

    /// Driver, connection, or lock failure.
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Conflict on the external key of document type `D` (`courseId_1`, `quizid_1`).
    pub fn duplicate_key<D: Document>(value: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: D::COLLECTION,
            index: format!("{}_1", D::KEY_FIELD),
            field: D::KEY_FIELD,
            value: value.into(),
        }
    }

    /// Conflict on a chapter id already used by another course.
    pub fn duplicate_chapter(value: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: Course::COLLECTION,
            index: CHAPTER_ID_INDEX.to_string(),
            field: "chapters.id",
            value: value.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Access to the `courses` collection, keyed by `courseId`.
///
/// Lookups return `Ok(None)` when nothing matches; callers decide how to report it.
#[async_trait::async_trait]
pub trait CourseStore: Send + Sync {
    /// Persist a new course. Fails on a taken `courseId` or chapter id.
    async fn insert_course(&self, course: Course) -> StoreResult<Course>;

    /// Every course, in store-native order.
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;

    async fn find_course(&self, course_id: &str) -> StoreResult<Option<Course>>;

    /// Apply `patch` to the matching course atomically and return the new document.
    async fn update_course(&self, course_id: &str, patch: CourseInput) -> StoreResult<Option<Course>>;

    /// Remove the matching course and return what was removed. Quizzes are left alone.
    async fn delete_course(&self, course_id: &str) -> StoreResult<Option<Course>>;
}

/// Access to the `quizzes` collection, keyed by `quizid`.
#[async_trait::async_trait]
pub trait QuizStore: Send + Sync {
    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<Quiz>;

    /// Quizzes whose `courseId` equals `course_id` (possibly none).
    async fn list_quizzes_for_course(&self, course_id: &str) -> StoreResult<Vec<Quiz>>;

    async fn find_quiz(&self, quizid: &str) -> StoreResult<Option<Quiz>>;

    async fn update_quiz(&self, quizid: &str, patch: QuizInput) -> StoreResult<Option<Quiz>>;

    async fn delete_quiz(&self, quizid: &str) -> StoreResult<Option<Quiz>>;
}
