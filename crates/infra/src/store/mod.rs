//! Document store: the `courses` and `quizzes` collections.
//!
//! Handlers only see the [`CourseStore`] / [`QuizStore`] traits. Two backends exist:
//! - [`InMemoryDocumentStore`] for dev/tests
//! - [`PostgresDocumentStore`] (JSONB documents, uniqueness via constraints)

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{CourseStore, QuizStore, StoreError, StoreResult};
