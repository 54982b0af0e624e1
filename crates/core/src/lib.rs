//! `eduplatform-core` — course and quiz documents.
//!
//! This crate contains the **pure domain** records (no infrastructure concerns):
//! the stored document shapes, the loosely-typed input records decoded from
//! request bodies, and the validation that turns one into the other.

pub mod course;
pub mod document;
pub mod error;
pub mod id;
mod json;
pub mod quiz;
mod validation;

pub use course::{Chapter, ChapterInput, Course, CourseInput};
pub use document::Document;
pub use error::{DomainError, DomainResult};
pub use id::DocumentId;
pub use quiz::{AnswerVerdict, Question, QuestionInput, Quiz, QuizInput, ensure_unique_question_ids, submitted_question_ids};
