//! Quiz documents, their questions, and answer checking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;
use crate::json::string_or_number;
use crate::validation::RequiredFields;

pub const DUPLICATE_QUESTION_ID: &str = "Each question must have a unique id";

/// A single quiz item.
///
/// `correct_answer` is expected to be one of `options`; that is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    /// Exact, case-sensitive comparison. A missing answer is never correct.
    pub fn check(&self, answer: Option<&str>) -> AnswerVerdict {
        match answer {
            Some(a) if a == self.correct_answer => AnswerVerdict::Correct,
            _ => AnswerVerdict::Incorrect,
        }
    }
}

/// Outcome of checking one answer. Both variants are successful responses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnswerVerdict {
    Correct,
    Incorrect,
}

impl AnswerVerdict {
    pub fn message(&self) -> &'static str {
        match self {
            AnswerVerdict::Correct => "Correct answer",
            AnswerVerdict::Incorrect => "Incorrect answer",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
}

impl QuestionInput {
    fn into_question(self, index: usize, required: &mut RequiredFields) -> Option<Question> {
        let path = |field: &str| format!("questions.{index}.{field}");

        let id = required.take(&path("id"), "id", self.id);
        let question = required.take(&path("question"), "question", self.question);
        let options = required.take(&path("options"), "options", self.options);
        let correct_answer = required.take(&path("correctAnswer"), "correctAnswer", self.correct_answer);

        Some(Question {
            id: id?,
            question: question?,
            options: options?,
            correct_answer: correct_answer?,
        })
    }
}

fn build_questions(inputs: Vec<QuestionInput>, required: &mut RequiredFields) -> Option<Vec<Question>> {
    let questions: Vec<Option<Question>> = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| input.into_question(index, required))
        .collect();
    questions.into_iter().collect()
}

/// A stored quiz, attached to one course by `course_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub quizid: String,
    pub course_id: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizInput {
    pub quizid: Option<String>,
    pub course_id: Option<String>,
    pub questions: Option<Vec<QuestionInput>>,
}

impl QuizInput {
    pub fn from_json(value: serde_json::Value) -> DomainResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// The `id` of every question in a raw quiz body, in order (`None` where absent).
///
/// Runs before the body is decoded, so a malformed question field does not hide
/// an unknown course or a repeated id. Only the `questions` array itself is required.
pub fn submitted_question_ids(body: &Value) -> DomainResult<Vec<Option<String>>> {
    let questions = match body.get("questions") {
        None | Some(Value::Null) => {
            return Err(DomainError::validation(
                "Quiz validation failed: questions: Path `questions` is required.",
            ));
        }
        Some(Value::Array(questions)) => questions,
        Some(_) => {
            return Err(DomainError::validation(
                "Quiz validation failed: questions: expected an array",
            ));
        }
    };

    Ok(questions
        .iter()
        .map(|q| match q.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => Some(other.to_string()),
        })
        .collect())
}

/// Reject a question list in which any id appears twice.
pub fn ensure_unique_question_ids(ids: &[Option<String>]) -> DomainResult<()> {
    let unique: HashSet<&Option<String>> = ids.iter().collect();
    if unique.len() != ids.len() {
        return Err(DomainError::invariant(DUPLICATE_QUESTION_ID));
    }
    Ok(())
}

impl Quiz {
    pub fn create(id: DocumentId, input: QuizInput) -> DomainResult<Self> {
        let mut required = RequiredFields::new();

        let quizid = required.take("quizid", "quizid", input.quizid);
        let course_id = required.take("courseId", "courseId", input.course_id);
        let questions = build_questions(input.questions.unwrap_or_default(), &mut required);

        let (Some(quizid), Some(course_id), Some(questions)) = (quizid, course_id, questions) else {
            return Err(required.into_error("Quiz validation failed"));
        };

        Ok(Self {
            id,
            quizid,
            course_id,
            questions,
        })
    }

    /// Field-level overwrite. Question ids are not re-checked for uniqueness.
    pub fn apply(&mut self, patch: QuizInput) -> DomainResult<()> {
        let questions = match patch.questions {
            Some(inputs) => {
                let mut required = RequiredFields::new();
                match build_questions(inputs, &mut required) {
                    Some(questions) if required.is_empty() => Some(questions),
                    _ => return Err(required.into_error("Validation failed")),
                }
            }
            None => None,
        };

        if let Some(v) = patch.quizid {
            self.quizid = v;
        }
        if let Some(v) = patch.course_id {
            self.course_id = v;
        }
        if let Some(v) = questions {
            self.questions = v;
        }
        Ok(())
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

impl Document for Quiz {
    const COLLECTION: &'static str = "quizzes";
    const KEY_FIELD: &'static str = "quizid";

    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn key(&self) -> &str {
        &self.quizid
    }
}
