use serde::Serialize;

/// Query string of `GET /api/quizzes/:quizId/check-answer`.
///
/// Built from the raw pairs so that repeated keys do not reject the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckAnswerQuery {
    pub question_id: Option<String>,
    pub answer: Option<String>,
}

impl CheckAnswerQuery {
    /// A parameter given more than once matches nothing, the same as a missing one.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let single = |key: &str| {
            let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v);
            match (values.next(), values.next()) {
                (Some(v), None) => Some(v.clone()),
                _ => None,
            }
        };

        Self {
            question_id: single("questionId"),
            answer: single("answer"),
        }
    }
}

/// `{"message": ...}` body of the answer check.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
