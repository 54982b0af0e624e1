use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use eduplatform_core::{
    ensure_unique_question_ids, submitted_question_ids, DocumentId, DomainError, Quiz, QuizInput,
};

use crate::app::dto::{CheckAnswerQuery, MessageResponse};
use crate::app::errors;
use crate::app::services::AppServices;

/// Routes under `/api/quizzes`. Course-scoped routes live in `courses::router`.
pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_quiz).put(update_quiz).delete(delete_quiz))
        .route("/:id/check-answer", get(check_answer))
}

pub async fn create_quiz(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let question_ids = match submitted_question_ids(&body) {
        Ok(ids) => ids,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.courses().find_course(&course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(course_id = %course_id, "quiz submitted for unknown course");
            return errors::json_error(StatusCode::BAD_REQUEST, "Course not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    if let Err(e) = ensure_unique_question_ids(&question_ids) {
        tracing::warn!(course_id = %course_id, "quiz rejected: {e}");
        return errors::domain_error_to_response(e);
    }

    let mut input = match QuizInput::from_json(body) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    input.course_id = Some(course_id);
    let quiz = match Quiz::create(DocumentId::new(), input) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let stored = match services.quizzes().insert_quiz(quiz).await {
        Ok(q) => q,
        Err(e) => return errors::store_error_to_response(e),
    };

    tracing::info!(quizid = %stored.quizid, course_id = %stored.course_id, "quiz created");
    (StatusCode::CREATED, Json(stored)).into_response()
}

pub async fn list_quizzes_for_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
) -> axum::response::Response {
    match services.quizzes().list_quizzes_for_course(&course_id).await {
        Ok(quizzes) => Json(quizzes).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_quiz(
    Extension(services): Extension<Arc<AppServices>>,
    Path(quizid): Path<String>,
) -> axum::response::Response {
    match services.quizzes().find_quiz(&quizid).await {
        Ok(Some(quiz)) => Json(quiz).into_response(),
        Ok(None) => quiz_not_found(&quizid),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_quiz(
    Extension(services): Extension<Arc<AppServices>>,
    Path(quizid): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let patch = match QuizInput::from_json(body) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.quizzes().update_quiz(&quizid, patch).await {
        Ok(Some(quiz)) => {
            tracing::info!(quizid = %quizid, "quiz updated");
            Json(quiz).into_response()
        }
        Ok(None) => quiz_not_found(&quizid),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_quiz(
    Extension(services): Extension<Arc<AppServices>>,
    Path(quizid): Path<String>,
) -> axum::response::Response {
    match services.quizzes().delete_quiz(&quizid).await {
        Ok(Some(_)) => {
            tracing::info!(quizid = %quizid, "quiz deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(None) => quiz_not_found(&quizid),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn check_answer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(quizid): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> axum::response::Response {
    let query = CheckAnswerQuery::from_pairs(&pairs);

    let quiz = match services.quizzes().find_quiz(&quizid).await {
        Ok(Some(q)) => q,
        Ok(None) => return quiz_not_found(&quizid),
        Err(e) => return errors::store_error_to_response(e),
    };

    let question = match query.question_id.as_deref().and_then(|id| quiz.question(id)) {
        Some(q) => q,
        None => {
            tracing::info!(quizid = %quizid, question_id = ?query.question_id, "question not found");
            return errors::domain_error_to_response(DomainError::not_found("Question"));
        }
    };

    let verdict = question.check(query.answer.as_deref());
    Json(MessageResponse {
        message: verdict.message(),
    })
    .into_response()
}

fn quiz_not_found(quizid: &str) -> axum::response::Response {
    tracing::info!(quizid = %quizid, "quiz not found");
    errors::domain_error_to_response(DomainError::not_found("Quiz"))
}
