use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use eduplatform_core::{Course, CourseInput, DocumentId, DomainError};

use crate::app::errors;
use crate::app::routes::quizzes;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_course).get(list_courses))
        .route("/:id", get(get_course).put(update_course).delete(delete_course))
        .route(
            "/:id/quizzes",
            post(quizzes::create_quiz).get(quizzes::list_quizzes_for_course),
        )
}

pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let course = match CourseInput::from_json(body).and_then(|input| Course::create(DocumentId::new(), input)) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let stored = match services.courses().insert_course(course).await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    tracing::info!(course_id = %stored.course_id, "course created");
    (StatusCode::CREATED, Json(stored)).into_response()
}

pub async fn list_courses(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.courses().list_courses().await {
        Ok(courses) => Json(courses).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
) -> axum::response::Response {
    match services.courses().find_course(&course_id).await {
        Ok(Some(course)) => Json(course).into_response(),
        Ok(None) => course_not_found(&course_id),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let patch = match CourseInput::from_json(body) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.courses().update_course(&course_id, patch).await {
        Ok(Some(course)) => {
            tracing::info!(course_id = %course_id, "course updated");
            Json(course).into_response()
        }
        Ok(None) => course_not_found(&course_id),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
) -> axum::response::Response {
    match services.courses().delete_course(&course_id).await {
        Ok(Some(_)) => {
            tracing::info!(course_id = %course_id, "course deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(None) => course_not_found(&course_id),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn course_not_found(course_id: &str) -> axum::response::Response {
    tracing::info!(course_id = %course_id, "course not found");
    errors::domain_error_to_response(DomainError::not_found("Course"))
}
