use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
};

use crate::app::errors;

pub async fn index() -> impl IntoResponse {
    Html(
        "<h1>Welcome to the Educational Platform API</h1>\n\
         <p>Manage courses under <code>/api/courses</code> and quizzes under <code>/api/quizzes</code>.</p>\n",
    )
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> axum::response::Response {
    tracing::info!(path = %uri.path(), "no route matched");
    errors::json_error(StatusCode::NOT_FOUND, format!("Not Found - {}", uri.path()))
}
