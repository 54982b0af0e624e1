use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use eduplatform_core::DomainError;
use eduplatform_infra::store::StoreError;

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, err.to_string()),
        DomainError::InvariantViolation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::Validation(msg) => {
            tracing::error!(error = %msg, "request failed validation");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        other => {
            tracing::error!(error = %other, "document store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}
