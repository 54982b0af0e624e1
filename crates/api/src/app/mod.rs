//! HTTP API application wiring (Axum router + service wiring).
//!
//! The folder is structured like:
//! - `services.rs`: document store wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response shapes that are not documents themselves
//! - `errors.rs`: consistent `{"error": ...}` responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// The store handle is created once by the caller and shared by every handler.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(services)),
        )
}
