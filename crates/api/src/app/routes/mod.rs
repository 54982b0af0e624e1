use axum::Router;

pub mod courses;
pub mod quizzes;
pub mod system;

/// Router for the `/api` resources.
pub fn router() -> Router {
    Router::new()
        .nest("/api/courses", courses::router())
        .nest("/api/quizzes", quizzes::router())
}
