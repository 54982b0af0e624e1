use std::sync::Arc;

use eduplatform_infra::AppConfig;
use eduplatform_infra::store::{
    CourseStore, InMemoryDocumentStore, PostgresDocumentStore, QuizStore, StoreError,
};

/// Shared, read-only handles used by every handler.
///
/// Built once at startup; handlers receive it through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    courses: Arc<dyn CourseStore>,
    quizzes: Arc<dyn QuizStore>,
}

impl AppServices {
    pub fn new(courses: Arc<dyn CourseStore>, quizzes: Arc<dyn QuizStore>) -> Self {
        Self { courses, quizzes }
    }

    /// In-memory wiring (dev/test): one store serves both collections.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        Self::new(store.clone(), store)
    }

    pub fn courses(&self) -> &dyn CourseStore {
        self.courses.as_ref()
    }

    pub fn quizzes(&self) -> &dyn QuizStore {
        self.quizzes.as_ref()
    }
}

/// Pick the store backend from configuration.
///
/// With `DATABASE_URL` set, connects to Postgres and ensures the schema;
/// otherwise falls back to the in-memory store.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = Arc::new(PostgresDocumentStore::connect(url).await?);
            store.ensure_schema().await?;
            tracing::info!("using postgres document store");
            Ok(AppServices::new(store.clone(), store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory document store");
            Ok(AppServices::in_memory())
        }
    }
}
