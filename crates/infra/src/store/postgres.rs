//! Postgres-backed document store.
//!
//! Each collection is a table holding the full document as JSONB next to the
//! columns that need indexing. Uniqueness is enforced by the database:
//!
//! | Constraint | Guards |
//! |------------|--------|
//! | `courses_course_id_key` | `Course.courseId` |
//! | `course_chapters_pkey` | chapter ids across all courses |
//! | `quizzes_quizid_key` | `Quiz.quizid` |
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` (index chosen by constraint name) |
//! | Database (other) | Any other | `Backend` |
//! | ColumnDecode | N/A | `Corrupt` |
//! | PoolClosed / network / other | N/A | `Backend` |

use std::collections::BTreeSet;
use std::sync::Arc;

use sqlx::postgres::{PgDatabaseError, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use eduplatform_core::{Course, CourseInput, Document, Quiz, QuizInput};

use super::r#trait::{CHAPTER_ID_INDEX, CourseStore, QuizStore, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id UUID PRIMARY KEY,
        course_id TEXT NOT NULL,
        doc JSONB NOT NULL,
        CONSTRAINT courses_course_id_key UNIQUE (course_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_chapters (
        chapter_id TEXT NOT NULL,
        course_pk UUID NOT NULL REFERENCES courses (id) ON DELETE CASCADE,
        CONSTRAINT course_chapters_pkey PRIMARY KEY (chapter_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quizzes (
        id UUID PRIMARY KEY,
        quizid TEXT NOT NULL,
        course_id TEXT NOT NULL,
        doc JSONB NOT NULL,
        CONSTRAINT quizzes_quizid_key UNIQUE (quizid)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS quizzes_course_id_idx ON quizzes (course_id)",
];

/// Postgres-backed implementation of [`CourseStore`] and [`QuizStore`].
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`; the store is shared
/// behind an `Arc` for the life of the process.
///
/// ## Atomicity
///
/// Writes touching more than one row (a course and its chapter-id rows) and
/// read-modify-write updates run in a single transaction with `FOR UPDATE`.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables, constraints and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        tracing::info!("document store schema ready");
        Ok(())
    }

    async fn begin(&self, operation: &str) -> StoreResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

/// Replace the chapter-id index rows owned by `course`.
async fn sync_chapter_ids(
    tx: &mut Transaction<'static, Postgres>,
    course: &Course,
    operation: &str,
) -> StoreResult<()> {
    sqlx::query("DELETE FROM course_chapters WHERE course_pk = $1")
        .bind(course.id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;

    // Repeats inside one course are tolerated; only cross-course clashes conflict.
    let chapter_ids: Vec<String> = course
        .chapter_ids()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    if chapter_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO course_chapters (chapter_id, course_pk)
        SELECT unnest($1::text[]), $2
        "#,
    )
    .bind(&chapter_ids)
    .bind(course.id.as_uuid())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error(operation, e))?;
    Ok(())
}

async fn commit(tx: Transaction<'static, Postgres>, operation: &str) -> StoreResult<()> {
    tx.commit().await.map_err(|e| map_sqlx_error(operation, e))
}

#[async_trait::async_trait]
impl CourseStore for PostgresDocumentStore {
    #[instrument(skip(self, course), fields(course_id = %course.course_id, id = %course.id), err)]
    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let mut tx = self.begin("insert_course").await?;

        sqlx::query("INSERT INTO courses (id, course_id, doc) VALUES ($1, $2, $3)")
            .bind(course.id.as_uuid())
            .bind(&course.course_id)
            .bind(Json(&course))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_course", e))?;

        sync_chapter_ids(&mut tx, &course, "insert_course").await?;
        commit(tx, "insert_course").await?;
        Ok(course)
    }

    #[instrument(skip(self), err)]
    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let rows: Vec<(Json<Course>,)> = sqlx::query_as("SELECT doc FROM courses ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_courses", e))?;
        Ok(rows.into_iter().map(|(Json(course),)| course).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        let row: Option<(Json<Course>,)> = sqlx::query_as("SELECT doc FROM courses WHERE course_id = $1")
            .bind(course_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_course", e))?;
        Ok(row.map(|(Json(course),)| course))
    }

    #[instrument(skip(self, patch), err)]
    async fn update_course(&self, course_id: &str, patch: CourseInput) -> StoreResult<Option<Course>> {
        let mut tx = self.begin("update_course").await?;

        let row: Option<(Json<Course>,)> =
            sqlx::query_as("SELECT doc FROM courses WHERE course_id = $1 FOR UPDATE")
                .bind(course_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_course", e))?;
        let Some((Json(mut course),)) = row else {
            return Ok(None);
        };

        let chapters_changed = patch.chapters.is_some();
        course.apply(patch)?;

        sqlx::query("UPDATE courses SET course_id = $2, doc = $3 WHERE id = $1")
            .bind(course.id.as_uuid())
            .bind(&course.course_id)
            .bind(Json(&course))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_course", e))?;

        if chapters_changed {
            sync_chapter_ids(&mut tx, &course, "update_course").await?;
        }
        commit(tx, "update_course").await?;
        Ok(Some(course))
    }

    #[instrument(skip(self), err)]
    async fn delete_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        let row: Option<(Json<Course>,)> =
            sqlx::query_as("DELETE FROM courses WHERE course_id = $1 RETURNING doc")
                .bind(course_id)
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete_course", e))?;
        Ok(row.map(|(Json(course),)| course))
    }
}

#[async_trait::async_trait]
impl QuizStore for PostgresDocumentStore {
    #[instrument(skip(self, quiz), fields(quizid = %quiz.quizid, course_id = %quiz.course_id), err)]
    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<Quiz> {
        sqlx::query("INSERT INTO quizzes (id, quizid, course_id, doc) VALUES ($1, $2, $3, $4)")
            .bind(quiz.id.as_uuid())
            .bind(&quiz.quizid)
            .bind(&quiz.course_id)
            .bind(Json(&quiz))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_quiz", e))?;
        Ok(quiz)
    }

    #[instrument(skip(self), err)]
    async fn list_quizzes_for_course(&self, course_id: &str) -> StoreResult<Vec<Quiz>> {
        let rows: Vec<(Json<Quiz>,)> =
            sqlx::query_as("SELECT doc FROM quizzes WHERE course_id = $1 ORDER BY id")
                .bind(course_id)
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_quizzes_for_course", e))?;
        Ok(rows.into_iter().map(|(Json(quiz),)| quiz).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_quiz(&self, quizid: &str) -> StoreResult<Option<Quiz>> {
        let row: Option<(Json<Quiz>,)> = sqlx::query_as("SELECT doc FROM quizzes WHERE quizid = $1")
            .bind(quizid)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_quiz", e))?;
        Ok(row.map(|(Json(quiz),)| quiz))
    }

    #[instrument(skip(self, patch), err)]
    async fn update_quiz(&self, quizid: &str, patch: QuizInput) -> StoreResult<Option<Quiz>> {
        let mut tx = self.begin("update_quiz").await?;

        let row: Option<(Json<Quiz>,)> =
            sqlx::query_as("SELECT doc FROM quizzes WHERE quizid = $1 FOR UPDATE")
                .bind(quizid)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_quiz", e))?;
        let Some((Json(mut quiz),)) = row else {
            return Ok(None);
        };

        quiz.apply(patch)?;

        sqlx::query("UPDATE quizzes SET quizid = $2, course_id = $3, doc = $4 WHERE id = $1")
            .bind(quiz.id.as_uuid())
            .bind(&quiz.quizid)
            .bind(&quiz.course_id)
            .bind(Json(&quiz))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_quiz", e))?;

        commit(tx, "update_quiz").await?;
        Ok(Some(quiz))
    }

    #[instrument(skip(self), err)]
    async fn delete_quiz(&self, quizid: &str) -> StoreResult<Option<Quiz>> {
        let row: Option<(Json<Quiz>,)> =
            sqlx::query_as("DELETE FROM quizzes WHERE quizid = $1 RETURNING doc")
                .bind(quizid)
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete_quiz", e))?;
        Ok(row.map(|(Json(quiz),)| quiz))
    }
}

/// Map SQLx errors to `StoreError` (see the module-level table).
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let detail = db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(|pg| pg.detail())
                    .unwrap_or_default();
                if let Some(dup) = duplicate_from_constraint(db_err.constraint(), detail) {
                    return dup;
                }
            }
            StoreError::backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::backend(format!("connection pool closed in {}", operation)),
        sqlx::Error::ColumnDecode { source, .. } => StoreError::Corrupt {
            collection: collection_for(operation),
            message: source.to_string(),
        },
        _ => StoreError::backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn collection_for(operation: &str) -> &'static str {
    if operation.contains("quiz") {
        Quiz::COLLECTION
    } else {
        Course::COLLECTION
    }
}

/// Build a `Duplicate` error from a unique-violation's constraint name and detail.
///
/// Postgres reports the offending value as `Key (column)=(value) already exists.`
fn duplicate_from_constraint(constraint: Option<&str>, detail: &str) -> Option<StoreError> {
    let value = detail
        .split_once(")=(")
        .and_then(|(_, rest)| rest.rsplit_once(") already exists"))
        .map(|(value, _)| value.to_string())
        .unwrap_or_default();

    match constraint? {
        "courses_course_id_key" => Some(StoreError::duplicate_key::<Course>(value)),
        "course_chapters_pkey" => Some(StoreError::duplicate_chapter(value)),
        "quizzes_quizid_key" => Some(StoreError::duplicate_key::<Quiz>(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_id_conflict_maps_to_course_key_index() {
        let err = duplicate_from_constraint(
            Some("courses_course_id_key"),
            "Key (course_id)=(rust-101) already exists.",
        )
        .unwrap();
        assert_eq!(
            err.to_string(),
            "duplicate key error collection: courses index: courseId_1 dup key: { courseId: \"rust-101\" }"
        );
    }

    #[test]
    fn chapter_conflict_maps_to_chapter_index() {
        let err = duplicate_from_constraint(
            Some("course_chapters_pkey"),
            "Key (chapter_id)=(ch-1) already exists.",
        )
        .unwrap();
        match err {
            StoreError::Duplicate { index, value, .. } => {
                assert_eq!(index, CHAPTER_ID_INDEX);
                assert_eq!(value, "ch-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn quizid_conflict_keeps_values_with_parentheses() {
        let err = duplicate_from_constraint(
            Some("quizzes_quizid_key"),
            "Key (quizid)=(quiz (final)) already exists.",
        )
        .unwrap();
        assert!(err.to_string().contains("quizid: \"quiz (final)\""));
    }

    #[test]
    fn unknown_constraints_are_not_duplicates() {
        assert!(duplicate_from_constraint(Some("other_key"), "").is_none());
        assert!(duplicate_from_constraint(None, "").is_none());
    }

    #[test]
    fn operations_map_to_collections() {
        assert_eq!(collection_for("find_quiz"), "quizzes");
        assert_eq!(collection_for("list_courses"), "courses");
    }
}
