use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use eduplatform_core::{Course, CourseInput, Document, DocumentId, Quiz, QuizInput};

use super::r#trait::{CourseStore, QuizStore, StoreError, StoreResult};

/// In-memory document store.
///
/// Intended for tests/dev. Each collection is a `Vec` behind its own lock, so
/// native order is insertion order. Uniqueness checks and the write they guard
/// happen under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    courses: RwLock<Vec<Course>>,
    quizzes: RwLock<Vec<Quiz>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<D: Document>(lock: &RwLock<Vec<D>>) -> StoreResult<RwLockReadGuard<'_, Vec<D>>> {
    lock.read()
        .map_err(|_| StoreError::backend(format!("{} lock poisoned", D::COLLECTION)))
}

fn write<D: Document>(lock: &RwLock<Vec<D>>) -> StoreResult<RwLockWriteGuard<'_, Vec<D>>> {
    lock.write()
        .map_err(|_| StoreError::backend(format!("{} lock poisoned", D::COLLECTION)))
}

fn position<D: Document>(docs: &[D], key: &str) -> Option<usize> {
    docs.iter().position(|d| d.key() == key)
}

/// Fail if another document (other than `owner`) already uses `key`.
fn ensure_key_free<D: Document>(docs: &[D], key: &str, owner: DocumentId) -> StoreResult<()> {
    if docs.iter().any(|d| d.key() == key && d.document_id() != owner) {
        return Err(StoreError::duplicate_key::<D>(key));
    }
    Ok(())
}

/// Chapter ids are indexed collection-wide; repeats inside `course` itself are tolerated.
fn ensure_chapters_free(courses: &[Course], course: &Course) -> StoreResult<()> {
    for chapter_id in course.chapter_ids() {
        let taken = courses
            .iter()
            .filter(|other| other.id != course.id)
            .any(|other| other.chapter_ids().any(|id| id == chapter_id));
        if taken {
            return Err(StoreError::duplicate_chapter(chapter_id));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl CourseStore for InMemoryDocumentStore {
    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let mut courses = write(&self.courses)?;
        ensure_key_free(&courses, &course.course_id, course.id)?;
        ensure_chapters_free(&courses, &course)?;
        courses.push(course.clone());
        Ok(course)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(read(&self.courses)?.clone())
    }

    async fn find_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        let courses = read(&self.courses)?;
        Ok(position(&courses, course_id).map(|idx| courses[idx].clone()))
    }

    async fn update_course(&self, course_id: &str, patch: CourseInput) -> StoreResult<Option<Course>> {
        let mut courses = write(&self.courses)?;
        let Some(idx) = position(&courses, course_id) else {
            return Ok(None);
        };

        let mut updated = courses[idx].clone();
        updated.apply(patch)?;
        ensure_key_free(&courses, &updated.course_id, updated.id)?;
        ensure_chapters_free(&courses, &updated)?;

        courses[idx] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        let mut courses = write(&self.courses)?;
        Ok(position(&courses, course_id).map(|idx| courses.remove(idx)))
    }
}

#[async_trait::async_trait]
impl QuizStore for InMemoryDocumentStore {
    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<Quiz> {
        let mut quizzes = write(&self.quizzes)?;
        ensure_key_free(&quizzes, &quiz.quizid, quiz.id)?;
        quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn list_quizzes_for_course(&self, course_id: &str) -> StoreResult<Vec<Quiz>> {
        let quizzes = read(&self.quizzes)?;
        Ok(quizzes
            .iter()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn find_quiz(&self, quizid: &str) -> StoreResult<Option<Quiz>> {
        let quizzes = read(&self.quizzes)?;
        Ok(position(&quizzes, quizid).map(|idx| quizzes[idx].clone()))
    }

    async fn update_quiz(&self, quizid: &str, patch: QuizInput) -> StoreResult<Option<Quiz>> {
        let mut quizzes = write(&self.quizzes)?;
        let Some(idx) = position(&quizzes, quizid) else {
            return Ok(None);
        };

        let mut updated = quizzes[idx].clone();
        updated.apply(patch)?;
        ensure_key_free(&quizzes, &updated.quizid, updated.id)?;

        quizzes[idx] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_quiz(&self, quizid: &str) -> StoreResult<Option<Quiz>> {
        let mut quizzes = write(&self.quizzes)?;
        Ok(position(&quizzes, quizid).map(|idx| quizzes.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(course_id: &str, chapter_ids: &[&str]) -> Course {
        let chapters: Vec<_> = chapter_ids
            .iter()
            .map(|id| json!({ "id": id, "title": "t", "duration": 1 }))
            .collect();
        let input = CourseInput::from_json(json!({
            "courseId": course_id,
            "category": "c",
            "chapters": chapters,
            "duration": 1,
            "instructorName": "i",
            "language": "en",
            "level": "l",
            "price": 0,
            "status": "s",
            "visibility": "v"
        }))
        .unwrap();
        Course::create(DocumentId::new(), input).unwrap()
    }

    fn quiz(quizid: &str, course_id: &str) -> Quiz {
        let input = QuizInput::from_json(json!({
            "quizid": quizid,
            "courseId": course_id,
            "questions": [
                { "id": "q1", "question": "?", "options": ["a", "b"], "correctAnswer": "a" }
            ]
        }))
        .unwrap();
        Quiz::create(DocumentId::new(), input).unwrap()
    }

    #[tokio::test]
    async fn insert_then_find_by_course_id() {
        let store = InMemoryDocumentStore::new();
        let created = store.insert_course(course("c1", &["ch-1"])).await.unwrap();

        let found = store.find_course("c1").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_course("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_course_id_is_rejected() {
        let store = InMemoryDocumentStore::new();
        store.insert_course(course("c1", &[])).await.unwrap();

        let err = store.insert_course(course("c1", &[])).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "courseId", .. }));
        assert_eq!(store.list_courses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn chapter_ids_are_unique_across_courses() {
        let store = InMemoryDocumentStore::new();
        store.insert_course(course("c1", &["ch-1"])).await.unwrap();

        let err = store.insert_course(course("c2", &["ch-1"])).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "chapters.id", .. }));

        // Repeats within one course are tolerated.
        store.insert_course(course("c3", &["ch-2", "ch-2"])).await.unwrap();
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = InMemoryDocumentStore::new();
        for id in ["b", "a", "c"] {
            store.insert_course(course(id, &[])).await.unwrap();
        }
        let ids: Vec<_> = store
            .list_courses()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.course_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn update_applies_patch_and_checks_keys() {
        let store = InMemoryDocumentStore::new();
        store.insert_course(course("c1", &["ch-1"])).await.unwrap();
        store.insert_course(course("c2", &["ch-2"])).await.unwrap();

        let patch = CourseInput::from_json(json!({ "level": "advanced" })).unwrap();
        let updated = store.update_course("c1", patch).await.unwrap().unwrap();
        assert_eq!(updated.level, "advanced");
        assert_eq!(store.find_course("c1").await.unwrap().unwrap().level, "advanced");

        let rename = CourseInput::from_json(json!({ "courseId": "c2" })).unwrap();
        let err = store.update_course("c1", rename).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let steal = CourseInput::from_json(json!({
            "chapters": [{ "id": "ch-2", "title": "t", "duration": 1 }]
        }))
        .unwrap();
        let err = store.update_course("c1", steal).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "chapters.id", .. }));

        let missing = CourseInput::default();
        assert!(store.update_course("nope", missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_can_keep_own_chapters() {
        let store = InMemoryDocumentStore::new();
        store.insert_course(course("c1", &["ch-1"])).await.unwrap();

        let same = CourseInput::from_json(json!({
            "chapters": [{ "id": "ch-1", "title": "renamed", "duration": 2 }]
        }))
        .unwrap();
        let updated = store.update_course("c1", same).await.unwrap().unwrap();
        assert_eq!(updated.chapters[0].title, "renamed");
    }

    #[tokio::test]
    async fn delete_removes_course_but_not_its_quizzes() {
        let store = InMemoryDocumentStore::new();
        store.insert_course(course("c1", &[])).await.unwrap();
        store.insert_quiz(quiz("z1", "c1")).await.unwrap();

        assert!(store.delete_course("c1").await.unwrap().is_some());
        assert!(store.delete_course("c1").await.unwrap().is_none());
        assert_eq!(store.list_quizzes_for_course("c1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn quizzes_are_filtered_by_course() {
        let store = InMemoryDocumentStore::new();
        store.insert_quiz(quiz("z1", "c1")).await.unwrap();
        store.insert_quiz(quiz("z2", "c2")).await.unwrap();
        store.insert_quiz(quiz("z3", "c1")).await.unwrap();

        let ids: Vec<_> = store
            .list_quizzes_for_course("c1")
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.quizid)
            .collect();
        assert_eq!(ids, vec!["z1", "z3"]);
        assert!(store.list_quizzes_for_course("c9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quiz_lifecycle() {
        let store = InMemoryDocumentStore::new();
        store.insert_quiz(quiz("z1", "c1")).await.unwrap();

        let err = store.insert_quiz(quiz("z1", "c1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "quizid", .. }));

        let patch = QuizInput::from_json(json!({ "courseId": "c2" })).unwrap();
        let updated = store.update_quiz("z1", patch).await.unwrap().unwrap();
        assert_eq!(updated.course_id, "c2");

        assert!(store.delete_quiz("z1").await.unwrap().is_some());
        assert!(store.find_quiz("z1").await.unwrap().is_none());
        assert!(store.delete_quiz("z1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_patch_is_reported_and_not_written() {
        let store = InMemoryDocumentStore::new();
        store.insert_quiz(quiz("z1", "c1")).await.unwrap();

        let patch = QuizInput::from_json(json!({ "questions": [{ "id": "x" }] })).unwrap();
        let err = store.update_quiz("z1", patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
        assert_eq!(store.find_quiz("z1").await.unwrap().unwrap().questions[0].id, "q1");
    }
}
