use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Course, Subject, Teacher};

/// The read surface the domain rules need from a store.
///
/// Lookups by unique key take already-normalized values (codes uppercase,
/// emails lowercase); implementations may additionally compare
/// case-insensitively, matching the database UNIQUE semantics.
#[async_trait]
pub trait AcademicRepo: Send + Sync {
    async fn teacher_by_id(&self, id: &str) -> AppResult<Option<Teacher>>;
    async fn subject_by_id(&self, id: &str) -> AppResult<Option<Subject>>;
    async fn course_by_id(&self, id: &str) -> AppResult<Option<Course>>;

    async fn teacher_by_email(&self, email: &str) -> AppResult<Option<Teacher>>;
    async fn subject_by_code(&self, code: &str) -> AppResult<Option<Subject>>;
    async fn course_by_code(&self, code: &str) -> AppResult<Option<Course>>;
}
