use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::AcademicRepo;
use crate::error::AppResult;
use crate::models::{
    Course, CourseFilter, CourseUpdate, Subject, SubjectUpdate, Teacher, TeacherUpdate,
};

pub mod database;

/// Supported database backend types
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

/// Core backend abstraction for the academic store.
///
/// Each backend implementation (PostgreSQL, SQLite) implements this trait
/// plus the per-entity traits below.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &database::DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;

    /// Clean up resources when the backend is no longer needed
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Subject CRUD operations. Deletion is logical: `deactivate_subject` flips
/// the active flag and never removes the row.
#[async_trait]
pub trait SubjectBackend: Backend {
    async fn create_subject(&self, subject: &Subject) -> AppResult<Subject>;

    async fn find_subject_by_id(&self, id: &str) -> AppResult<Option<Subject>>;

    /// Find a subject by code (case-insensitive; codes are stored uppercase)
    async fn find_subject_by_code(&self, code: &str) -> AppResult<Option<Subject>>;

    async fn find_subject_by_name(&self, name: &str) -> AppResult<Option<Subject>>;

    async fn find_all_subjects(&self, active_only: bool) -> AppResult<Vec<Subject>>;

    /// Apply a partial update; returns the updated record or None when absent
    async fn update_subject(&self, id: &str, update: &SubjectUpdate)
        -> AppResult<Option<Subject>>;

    async fn deactivate_subject(&self, id: &str) -> AppResult<Option<Subject>>;
}

/// Teacher CRUD operations, including the qualified-subjects set.
#[async_trait]
pub trait TeacherBackend: Backend {
    async fn create_teacher(&self, teacher: &Teacher) -> AppResult<Teacher>;

    async fn find_teacher_by_id(&self, id: &str) -> AppResult<Option<Teacher>>;

    /// Find a teacher by email (case-insensitive; emails are stored lowercase)
    async fn find_teacher_by_email(&self, email: &str) -> AppResult<Option<Teacher>>;

    async fn find_all_teachers(&self, active_only: bool) -> AppResult<Vec<Teacher>>;

    async fn update_teacher(&self, id: &str, update: &TeacherUpdate)
        -> AppResult<Option<Teacher>>;

    async fn deactivate_teacher(&self, id: &str) -> AppResult<Option<Teacher>>;
}

/// Course CRUD operations with relation-scoped listing.
#[async_trait]
pub trait CourseBackend: Backend {
    async fn create_course(&self, course: &Course) -> AppResult<Course>;

    async fn find_course_by_id(&self, id: &str) -> AppResult<Option<Course>>;

    async fn find_course_by_code(&self, code: &str) -> AppResult<Option<Course>>;

    async fn find_courses(&self, filter: &CourseFilter) -> AppResult<Vec<Course>>;

    async fn update_course(&self, id: &str, update: &CourseUpdate) -> AppResult<Option<Course>>;

    async fn deactivate_course(&self, id: &str) -> AppResult<Option<Course>>;
}

/// Combined backend interface for all three entity kinds.
pub trait AcademicBackend: SubjectBackend + TeacherBackend + CourseBackend {}

/// Automatic implementation for any type that implements all three traits
impl<T> AcademicBackend for T where T: SubjectBackend + TeacherBackend + CourseBackend {}

/// Any backend doubles as the domain validator's read-only repository.
#[async_trait]
impl<B: AcademicBackend + ?Sized> AcademicRepo for B {
    async fn teacher_by_id(&self, id: &str) -> AppResult<Option<Teacher>> {
        self.find_teacher_by_id(id).await
    }

    async fn subject_by_id(&self, id: &str) -> AppResult<Option<Subject>> {
        self.find_subject_by_id(id).await
    }

    async fn course_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        self.find_course_by_id(id).await
    }

    async fn teacher_by_email(&self, email: &str) -> AppResult<Option<Teacher>> {
        self.find_teacher_by_email(email).await
    }

    async fn subject_by_code(&self, code: &str) -> AppResult<Option<Subject>> {
        self.find_subject_by_code(code).await
    }

    async fn course_by_code(&self, code: &str) -> AppResult<Option<Course>> {
        self.find_course_by_code(code).await
    }
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(
        config: &database::DatabaseBackendConfig,
    ) -> AppResult<Arc<dyn AcademicBackend>> {
        let backend = Self::create_backend(config).await?;
        Ok(Arc::from(backend))
    }

    /// Create a backend based on configuration (returns Box)
    pub async fn create_backend(
        config: &database::DatabaseBackendConfig,
    ) -> AppResult<Box<dyn AcademicBackend>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let backend = database::postgres::PostgresBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
            DatabaseType::SQLite => {
                let backend = database::sqlite::SqliteBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
