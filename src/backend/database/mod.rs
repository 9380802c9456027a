//! Database layer for the academic store.
//!
//! One typed relational schema (subjects, teachers, teacher_subjects join
//! table, courses) implemented for two engines behind the backend traits:
//!
//! ```text
//! backend::{SubjectBackend, TeacherBackend, CourseBackend}
//!     ├── postgres/ (sqlx PgPool, $n placeholders)
//!     └── sqlite/   (sqlx SqlitePool, ?n placeholders)
//! ```
//!
//! UNIQUE constraints on subject name/code, teacher email and course code are
//! the final arbiter for racing writers; violations are translated to the
//! same conflict responses the domain validator produces.

pub mod config;
pub mod postgres;
pub mod sqlite;


pub use config::DatabaseBackendConfig;

use crate::error::AppError;

/// Map an engine error to an AppError, translating unique-constraint
/// violations into the conflict messages the validator uses for the same
/// condition (duplicate code/email caught at persistence instead of read).
pub fn map_database_error(error: sqlx::Error, context: &str) -> AppError {
    let error_str = error.to_string();
    if error_str.contains("UNIQUE constraint") || error_str.contains("duplicate key") {
        // Match the assignment table before "subjects": its name contains that substring.
        if error_str.contains("email") {
            AppError::Conflict("Teacher with this email already exists".to_string())
        } else if error_str.contains("teacher_subjects") {
            AppError::Conflict("Subject already assigned to this teacher".to_string())
        } else if error_str.contains("subjects_name") || error_str.contains("subjects.name") {
            AppError::Conflict("Subject with this name already exists".to_string())
        } else if error_str.contains("subjects") {
            AppError::Conflict("Subject with this code already exists".to_string())
        } else if error_str.contains("courses") {
            AppError::Conflict("Course with this code already exists".to_string())
        } else {
            AppError::Conflict("Record already exists".to_string())
        }
    } else {
        AppError::Database(format!("{}: {}", context, error_str))
    }
}
