use axum::{http::StatusCode, Json};
use serde_json::json;
use std::fmt;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Subject,
    Teacher,
    Course,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Subject => "Subject",
            EntityKind::Teacher => "Teacher",
            EntityKind::Course => "Course",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected rule violations plus the one unexpected case (a store fault).
///
/// The first six are domain outcomes: deterministic, never retried, reported
/// to the client with a 4xx status. `Infrastructure` wraps store errors so
/// repository calls inside the validator can use `?`.
#[derive(Debug)]
pub enum DomainError {
    NotFound { kind: EntityKind, id: String },
    Inactive { kind: EntityKind, id: String },
    UnqualifiedTeacher { teacher_id: String, subject_id: String },
    DuplicateCode { kind: EntityKind, code: String },
    DuplicateEmail { email: String },
    AlreadyAssigned { teacher_id: String, subject_id: String },
    Infrastructure(AppError),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound { kind, .. } => write!(f, "{} not found", kind),
            DomainError::Inactive { kind, .. } => write!(f, "{} is inactive", kind),
            DomainError::UnqualifiedTeacher { .. } => {
                write!(f, "Teacher is not qualified to teach this subject")
            }
            DomainError::DuplicateCode { kind, .. } => {
                write!(f, "{} with this code already exists", kind)
            }
            DomainError::DuplicateEmail { .. } => {
                write!(f, "Teacher with this email already exists")
            }
            DomainError::AlreadyAssigned { .. } => {
                write!(f, "Subject already assigned to this teacher")
            }
            DomainError::Infrastructure(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DomainError::Infrastructure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AppError> for DomainError {
    fn from(err: AppError) -> Self {
        DomainError::Infrastructure(err)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Inactive { .. }
            | DomainError::UnqualifiedTeacher { .. }
            | DomainError::AlreadyAssigned { .. } => StatusCode::BAD_REQUEST,
            DomainError::DuplicateCode { .. } | DomainError::DuplicateEmail { .. } => {
                StatusCode::CONFLICT
            }
            DomainError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> (StatusCode, Json<serde_json::Value>) {
        if let DomainError::Infrastructure(e) = self {
            return e.to_response();
        }
        (self.status_code(), Json(json!({ "message": self.to_string() })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let not_found = DomainError::NotFound {
            kind: EntityKind::Teacher,
            id: "t1".to_string(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let inactive = DomainError::Inactive {
            kind: EntityKind::Subject,
            id: "s1".to_string(),
        };
        assert_eq!(inactive.status_code(), StatusCode::BAD_REQUEST);

        let duplicate = DomainError::DuplicateCode {
            kind: EntityKind::Course,
            code: "CS101".to_string(),
        };
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        let assigned = DomainError::AlreadyAssigned {
            teacher_id: "t1".to_string(),
            subject_id: "s1".to_string(),
        };
        assert_eq!(assigned.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn messages_name_the_entity_kind() {
        let err = DomainError::NotFound {
            kind: EntityKind::Subject,
            id: "s1".to_string(),
        };
        assert_eq!(err.to_string(), "Subject not found");

        let err = DomainError::DuplicateCode {
            kind: EntityKind::Course,
            code: "CS101".to_string(),
        };
        assert_eq!(err.to_string(), "Course with this code already exists");
    }
}
