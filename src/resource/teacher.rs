use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::subject::ListParams;
use super::{ApiResult, AppState};
use crate::domain::{AssignmentValidator, DomainError};
use crate::models::{CreateTeacher, Teacher, TeacherUpdate};

/// Map a qualified-subjects validation failure the way the API reports it:
/// a 400 naming the offending list, 500 only for store faults.
fn subject_set_error(error: DomainError) -> (StatusCode, Json<Value>) {
    match error {
        DomainError::Infrastructure(e) => e.to_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "One or more subject IDs are invalid"})),
        ),
    }
}

pub async fn create_teacher(
    State((backend, _config)): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let command: CreateTeacher = match serde_json::from_value(payload) {
        Ok(command) => command,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("Invalid teacher data: {}", e)})),
            ))
        }
    };
    if let Err(e) = command.validate() {
        return Err(e.to_response());
    }

    let validator = AssignmentValidator::new(backend.as_ref());
    let email = validator
        .validate_unique_email(&command.email, None)
        .await
        .map_err(|e| e.to_response())?;

    if !command.subjects.is_empty() {
        if let Err(e) = validator.validate_subject_set(&command.subjects).await {
            return Err(subject_set_error(e));
        }
    }

    let teacher = Teacher::new(
        command.name,
        email,
        command.department,
        command.subjects,
        command.qualification,
        command.experience.unwrap_or(0),
    );
    match backend.create_teacher(&teacher).await {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(json!({"message": "Teacher created successfully", "teacher": created})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn list_teachers(
    State((backend, _config)): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    match backend
        .find_all_teachers(params.active_only.unwrap_or(false))
        .await
    {
        Ok(teachers) => Ok((
            StatusCode::OK,
            Json(json!({"count": teachers.len(), "teachers": teachers})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn get_teacher(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    match backend.find_teacher_by_id(&id).await {
        Ok(Some(teacher)) => Ok((StatusCode::OK, Json(json!({ "teacher": teacher })))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Teacher not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn update_teacher(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let mut update: TeacherUpdate = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("Invalid teacher data: {}", e)})),
            ))
        }
    };
    if let Err(e) = update.validate() {
        return Err(e.to_response());
    }

    let validator = AssignmentValidator::new(backend.as_ref());
    if let Some(email) = &update.email {
        let normalized = validator
            .validate_unique_email(email, Some(&id))
            .await
            .map_err(|e| e.to_response())?;
        update.email = Some(normalized);
    }
    if let Some(subjects) = &update.subjects {
        if let Err(e) = validator.validate_subject_set(subjects).await {
            return Err(subject_set_error(e));
        }
    }

    match backend.update_teacher(&id, &update).await {
        Ok(Some(teacher)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Teacher updated successfully", "teacher": teacher})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Teacher not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn delete_teacher(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    match backend.deactivate_teacher(&id).await {
        Ok(Some(teacher)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Teacher deactivated successfully", "teacher": teacher})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Teacher not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

/// Add one subject to a teacher's qualified set.
///
/// The validator resolves both records, rejects duplicates and returns the
/// appended set; persistence happens here through the regular update path.
pub async fn assign_subject(
    State((backend, _config)): State<AppState>,
    Path((teacher_id, subject_id)): Path<(String, String)>,
) -> ApiResult {
    let validator = AssignmentValidator::new(backend.as_ref());
    let subjects = validator
        .assign_subject_to_teacher(&teacher_id, &subject_id)
        .await
        .map_err(|e| e.to_response())?;

    let update = TeacherUpdate {
        subjects: Some(subjects),
        ..Default::default()
    };
    match backend.update_teacher(&teacher_id, &update).await {
        Ok(Some(teacher)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Subject added to teacher successfully", "teacher": teacher})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Teacher not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}
