use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiResult, AppState};
use crate::domain::{AssignmentValidator, EntityKind};
use crate::models::{Course, CourseFilter, CourseUpdate, CreateCourse, DEFAULT_MAX_STUDENTS};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListParams {
    #[serde(default)]
    pub active_only: Option<bool>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub subject_id: Option<String>,
}

pub async fn create_course(
    State((backend, _config)): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let command: CreateCourse = match serde_json::from_value(payload) {
        Ok(command) => command,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("Invalid course data: {}", e)})),
            ))
        }
    };
    if let Err(e) = command.validate() {
        return Err(e.to_response());
    }

    let validator = AssignmentValidator::new(backend.as_ref());
    let code = validator
        .validate_unique_code(EntityKind::Course, &command.code, None)
        .await
        .map_err(|e| e.to_response())?;

    // Teacher must be active, subject must be active, and the teacher must be
    // qualified for the subject before the course exists.
    let resolved = validator
        .validate_course_assignment(&command.teacher, Some(&command.subject), None)
        .await
        .map_err(|e| e.to_response())?;

    let schedule = command.schedule.filter(|s| !s.is_empty());
    let course = Course::new(
        command.title,
        code,
        command.description,
        command.teacher,
        command.subject,
        schedule,
        command.max_students.unwrap_or(DEFAULT_MAX_STUDENTS),
    );
    match backend.create_course(&course).await {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "Course created successfully",
                "course": created,
                "teacher": resolved.teacher,
                "subject": resolved.subject,
            })),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn list_courses(
    State((backend, _config)): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> ApiResult {
    let filter = CourseFilter {
        active_only: params.active_only.unwrap_or(false),
        teacher_id: params.teacher_id,
        subject_id: params.subject_id,
    };

    match backend.find_courses(&filter).await {
        Ok(courses) => Ok((
            StatusCode::OK,
            Json(json!({"count": courses.len(), "courses": courses})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn get_course(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    match backend.find_course_by_id(&id).await {
        Ok(Some(course)) => Ok((StatusCode::OK, Json(json!({ "course": course })))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Course not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn update_course(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let mut update: CourseUpdate = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("Invalid course data: {}", e)})),
            ))
        }
    };
    if let Err(e) = update.validate() {
        return Err(e.to_response());
    }

    // The pre-update record anchors the validation: when the update omits the
    // teacher or subject, the stored linkage is what must stay consistent. A
    // missing course is a hard 404, never a silently skipped check.
    let current = match backend.find_course_by_id(&id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Course not found"})),
            ))
        }
        Err(e) => return Err(e.to_response()),
    };

    let validator = AssignmentValidator::new(backend.as_ref());
    if update.teacher.is_some() || update.subject.is_some() {
        let teacher_id = update
            .teacher
            .clone()
            .unwrap_or_else(|| current.teacher_id.clone());
        validator
            .validate_course_assignment(&teacher_id, update.subject.as_deref(), Some(&current))
            .await
            .map_err(|e| e.to_response())?;
    }
    if let Some(code) = &update.code {
        let normalized = validator
            .validate_unique_code(EntityKind::Course, code, Some(&id))
            .await
            .map_err(|e| e.to_response())?;
        update.code = Some(normalized);
    }

    match backend.update_course(&id, &update).await {
        Ok(Some(course)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Course updated successfully", "course": course})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Course not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn delete_course(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    match backend.deactivate_course(&id).await {
        Ok(Some(course)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Course deactivated successfully", "course": course})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Course not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

/// Active courses taught by one teacher. Unknown teacher is a 404 even when
/// the course list would just be empty.
pub async fn courses_by_teacher(
    State((backend, _config)): State<AppState>,
    Path(teacher_id): Path<String>,
) -> ApiResult {
    let teacher = match backend.find_teacher_by_id(&teacher_id).await {
        Ok(Some(teacher)) => teacher,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Teacher not found"})),
            ))
        }
        Err(e) => return Err(e.to_response()),
    };

    let filter = CourseFilter {
        active_only: true,
        teacher_id: Some(teacher_id),
        subject_id: None,
    };
    match backend.find_courses(&filter).await {
        Ok(courses) => Ok((
            StatusCode::OK,
            Json(json!({
                "teacher": teacher.name,
                "count": courses.len(),
                "courses": courses,
            })),
        )),
        Err(e) => Err(e.to_response()),
    }
}

/// Active courses in one subject. Unknown subject is a 404.
pub async fn courses_by_subject(
    State((backend, _config)): State<AppState>,
    Path(subject_id): Path<String>,
) -> ApiResult {
    let subject = match backend.find_subject_by_id(&subject_id).await {
        Ok(Some(subject)) => subject,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Subject not found"})),
            ))
        }
        Err(e) => return Err(e.to_response()),
    };

    let filter = CourseFilter {
        active_only: true,
        teacher_id: None,
        subject_id: Some(subject_id),
    };
    match backend.find_courses(&filter).await {
        Ok(courses) => Ok((
            StatusCode::OK,
            Json(json!({
                "subject": subject.name,
                "count": courses.len(),
                "courses": courses,
            })),
        )),
        Err(e) => Err(e.to_response()),
    }
}
