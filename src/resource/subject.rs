use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiResult, AppState};
use crate::domain::{AssignmentValidator, EntityKind};
use crate::models::{CreateSubject, Subject, SubjectUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub active_only: Option<bool>,
}

pub async fn create_subject(
    State((backend, _config)): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let command: CreateSubject = match serde_json::from_value(payload) {
        Ok(command) => command,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("Invalid subject data: {}", e)})),
            ))
        }
    };
    if let Err(e) = command.validate() {
        return Err(e.to_response());
    }

    let validator = AssignmentValidator::new(backend.as_ref());
    let code = validator
        .validate_unique_code(EntityKind::Subject, &command.code, None)
        .await
        .map_err(|e| e.to_response())?;

    // Subject names are unique as well as codes.
    match backend.find_subject_by_name(command.name.trim()).await {
        Ok(Some(_)) => {
            return Err((
                StatusCode::CONFLICT,
                Json(json!({"message": "Subject with this name already exists"})),
            ))
        }
        Ok(None) => {}
        Err(e) => return Err(e.to_response()),
    }

    let subject = Subject::new(command.name, code, command.description, command.credits);
    match backend.create_subject(&subject).await {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(json!({"message": "Subject created successfully", "subject": created})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn list_subjects(
    State((backend, _config)): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    match backend
        .find_all_subjects(params.active_only.unwrap_or(false))
        .await
    {
        Ok(subjects) => Ok((
            StatusCode::OK,
            Json(json!({"count": subjects.len(), "subjects": subjects})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn get_subject(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    match backend.find_subject_by_id(&id).await {
        Ok(Some(subject)) => Ok((StatusCode::OK, Json(json!({ "subject": subject })))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Subject not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn update_subject(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let mut update: SubjectUpdate = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("Invalid subject data: {}", e)})),
            ))
        }
    };
    if let Err(e) = update.validate() {
        return Err(e.to_response());
    }

    let validator = AssignmentValidator::new(backend.as_ref());
    if let Some(code) = &update.code {
        let normalized = validator
            .validate_unique_code(EntityKind::Subject, code, Some(&id))
            .await
            .map_err(|e| e.to_response())?;
        update.code = Some(normalized);
    }
    if let Some(name) = &update.name {
        match backend.find_subject_by_name(name.trim()).await {
            Ok(Some(existing)) if existing.id != id => {
                return Err((
                    StatusCode::CONFLICT,
                    Json(json!({"message": "Subject with this name already exists"})),
                ))
            }
            Ok(_) => {}
            Err(e) => return Err(e.to_response()),
        }
    }

    match backend.update_subject(&id, &update).await {
        Ok(Some(subject)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Subject updated successfully", "subject": subject})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Subject not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn delete_subject(
    State((backend, _config)): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    match backend.deactivate_subject(&id).await {
        Ok(Some(subject)) => Ok((
            StatusCode::OK,
            Json(json!({"message": "Subject deactivated successfully", "subject": subject})),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Subject not found"})),
        )),
        Err(e) => Err(e.to_response()),
    }
}
