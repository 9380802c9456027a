use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::backend::AcademicBackend;
use crate::config::AppConfig;

pub mod course;
pub mod subject;
pub mod teacher;

pub type AppState = (Arc<dyn AcademicBackend>, Arc<AppConfig>);

/// Handler return type: success and failure both carry a JSON body.
pub type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

/// Service banner listing the available endpoint groups.
pub async fn service_index(State((_backend, config)): State<AppState>) -> Json<Value> {
    let base = config.api.base_path.trim_end_matches('/');
    Json(json!({
        "message": "Academic records API is running",
        "endpoints": {
            "subjects": format!("{}/subjects", base),
            "teachers": format!("{}/teachers", base),
            "courses": format!("{}/courses", base),
            "health": format!("{}/health", base),
        }
    }))
}

pub async fn health(State((backend, _config)): State<AppState>) -> ApiResult {
    match backend.health_check().await {
        Ok(()) => Ok((StatusCode::OK, Json(json!({ "status": "ok" })))),
        Err(e) => Err(e.to_response()),
    }
}
