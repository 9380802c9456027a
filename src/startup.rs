use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::{AcademicBackend, BackendFactory, DatabaseType};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::logging;
use crate::resource;

/// Translate the YAML backend section into a database backend configuration.
pub fn database_backend_config(config: &AppConfig) -> AppResult<DatabaseBackendConfig> {
    if config.backend.backend_type != "database" {
        return Err(AppError::Configuration(format!(
            "Unsupported backend type: {}",
            config.backend.backend_type
        )));
    }

    let database = config.backend.database.as_ref().ok_or_else(|| {
        AppError::Configuration(
            "Database configuration is required when backend type is 'database'".to_string(),
        )
    })?;

    let database_type = match database.db_type.as_str() {
        "postgresql" => DatabaseType::PostgreSQL,
        "sqlite" => DatabaseType::SQLite,
        other => {
            return Err(AppError::Configuration(format!(
                "Unsupported database type: {}",
                other
            )))
        }
    };

    Ok(DatabaseBackendConfig {
        database_type,
        connection_url: database.url.clone(),
        max_connections: database.max_connections,
        connection_timeout: 30,
    })
}

/// Connect the configured backend and make sure its schema exists.
///
/// Schema initialization runs on the same backend instance that serves
/// requests; an in-memory database created elsewhere would be a different
/// database entirely.
pub async fn setup_backend(config: &AppConfig) -> AppResult<Arc<dyn AcademicBackend>> {
    let backend_config = database_backend_config(config)?;
    backend_config
        .validate()
        .map_err(AppError::Configuration)?;

    let backend = BackendFactory::create(&backend_config).await?;
    backend.init_schema().await?;
    backend.health_check().await?;

    Ok(backend)
}

/// Assemble the full route table under the configured base path.
pub fn build_router(backend: Arc<dyn AcademicBackend>, config: Arc<AppConfig>) -> Router {
    let base = config.api.base_path.trim_end_matches('/').to_string();

    let app = Router::new()
        .route("/", get(resource::service_index))
        .route(&format!("{}/health", base), get(resource::health))
        // Subject routes
        .route(
            &format!("{}/subjects", base),
            post(resource::subject::create_subject).get(resource::subject::list_subjects),
        )
        .route(
            &format!("{}/subjects/{{id}}", base),
            get(resource::subject::get_subject)
                .put(resource::subject::update_subject)
                .delete(resource::subject::delete_subject),
        )
        // Teacher routes
        .route(
            &format!("{}/teachers", base),
            post(resource::teacher::create_teacher).get(resource::teacher::list_teachers),
        )
        .route(
            &format!("{}/teachers/{{id}}", base),
            get(resource::teacher::get_teacher)
                .put(resource::teacher::update_teacher)
                .delete(resource::teacher::delete_teacher),
        )
        // Same param name as the plain {id} routes: the router requires one
        // name per parameter position.
        .route(
            &format!("{}/teachers/{{id}}/subjects/{{subject_id}}", base),
            post(resource::teacher::assign_subject),
        )
        // Course routes
        .route(
            &format!("{}/courses", base),
            post(resource::course::create_course).get(resource::course::list_courses),
        )
        .route(
            &format!("{}/courses/teacher/{{teacher_id}}", base),
            get(resource::course::courses_by_teacher),
        )
        .route(
            &format!("{}/courses/subject/{{subject_id}}", base),
            get(resource::course::courses_by_subject),
        )
        .route(
            &format!("{}/courses/{{id}}", base),
            get(resource::course::get_course)
                .put(resource::course::update_course)
                .delete(resource::course::delete_course),
        );

    app.layer(middleware::from_fn(logging::access_log))
        .with_state((backend, config))
}
