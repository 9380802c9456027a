use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use academic_server::backend::database::DatabaseBackendConfig;
use academic_server::backend::{AcademicBackend, Backend, BackendFactory};
use academic_server::config::{ApiConfig, AppConfig, BackendConfig, DatabaseConfig, ServerConfig};
use academic_server::startup;

/// Create backend for testing with an in-memory SQLite database
pub async fn setup_test_backend() -> Arc<dyn AcademicBackend> {
    let backend_config = DatabaseBackendConfig::memory_sqlite();
    let backend = BackendFactory::create(&backend_config).await.unwrap();
    backend.init_schema().await.unwrap();
    backend
}

/// Helper function to create a test app configuration
pub fn create_test_app_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        backend: BackendConfig {
            backend_type: "database".to_string(),
            database: Some(DatabaseConfig {
                db_type: "sqlite".to_string(),
                url: ":memory:".to_string(),
                max_connections: 1,
            }),
        },
        api: ApiConfig::default(),
    }
}

/// Create a test app with its own in-memory database
pub async fn setup_test_app() -> Router {
    let backend = setup_test_backend().await;
    let app_config = Arc::new(create_test_app_config());
    startup::build_router(backend, app_config)
}

/// Create a TestServer with its own in-memory database
pub async fn setup_test_server() -> TestServer {
    TestServer::new(setup_test_app().await).unwrap()
}

#[allow(dead_code)]
pub fn subject_json(name: &str, code: &str, credits: i64) -> Value {
    json!({
        "name": name,
        "code": code,
        "description": format!("{} basics", name),
        "credits": credits,
    })
}

#[allow(dead_code)]
pub fn teacher_json(name: &str, email: &str, subjects: &[&str]) -> Value {
    json!({
        "name": name,
        "email": email,
        "department": "Computer Science",
        "subjects": subjects,
        "experience": 5,
    })
}

#[allow(dead_code)]
pub fn course_json(title: &str, code: &str, teacher_id: &str, subject_id: &str) -> Value {
    json!({
        "title": title,
        "code": code,
        "teacher": teacher_id,
        "subject": subject_id,
    })
}

/// POST a subject and return its generated id
#[allow(dead_code)]
pub async fn seed_subject(server: &TestServer, name: &str, code: &str) -> String {
    let response = server
        .post("/api/v1/subjects")
        .json(&subject_json(name, code, 5))
        .await;
    response.assert_status(http::StatusCode::CREATED);
    let body: Value = response.json();
    body["subject"]["id"].as_str().unwrap().to_string()
}

/// POST a teacher qualified for the given subject ids and return its id
#[allow(dead_code)]
pub async fn seed_teacher(server: &TestServer, email: &str, subjects: &[&str]) -> String {
    let response = server
        .post("/api/v1/teachers")
        .json(&teacher_json("Test Teacher", email, subjects))
        .await;
    response.assert_status(http::StatusCode::CREATED);
    let body: Value = response.json();
    body["teacher"]["id"].as_str().unwrap().to_string()
}

/// POST a course and return its id
#[allow(dead_code)]
pub async fn seed_course(
    server: &TestServer,
    title: &str,
    code: &str,
    teacher_id: &str,
    subject_id: &str,
) -> String {
    let response = server
        .post("/api/v1/courses")
        .json(&course_json(title, code, teacher_id, subject_id))
        .await;
    response.assert_status(http::StatusCode::CREATED);
    let body: Value = response.json();
    body["course"]["id"].as_str().unwrap().to_string()
}
