use http::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn create_course_with_qualified_teacher_returns_201() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;

    let response = server
        .post("/api/v1/courses")
        .json(&json!({
            "title": "Introduction to Algorithms",
            "code": "cs-101",
            "teacher": teacher_id,
            "subject": subject_id,
            "schedule": {"day": "Monday", "time": "10:00", "room": "B12"},
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Course created successfully");
    assert_eq!(body["course"]["code"], "CS-101");
    assert_eq!(body["course"]["maxStudents"], 30);
    assert_eq!(body["course"]["schedule"]["day"], "Monday");
    // The resolved records ride along so clients skip the extra lookups.
    assert_eq!(body["teacher"]["email"], "grace@example.com");
    assert_eq!(body["subject"]["code"], "CS101");
}

#[tokio::test]
async fn create_course_with_unqualified_teacher_returns_400() {
    let server = common::setup_test_server().await;
    let s1 = common::seed_subject(&server, "Algorithms", "CS101").await;
    let s2 = common::seed_subject(&server, "Databases", "CS201").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&s1]).await;

    let response = server
        .post("/api/v1/courses")
        .json(&common::course_json("Databases", "CS-201", &teacher_id, &s2))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Teacher is not qualified to teach this subject"
    );
}

#[tokio::test]
async fn create_course_with_absent_teacher_returns_404() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;

    let response = server
        .post("/api/v1/courses")
        .json(&common::course_json(
            "Algorithms",
            "CS-101",
            "no-such-teacher",
            &subject_id,
        ))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Teacher not found");
}

#[tokio::test]
async fn create_course_with_inactive_teacher_returns_400() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;
    server
        .delete(&format!("/api/v1/teachers/{}", teacher_id))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/api/v1/courses")
        .json(&common::course_json(
            "Algorithms",
            "CS-101",
            &teacher_id,
            &subject_id,
        ))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Teacher is inactive");
}

#[tokio::test]
async fn create_course_with_inactive_subject_returns_400() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;
    server
        .delete(&format!("/api/v1/subjects/{}", subject_id))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/api/v1/courses")
        .json(&common::course_json(
            "Algorithms",
            "CS-101",
            &teacher_id,
            &subject_id,
        ))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Subject is inactive");
}

#[tokio::test]
async fn duplicate_course_code_returns_409_case_insensitive() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;
    common::seed_course(&server, "Algorithms", "CS-101", &teacher_id, &subject_id).await;

    let response = server
        .post("/api/v1/courses")
        .json(&common::course_json(
            "Algorithms Again",
            "cs-101",
            &teacher_id,
            &subject_id,
        ))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["message"], "Course with this code already exists");
}

#[tokio::test]
async fn course_code_may_reuse_a_subject_code() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS-101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;

    // Uniqueness is scoped per entity kind: a course may carry the code of a
    // subject without colliding.
    let response = server
        .post("/api/v1/courses")
        .json(&common::course_json(
            "Algorithms",
            "CS-101",
            &teacher_id,
            &subject_id,
        ))
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn create_course_rejects_invalid_capacity() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;

    let mut payload = common::course_json("Algorithms", "CS-101", &teacher_id, &subject_id);
    payload["maxStudents"] = json!(0);

    let response = server.post("/api/v1/courses").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assign_subject_to_teacher_then_reject_the_duplicate() {
    let server = common::setup_test_server().await;
    let s1 = common::seed_subject(&server, "Algorithms", "CS101").await;
    let s2 = common::seed_subject(&server, "Databases", "CS201").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&s1]).await;

    let response = server
        .post(&format!("/api/v1/teachers/{}/subjects/{}", teacher_id, s2))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Subject added to teacher successfully");
    assert_eq!(body["teacher"]["subjects"], json!([s1.clone(), s2.clone()]));

    // Second identical assignment is rejected and the set stays the same size.
    let response = server
        .post(&format!("/api/v1/teachers/{}/subjects/{}", teacher_id, s2))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Subject already assigned to this teacher");

    let response = server.get(&format!("/api/v1/teachers/{}", teacher_id)).await;
    let body: Value = response.json();
    assert_eq!(body["teacher"]["subjects"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn assign_subject_requires_active_records() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[]).await;

    // Unknown subject
    let response = server
        .post(&format!(
            "/api/v1/teachers/{}/subjects/no-such-subject",
            teacher_id
        ))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Inactive subject
    server
        .delete(&format!("/api/v1/subjects/{}", subject_id))
        .await
        .assert_status(StatusCode::OK);
    let response = server
        .post(&format!(
            "/api/v1/teachers/{}/subjects/{}",
            teacher_id, subject_id
        ))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Inactive teacher
    server
        .delete(&format!("/api/v1/teachers/{}", teacher_id))
        .await
        .assert_status(StatusCode::OK);
    let response = server
        .post(&format!(
            "/api/v1/teachers/{}/subjects/{}",
            teacher_id, subject_id
        ))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
