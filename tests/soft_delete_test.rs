use http::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn deleted_subject_remains_fetchable_but_ineligible() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;

    let response = server
        .delete(&format!("/api/v1/subjects/{}", subject_id))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Subject deactivated successfully");
    assert_eq!(body["subject"]["isActive"], false);

    // Never purged: the record still resolves by id.
    let response = server.get(&format!("/api/v1/subjects/{}", subject_id)).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["subject"]["isActive"], false);

    // The active flag gates eligibility for new assignments.
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
}

#[tokio::test]
async fn deleting_a_subject_does_not_cascade_to_referencing_records() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;
    let course_id =
        common::seed_course(&server, "Algorithms", "CS-101", &teacher_id, &subject_id).await;

    server
        .delete(&format!("/api/v1/subjects/{}", subject_id))
        .await
        .assert_status(StatusCode::OK);

    // The teacher still lists the deactivated subject and the course still
    // references it; nothing is cleaned up.
    let response = server.get(&format!("/api/v1/teachers/{}", teacher_id)).await;
    let body: Value = response.json();
    assert_eq!(body["teacher"]["subjects"][0], subject_id.as_str());

    let response = server.get(&format!("/api/v1/courses/{}", course_id)).await;
    let body: Value = response.json();
    assert_eq!(body["course"]["subjectId"], subject_id.as_str());
    assert_eq!(body["course"]["isActive"], true);
}

#[tokio::test]
async fn deleted_course_survives_as_an_inactive_record() {
    let server = common::setup_test_server().await;
    let subject_id = common::seed_subject(&server, "Algorithms", "CS101").await;
    let teacher_id = common::seed_teacher(&server, "grace@example.com", &[&subject_id]).await;
    let course_id =
        common::seed_course(&server, "Algorithms", "CS-101", &teacher_id, &subject_id).await;

    let response = server.delete(&format!("/api/v1/courses/{}", course_id)).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Course deactivated successfully");

    let response = server.get(&format!("/api/v1/courses/{}", course_id)).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["course"]["isActive"], false);

    // Deleting twice still reports the (already inactive) record.
    let response = server.delete(&format!("/api/v1/courses/{}", course_id)).await;
    response.assert_status(StatusCode::OK);

    let response = server.delete("/api/v1/courses/no-such-course").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
