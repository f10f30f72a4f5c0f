//! Integration tests for health, build info and exercise endpoints

mod common;

use axum::http::StatusCode;
use common::{error_code, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gymlog-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/buildinfo").await;

    assert_eq!(status, StatusCode::OK);
    for field in ["version", "git_hash", "build_timestamp", "build_profile"] {
        assert!(body[field].is_string(), "missing {}", field);
    }
}

#[tokio::test]
async fn test_create_and_list_exercises() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/exercises",
            json!({ "name": "  Squat ", "muscle_group": "legs", "notes": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Squat");
    assert_eq!(body["muscle_group"], "legs");
    assert!(body["notes"].is_null());

    app.create_exercise("bench press").await;
    app.create_exercise("Deadlift").await;

    let (status, body) = app.get("/api/exercises").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bench press", "Deadlift", "Squat"]);
}

#[tokio::test]
async fn test_exercise_validation_and_conflicts() {
    let app = TestApp::new().await;
    app.create_exercise("Pull Up").await;

    let (status, body) = app.post("/api/exercises", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = app.post("/api/exercises", json!({ "name": "pull up" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");

    let (status, body) = app.post("/api/exercises", json!({ "title": "Dips" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_requests_use_error_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/exercises", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("name"));

    let (status, body) = app.post("/api/exercises", json!({ "name": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = app
        .post_raw("/api/exercises", "application/json", "{\"name\": ")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = app.post_raw("/api/exercises", "text/plain", "Squat").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = app.get("/api/exercises/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = app.get("/api/exercises/1/history?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    assert_eq!(app.count("SELECT COUNT(*) FROM exercises").await, 0);
}

#[tokio::test]
async fn test_get_update_unknown_exercise() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/exercises/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, _) = app
        .put("/api/exercises/999", json!({ "name": "Row" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_exercise() {
    let app = TestApp::new().await;
    let id = app.create_exercise("Row").await;
    app.create_exercise("Curl").await;

    let (status, body) = app
        .put(
            &format!("/api/exercises/{}", id),
            json!({ "name": "Barbell Row", "muscle_group": "back" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Barbell Row");
    assert_eq!(body["muscle_group"], "back");

    let (status, _) = app
        .put(&format!("/api/exercises/{}", id), json!({ "name": "CURL" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_used_exercise_is_conflict() {
    let app = TestApp::new().await;
    let used = app.create_exercise("Bench Press").await;
    let unused = app.create_exercise("Face Pull").await;
    app.create_workout("Push", &[used]).await;

    let (status, body) = app.delete(&format!("/api/exercises/{}", used)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");
    assert_eq!(app.count("SELECT COUNT(*) FROM exercises").await, 2);

    let (status, _) = app.delete(&format!("/api/exercises/{}", unused)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/exercises/{}", unused)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/exercises/{}", unused)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_exercise_with_logged_sets_is_conflict() {
    let app = TestApp::new().await;
    let squat = app.create_exercise("Squat").await;
    let curl = app.create_exercise("Curl").await;
    let workout = app.create_workout("Legs", &[squat]).await;
    let session = app.create_session(json!({ "template_id": workout })).await;

    // Logged outside the template
    let (status, _) = app
        .put(
            &format!("/api/sessions/{}/exercises/{}/sets", session, curl),
            json!({ "sets": [{ "reps": 12 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/api/exercises/{}", curl)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_exercise_history_newest_first() {
    let app = TestApp::new().await;
    let squat = app.create_exercise("Squat").await;
    let workout = app.create_workout("Legs", &[squat]).await;

    for (date, weight) in [("2024-05-01", 100.0), ("2024-05-08", 105.0), ("2024-05-15", 110.0)] {
        let session = app
            .create_session(json!({ "template_id": workout, "performed_on": date }))
            .await;
        let (status, _) = app
            .put(
                &format!("/api/sessions/{}/exercises/{}/sets", session, squat),
                json!({ "sets": [{ "reps": 5, "weight": weight }, { "reps": 5, "weight": weight }] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    // A session without squat sets does not appear
    app.create_session(json!({ "template_id": workout, "performed_on": "2024-05-20" }))
        .await;

    let (status, body) = app.get(&format!("/api/exercises/{}/history", squat)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercise"]["name"], "Squat");
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0]["performed_on"], "2024-05-15");
    assert_eq!(sessions[0]["sets"].as_array().unwrap().len(), 2);
    assert_eq!(sessions[0]["sets"][0]["weight"], 110.0);
    assert_eq!(sessions[2]["performed_on"], "2024-05-01");

    let (_, body) = app
        .get(&format!("/api/exercises/{}/history?limit=1", squat))
        .await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .get(&format!("/api/exercises/{}/history?limit=0", squat))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/exercises/999/history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
