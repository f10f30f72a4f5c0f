//! Integration tests for workout plan endpoints and TSV import

mod common;

use axum::http::StatusCode;
use common::{error_code, sort_orders, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_create_plan_copies_template() {
    let app = TestApp::new().await;
    let a = app.create_exercise("Squat").await;
    let b = app.create_exercise("Lunge").await;
    let (_, workout) = app
        .post(
            "/api/workouts",
            json!({
                "name": "Legs",
                "exercises": [
                    { "exercise_id": a, "target_sets": 5, "target_reps": 5 },
                    { "exercise_id": b, "target_sets": 3, "target_reps": 12 }
                ]
            }),
        )
        .await;
    let template_id = workout["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            "/api/plans",
            json!({ "template_id": template_id, "planned_for": "2024-06-03" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Legs");
    assert_eq!(body["template_name"], "Legs");
    assert_eq!(body["planned_for"], "2024-06-03");
    assert_eq!(sort_orders(&body), vec![(a, 1), (b, 2)]);
    assert_eq!(body["exercises"][0]["target_sets"], 5);
    assert_eq!(body["exercises"][1]["target_reps"], 12);
    assert!(body["exercises"][0]["target_weight"].is_null());

    // Later template edits do not touch the plan
    app.delete(&format!("/api/workouts/{}/exercises/{}", template_id, b))
        .await;
    let (_, body) = app
        .get(&format!("/api/plans/{}", body["id"].as_i64().unwrap()))
        .await;
    assert_eq!(body["exercises"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_plan_errors() {
    let app = TestApp::new().await;
    let workout = app.create_workout("Legs", &[]).await;

    let (status, _) = app.post("/api/plans", json!({ "template_id": 999 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/plans",
            json!({ "template_id": workout, "planned_for": "June 3rd" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/plans", json!({ "template_id": workout, "name": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/plans", json!({ "template_id": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
    assert_eq!(app.count("SELECT COUNT(*) FROM workout_plans").await, 0);
}

#[tokio::test]
async fn test_list_plans_dated_first() {
    let app = TestApp::new().await;
    let workout = app.create_workout("Legs", &[]).await;
    let undated = app.create_plan(workout, None).await;
    let later = app.create_plan(workout, Some("2024-07-01")).await;
    let sooner = app.create_plan(workout, Some("2024-06-01")).await;

    let (status, body) = app.get("/api/plans").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![sooner, later, undated]);
    assert_eq!(body[0]["template_name"], "Legs");
}

#[tokio::test]
async fn test_plan_link_weights_and_order() {
    let app = TestApp::new().await;
    let a = app.create_exercise("Squat").await;
    let b = app.create_exercise("Lunge").await;
    let c = app.create_exercise("Calf Raise").await;
    let workout = app.create_workout("Legs", &[a, b]).await;
    let plan = app.create_plan(workout, None).await;

    let (status, body) = app
        .post(
            &format!("/api/plans/{}/exercises", plan),
            json!({ "exercise_id": c, "target_weight": 40.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sort_orders(&body), vec![(a, 1), (b, 2), (c, 3)]);
    assert_eq!(body["exercises"][2]["target_weight"], 40.0);

    let (status, body) = app
        .put(
            &format!("/api/plans/{}/exercises/{}", plan, a),
            json!({ "target_sets": 5, "target_reps": 3, "target_weight": 120.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercises"][0]["target_weight"], 120.5);

    let (status, _) = app
        .put(
            &format!("/api/plans/{}/exercises/{}", plan, a),
            json!({ "target_sets": 5, "target_reps": 3, "target_weight": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &format!("/api/plans/{}/exercises/{}/move", plan, c),
            json!({ "direction": "up" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sort_orders(&body), vec![(a, 1), (c, 2), (b, 3)]);

    let (status, body) = app
        .delete(&format!("/api/plans/{}/exercises/{}", plan, a))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sort_orders(&body), vec![(c, 1), (b, 2)]);
}

#[tokio::test]
async fn test_update_plan() {
    let app = TestApp::new().await;
    let workout = app.create_workout("Legs", &[]).await;
    let plan = app.create_plan(workout, Some("2024-06-03")).await;

    let (status, body) = app
        .put(
            &format!("/api/plans/{}", plan),
            json!({ "name": "Legs (deload)", "notes": "go light" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Legs (deload)");
    assert_eq!(body["notes"], "go light");
    assert!(body["planned_for"].is_null());
}

#[tokio::test]
async fn test_delete_plan_detaches_sessions_and_calendar() {
    let app = TestApp::new().await;
    let a = app.create_exercise("Squat").await;
    let workout = app.create_workout("Legs", &[a]).await;
    let plan = app.create_plan(workout, Some("2024-06-03")).await;
    let other = app.create_plan(workout, Some("2024-06-05")).await;

    app.put("/api/calendar/2024-06-03", json!({ "plan_id": plan }))
        .await;
    app.put("/api/calendar/2024-06-05", json!({ "plan_id": other }))
        .await;
    let session = app.create_session(json!({ "plan_id": plan })).await;
    app.put(
        &format!("/api/sessions/{}/exercises/{}/sets", session, a),
        json!({ "sets": [{ "reps": 5, "weight": 100 }] }),
    )
    .await;

    let (status, _) = app.delete(&format!("/api/plans/{}", plan)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/sessions/{}", session)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["plan_id"].is_null());
    assert_eq!(body["template_id"], workout);
    assert_eq!(body["exercises"][0]["sets"].as_array().unwrap().len(), 1);

    let (_, range) = app
        .get("/api/calendar/range?from=2024-06-01&to=2024-06-30")
        .await;
    let dates: Vec<&str> = range
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-06-05"]);

    assert_eq!(
        app.count(&format!(
            "SELECT COUNT(*) FROM workout_plan_exercises WHERE plan_id = {}",
            plan
        ))
        .await,
        0
    );

    let (status, _) = app.delete(&format!("/api/plans/{}", plan)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn import_fixture(app: &TestApp) -> (i64, i64, i64) {
    let push = app.create_workout("Push", &[]).await;
    let bench = app.create_exercise("Bench Press").await;
    let ohp = app.create_exercise("Overhead Press").await;
    app.create_exercise("Deadlift").await;
    app.create_workout("Pull", &[]).await;
    (push, bench, ohp)
}

#[tokio::test]
async fn test_import_plans() {
    let app = TestApp::new().await;
    let (push, bench, ohp) = import_fixture(&app).await;

    let tsv = "date\ttemplate\texercise\tsets\treps\tweight\n\
               2024-06-03\tpush\tbench press\t5\t5\t80\n\
               2024-06-03\tPush\tOverhead Press\t3\t8\n\
               # pulls\n\
               2024-06-05\tPull\tDeadlift\t1\t5\t140\n";

    let (status, body) = app.post_text("/api/plans/import", tsv).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["plans_created"], 2);
    assert_eq!(body["rows_imported"], 3);
    assert_eq!(body["plans"][0]["name"], "Push 2024-06-03");
    assert_eq!(body["plans"][0]["template_id"], push);

    let plan_id = body["plans"][0]["id"].as_i64().unwrap();
    let (_, plan) = app.get(&format!("/api/plans/{}", plan_id)).await;
    assert_eq!(plan["planned_for"], "2024-06-03");
    assert_eq!(sort_orders(&plan), vec![(bench, 1), (ohp, 2)]);
    assert_eq!(plan["exercises"][0]["target_weight"], 80.0);
    assert!(plan["exercises"][1]["target_weight"].is_null());

    let (_, week) = app.get("/api/calendar?date=2024-06-04").await;
    assert_eq!(week["days"][0]["plan"]["id"], plan_id);
    assert_eq!(week["days"][2]["plan"]["template_name"], "Pull");
}

#[tokio::test]
async fn test_import_with_invalid_row_writes_nothing() {
    let app = TestApp::new().await;
    import_fixture(&app).await;

    let tsv = "2024-06-03\tPush\tBench Press\t5\t5\t80\n\
               2024-06-05\tPull\tRack Pull\t3\t5\n\
               2024-06-07\tArms\tCurl\t3\t12\n";

    let (status, body) = app.post_text("/api/plans/import", tsv).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_FAILED");
    let details: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert_eq!(
        details,
        vec![
            "line 2: unknown exercise 'Rack Pull'",
            "line 3: unknown workout 'Arms'",
            "line 3: unknown exercise 'Curl'",
        ]
    );

    assert_eq!(app.count("SELECT COUNT(*) FROM workout_plans").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM workout_plan_exercises").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM workout_calendar").await, 0);
}

#[tokio::test]
async fn test_import_syntax_errors() {
    let app = TestApp::new().await;
    import_fixture(&app).await;

    let tsv = "2024-06-03\tPush\tBench Press\t5\t5\n\
               2024-06-03\tPush\tBench Press\t3\t8\n\
               2024-06-03\tPull\tDeadlift\t1\t5\n\
               2024-02-30\tPush\tBench Press\tfive\t5\n";

    let (status, body) = app.post_text("/api/plans/import", tsv).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0], "line 4: invalid date '2024-02-30'");
    assert_eq!(details[1], "line 4: invalid sets 'five'");

    let tsv = "2024-06-03\tPush\tBench Press\t5\t5\n\
               2024-06-03\tPush\tbench press\t3\t8\n\
               2024-06-03\tPull\tDeadlift\t1\t5\n";
    let (status, body) = app.post_text("/api/plans/import", tsv).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 2);

    let (status, _) = app.post_text("/api/plans/import", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("SELECT COUNT(*) FROM workout_plans").await, 0);
}

#[tokio::test]
async fn test_import_replaces_calendar_day() {
    let app = TestApp::new().await;
    let (push, _, _) = import_fixture(&app).await;
    let existing = app.create_plan(push, Some("2024-06-03")).await;
    app.put("/api/calendar/2024-06-03", json!({ "plan_id": existing, "notes": "old" }))
        .await;

    let (status, body) = app
        .post_text("/api/plans/import", "2024-06-03\tPush\tBench Press\t5\t5\n")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let imported = body["plans"][0]["id"].as_i64().unwrap();

    let (_, range) = app
        .get("/api/calendar/range?from=2024-06-03&to=2024-06-03")
        .await;
    assert_eq!(range[0]["plan_id"], imported);
    assert!(range[0]["notes"].is_null());
}
