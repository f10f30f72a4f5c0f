//! Shared helpers for gymlog-api integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use gymlog_api::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Router over a fresh in-memory database
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = gymlog_common::db::init_memory_database()
            .await
            .expect("Should create in-memory database");
        Self::from_pool(pool)
    }

    /// Router over a file database opened the way the server opens it
    pub async fn with_database(database_url: &str) -> Self {
        let pool = gymlog_common::db::init_database(database_url)
            .await
            .expect("Should open file database");
        Self::from_pool(pool)
    }

    fn from_pool(pool: SqlitePool) -> Self {
        let router = build_router(AppState::new(pool.clone()));
        Self { router, pool }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should respond");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Should parse JSON")
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json("POST", uri, body).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json("PUT", uri, body).await
    }

    pub async fn post_text(&self, uri: &str, text: &str) -> (StatusCode, Value) {
        self.post_raw(uri, "text/tab-separated-values", text).await
    }

    /// POST an arbitrary body, e.g. JSON that does not parse
    pub async fn post_raw(&self, uri: &str, content_type: &str, text: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(text.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn create_exercise(&self, name: &str) -> i64 {
        let (status, body) = self.post("/api/exercises", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "create exercise: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_workout(&self, name: &str, exercise_ids: &[i64]) -> i64 {
        let exercises: Vec<Value> = exercise_ids
            .iter()
            .map(|id| json!({ "exercise_id": id }))
            .collect();
        let (status, body) = self
            .post("/api/workouts", json!({ "name": name, "exercises": exercises }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create workout: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_plan(&self, template_id: i64, planned_for: Option<&str>) -> i64 {
        let (status, body) = self
            .post(
                "/api/plans",
                json!({ "template_id": template_id, "planned_for": planned_for }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create plan: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_session(&self, body: Value) -> i64 {
        let (status, body) = self.post("/api/sessions", body).await;
        assert_eq!(status, StatusCode::CREATED, "create session: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .expect("Count query should succeed")
    }
}

/// `exercise_id -> sort_order` pairs from a detail body
pub fn sort_orders(detail: &Value) -> Vec<(i64, i64)> {
    detail["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["exercise_id"].as_i64().unwrap(),
                e["sort_order"].as_i64().unwrap(),
            )
        })
        .collect()
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}
