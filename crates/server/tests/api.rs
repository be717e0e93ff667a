//! HTTP contract tests driving the full router in-process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kairos_core::Config;
use kairos_server::{build_app_state, build_router, AppState};

const PASSWORD: &str = "s3cretpass";

fn app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = build_app_state(&config).unwrap();
    (build_router(state.clone()), state)
}

fn app() -> (Router, Arc<AppState>) {
    app_with(Config::default())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, header::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let creds = json!({ "email": email, "password": PASSWORD });
    let (status, _, _) = send(app, "POST", "/auth/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _, body) = send(app, "POST", "/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

fn due_in(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

// ── Health ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_and_root() {
    let (app, _) = app();
    for uri in ["/", "/health"] {
        let (status, _, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scorer"], "rule");
        assert_eq!(body["tasks"], 0);
    }
}

#[tokio::test]
async fn test_docs_are_served() {
    let (app, _) = app();
    let request = Request::builder().uri("/docs").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ── Auth ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_returns_public_view() {
    let (app, _) = app();
    let (status, _, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": " New@Example.com ", "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "new@example.com");
    assert!(body["id"].is_string());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_is_400() {
    let (app, _) = app();
    let creds = json!({ "email": "dup@example.com", "password": PASSWORD });
    send(&app, "POST", "/auth/register", None, Some(creds.clone())).await;
    let (status, _, body) = send(&app, "POST", "/auth/register", None, Some(creds)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
async fn test_register_validation_is_422() {
    let (app, _) = app();
    let short = json!({ "email": "a@example.com", "password": "short" });
    let (status, _, body) = send(&app, "POST", "/auth/register", None, Some(short)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("at least 8"));

    let bad_email = json!({ "email": "nope", "password": PASSWORD });
    let (status, _, _) = send(&app, "POST", "/auth/register", None, Some(bad_email)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = app();
    register_and_login(&app, "known@example.com").await;

    let (s1, h1, b1) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "known@example.com", "password": "wrong-password" })),
    )
    .await;
    let (s2, h2, b2) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": PASSWORD })),
    )
    .await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);
    assert_eq!(b1["detail"], "Incorrect email or password");
    assert_eq!(h1[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(h2[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn test_task_routes_require_bearer() {
    let (app, _) = app();
    let (status, headers, body) = send(&app, "GET", "/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
    assert!(body["detail"].is_string());

    let (status, _, _) = send(&app, "GET", "/tasks", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, "POST", "/optimize-schedule", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Tasks ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_task_crud_lifecycle() {
    let (app, _) = app();
    let token = register_and_login(&app, "crud@example.com").await;

    let (status, _, created) = send(
        &app,
        "POST",
        "/tasks",
        Some(&token),
        Some(json!({
            "title": "Write report",
            "description": "Quarterly numbers",
            "due_date": due_in(3),
            "category": "work",
            "estimated_minutes": 90
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["priority"], "medium");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["difficulty"], 3);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _, listed) = send(&app, "GET", "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _, fetched) = send(&app, "GET", &format!("/tasks/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _, patched) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", id),
        Some(&token),
        Some(json!({ "title": "Write final report", "due_date": null, "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["id"], created["id"]);
    assert_eq!(patched["owner_id"], created["owner_id"]);
    assert_eq!(patched["created_at"], created["created_at"]);
    assert_eq!(patched["title"], "Write final report");
    assert_eq!(patched["status"], "in_progress");
    assert!(patched["due_date"].is_null());
    assert_eq!(patched["description"], "Quarterly numbers");

    let (status, _, _) = send(&app, "DELETE", &format!("/tasks/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, "GET", &format!("/tasks/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());

    let (status, _, _) = send(&app, "DELETE", &format!("/tasks/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_validation_is_422() {
    let (app, state) = app();
    let token = register_and_login(&app, "valid@example.com").await;

    let cases = [
        json!({ "title": "ab" }),
        json!({ "title": "Past due", "due_date": due_in(-2) }),
        json!({ "title": "Too hard", "difficulty": 6 }),
        json!({ "title": "Bad category", "category": "gardening" }),
        json!({ "title": "Bad date", "due_date": "next tuesday" }),
    ];
    for body in cases {
        let (status, _, resp) = send(&app, "POST", "/tasks", Some(&token), Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body {}", body);
        assert!(resp["detail"].is_string());
    }
    assert!(state.repo.tasks.is_empty());
}

#[tokio::test]
async fn test_naive_due_date_is_read_as_utc() {
    let (app, _) = app();
    let token = register_and_login(&app, "naive@example.com").await;

    let naive = (Utc::now() + Duration::days(4)).format("%Y-%m-%dT%H:%M:%S").to_string();
    let (status, _, created) = send(
        &app,
        "POST",
        "/tasks",
        Some(&token),
        Some(json!({ "title": "Naive deadline", "due_date": naive })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let stored = created["due_date"].as_str().unwrap();
    assert!(stored.starts_with(&naive), "{} vs {}", stored, naive);
    assert!(stored.ends_with('Z') || stored.ends_with("+00:00"));
}

#[tokio::test]
async fn test_tasks_are_scoped_to_owner() {
    let (app, _) = app();
    let alice = register_and_login(&app, "alice@example.com").await;
    let bob = register_and_login(&app, "bob@example.com").await;

    let (_, _, task) = send(&app, "POST", "/tasks", Some(&alice), Some(json!({ "title": "Alice only" }))).await;
    let uri = format!("/tasks/{}", task["id"].as_str().unwrap());

    let (status, _, listed) = send(&app, "GET", "/tasks", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());

    for method in ["GET", "DELETE"] {
        let (status, _, _) = send(&app, method, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _, _) = send(&app, "PATCH", &uri, Some(&bob), Some(json!({ "title": "Hijacked" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "GET", "/tasks/not-a-uuid", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, still) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(still["title"], "Alice only");
}

// ── Schedule ─────────────────────────────────────────────────────

async fn create_scenario(app: &Router, token: &str) {
    for body in [
        json!({ "title": "Low priority", "priority": "low" }),
        json!({ "title": "High late", "priority": "high", "due_date": due_in(5) }),
        json!({ "title": "High soon", "priority": "high", "due_date": due_in(2) }),
    ] {
        let (status, _, _) = send(app, "POST", "/tasks", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_optimize_stored_tasks_with_declared_priorities() {
    let mut config = Config::default();
    config.scorer.kind = "priority".into();
    let (app, _) = app_with(config);
    let token = register_and_login(&app, "sched@example.com").await;
    create_scenario(&app, &token).await;

    let (status, _, ranked) = send(&app, "POST", "/optimize-schedule", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&ranked), vec!["High soon", "High late", "Low priority"]);
}

#[tokio::test]
async fn test_optimize_persists_rule_priorities() {
    let (app, _) = app();
    let token = register_and_login(&app, "rules@example.com").await;
    create_scenario(&app, &token).await;
    send(
        &app,
        "POST",
        "/tasks",
        Some(&token),
        Some(json!({ "title": "Doctor visit", "category": "health", "difficulty": 4, "priority": "low" })),
    )
    .await;

    let (status, _, ranked) = send(&app, "POST", "/optimize-schedule", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&ranked),
        vec!["High soon", "High late", "Doctor visit", "Low priority"]
    );

    let (_, _, listed) = send(&app, "GET", "/tasks", Some(&token), None).await;
    for task in listed.as_array().unwrap() {
        let expected = if task["title"] == "Low priority" { "low" } else { "high" };
        assert_eq!(task["priority"], expected, "task {}", task["title"]);
    }
}

#[tokio::test]
async fn test_optimize_empty_is_empty() {
    let (app, _) = app();
    let token = register_and_login(&app, "empty@example.com").await;
    let (status, _, ranked) = send(&app, "POST", "/optimize-schedule", Some(&token), Some(json!({ "tasks": [] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranked, json!([]));
}

#[tokio::test]
async fn test_optimize_submitted_tasks_cannot_touch_foreign_records() {
    let (app, state) = app();
    let alice = register_and_login(&app, "owner@example.com").await;
    let mallory = register_and_login(&app, "mallory@example.com").await;

    let (_, _, victim) = send(
        &app,
        "POST",
        "/tasks",
        Some(&alice),
        Some(json!({ "title": "Alice chore", "category": "home", "priority": "low" })),
    )
    .await;

    // Resubmit Alice's task under Mallory's token, now due tomorrow.
    let mut forged = victim.clone();
    forged["due_date"] = json!(due_in(1));
    let (status, _, ranked) = send(
        &app,
        "POST",
        "/optimize-schedule",
        Some(&mallory),
        Some(json!({ "tasks": [forged, { "title": "Mallory idea" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&ranked), vec!["Alice chore", "Mallory idea"]);
    assert_eq!(ranked[0]["priority"], "high");

    let mallory_id = state.repo.users.find_by_email("mallory@example.com").unwrap().id;
    assert_eq!(ranked[0]["owner_id"], json!(mallory_id));

    let (_, _, untouched) = send(&app, "GET", &format!("/tasks/{}", victim["id"].as_str().unwrap()), Some(&alice), None).await;
    assert_eq!(untouched["priority"], "low");
    assert_eq!(state.repo.tasks.len(), 1);
}

#[tokio::test]
async fn test_optimize_rejects_malformed_body() {
    let (app, _) = app();
    let token = register_and_login(&app, "malformed@example.com").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/optimize-schedule",
        Some(&token),
        Some(json!({ "tasks": [{ "title": "x" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _, _) = send(
        &app,
        "POST",
        "/optimize-schedule",
        Some(&token),
        Some(json!({ "tasks": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .method("POST")
        .uri("/optimize-schedule")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"tasks\": ["))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid request body: "));
}

#[tokio::test]
async fn test_optimize_accepts_naive_record_timestamps() {
    let (app, _) = app();
    let token = register_and_login(&app, "replay@example.com").await;

    let (status, _, ranked) = send(
        &app,
        "POST",
        "/optimize-schedule",
        Some(&token),
        Some(json!({ "tasks": [{
            "title": "From client",
            "created_at": "2030-01-01T00:00:00.123456",
            "updated_at": "2030-01-01 00:00:00",
            "due_date": "2030-01-10T00:00:00"
        }] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", ranked);
    let task = &ranked[0];
    assert_eq!(task["title"], "From client");
    assert!(task["created_at"].as_str().unwrap().starts_with("2030-01-01T00:00:00.123456"));
    assert!(task["due_date"].as_str().unwrap().starts_with("2030-01-10T00:00:00"));
}

// ── Users ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_me_cascades_and_revokes() {
    let (app, state) = app();
    let token = register_and_login(&app, "leaving@example.com").await;
    let other = register_and_login(&app, "staying@example.com").await;
    send(&app, "POST", "/tasks", Some(&token), Some(json!({ "title": "Mine" }))).await;
    send(&app, "POST", "/tasks", Some(&token), Some(json!({ "title": "Also mine" }))).await;
    send(&app, "POST", "/tasks", Some(&other), Some(json!({ "title": "Not mine" }))).await;

    let (status, _, _) = send(&app, "DELETE", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.repo.tasks.len(), 1);
    assert_eq!(state.repo.users.len(), 1);

    let (status, _, _) = send(&app, "GET", "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Persistence ──────────────────────────────────────────────────

#[tokio::test]
async fn test_snapshots_survive_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.persist = true;
    config.storage.data_dir = tmp.path().to_path_buf();

    let (app, state) = app_with(config.clone());
    let token = register_and_login(&app, "durable@example.com").await;
    send(&app, "POST", "/tasks", Some(&token), Some(json!({ "title": "Survives" }))).await;
    kairos_server::startup::persist(&state).unwrap();

    let (app, _) = app_with(config);
    let (status, _, listed) = send(&app, "GET", "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&listed), vec!["Survives"]);
}
