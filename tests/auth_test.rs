//! Session token and registration integration tests

mod common;

use common::*;
use hyper::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_protected_routes_require_token() {
    let state = state();

    for (method, uri) in [
        (Method::GET, "/questions"),
        (Method::GET, "/statistics"),
        (Method::POST, "/bulk-upload"),
        (Method::DELETE, "/clear-database"),
        (Method::GET, "/auth/me"),
    ] {
        let reply = send(&state, empty_request(method.clone(), uri, None)).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert!(reply.json()["error"].is_string());
    }
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let state = state();
    let reply = send(&state, empty_request(Method::GET, "/questions", Some("not-a-jwt"))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"], "Invalid token");
}

#[tokio::test]
async fn test_login_returns_usable_token() {
    let state = state();
    let token = login(&state).await;

    let reply = send(&state, empty_request(Method::GET, "/auth/me", Some(&token))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let claims = reply.json();
    assert_eq!(claims["email"], ADMIN);
    assert_eq!(claims["role"], "admin");
    assert!(claims["exp"].as_u64().unwrap() > claims["iat"].as_u64().unwrap());
}

#[tokio::test]
async fn test_login_rejects_other_email() {
    let state = state();
    let reply = send(
        &state,
        json_request(
            Method::POST,
            "/auth/login",
            "",
            json!({ "email": "someone@example.com", "password": "x" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_dev_mode_skips_guard() {
    let state = state_with(&["--dev-mode"]);
    let reply = send(&state, empty_request(Method::GET, "/questions", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!([]));
}

#[tokio::test]
async fn test_register_disabled_by_default() {
    let state = state();
    let reply = send(
        &state,
        json_request(
            Method::POST,
            "/auth/register",
            "",
            json!({ "email": "a@b.c", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_flow() {
    let state = state_with(&["--allow-registration"]);
    let body = json!({ "email": "staff@preplens.com", "password": "hunter22" });

    let reply = send(&state, json_request(Method::POST, "/auth/register", "", body.clone())).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["message"], "Admin user created");

    let reply = send(&state, json_request(Method::POST, "/auth/register", "", body)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    let reply = send(
        &state,
        json_request(Method::POST, "/auth/register", "", json!({ "email": "x@y.z" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preflight_and_unknown_route() {
    let state = state();

    let reply = send(&state, empty_request(Method::OPTIONS, "/questions", None)).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert_eq!(reply.headers["access-control-allow-origin"], "*");

    let reply = send(&state, empty_request(Method::GET, "/nope", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_memory_store() {
    let state = state();
    let reply = send(&state, empty_request(Method::GET, "/health", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["healthy"], true);
    assert_eq!(body["store"], "memory");
    assert_eq!(body["imageStorage"], false);

    let reply = send(&state, empty_request(Method::GET, "/ready", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
}
