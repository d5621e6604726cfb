use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use vigil::config::Config;
use vigil::models::account::Role;
use vigil::services::{AccountService, TokenService};
use vigil::state::SharedState;

async fn spawn_app() -> (Router, SharedState) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let shared = SharedState::new(config)
        .await
        .expect("Failed to create app state");
    let state = vigil::api::create_app_state(Arc::new(shared.clone()));
    let app = vigil::api::router(state).await;

    (app, shared)
}

/// Create an account and settle it past the forced-change state.
async fn seed_account(shared: &SharedState, handle: &str, role: Role, password: &str) -> i32 {
    let created = shared
        .accounts
        .bootstrap_account(handle, Some(&format!("{handle}@example.com")), role)
        .await
        .expect("Failed to seed account");

    shared
        .accounts
        .change_password(handle, &created.temporary_password, password)
        .await
        .expect("Failed to settle password");

    created.account.id
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Log in and return the session cookie for subsequent requests.
async fn login(app: &Router, handle: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"handle": handle, "password": password}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    response
        .headers()
        .get("set-cookie")
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (app, _shared) = spawn_app().await;

    for uri in ["/api/incidents", "/api/users", "/api/system/status"] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/incidents", Some("id=bogus-session")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_submission_and_admin_query() {
    let (app, shared) = spawn_app().await;
    seed_account(&shared, "admin", Role::PrimaryAdmin, "hunter42").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/incidents",
            None,
            json!({
                "incident_type": "Type 2 – Customer / Client / Patient",
                "incident_datetime": "2024-01-05T14:30",
                "location": "Warehouse B",
                "incident_description": "slip and fall",
                "persons_involved": "J. Doe"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(id > 0);

    let cookie = login(&app, "admin", "hunter42").await;
    let response = app
        .clone()
        .oneshot(get_request("/api/incidents?search=warehouse", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let incidents = body["data"]["incidents"].as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["reporter_name"], "Anonymous");
    assert_eq!(incidents[0]["location"], "Warehouse B");
}

#[tokio::test]
async fn test_incomplete_submission_rejected() {
    let (app, _shared) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/incidents",
            None,
            json!({"location": "Warehouse B"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_forced_change_locks_out_until_password_is_changed() {
    let (app, shared) = spawn_app().await;

    // Account fresh from creation, still on its temporary password
    let created = shared
        .accounts
        .bootstrap_account("jsmith", Some("jsmith@example.com"), Role::IncidentManager)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"handle": "jsmith", "password": created.temporary_password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // Every capability is denied until the password is changed
    let response = app
        .clone()
        .oneshot(get_request("/api/incidents", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The self-service change is still reachable
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/auth/password",
            Some(&cookie),
            json!({
                "current_password": created.temporary_password,
                "new_password": "chosen-by-user"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/incidents", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_capabilities_enforced() {
    let (app, shared) = spawn_app().await;
    seed_account(&shared, "admin", Role::PrimaryAdmin, "hunter42").await;
    seed_account(&shared, "manager", Role::IncidentManager, "manager-pw").await;

    let manager_cookie = login(&app, "manager", "manager-pw").await;

    // Dashboards are open to both roles
    let response = app
        .clone()
        .oneshot(get_request("/api/incidents", Some(&manager_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // User and notification management are PrimaryAdmin only
    let response = app
        .clone()
        .oneshot(get_request("/api/users", Some(&manager_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get_request("/api/system/notifications", Some(&manager_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, "admin", "hunter42").await;
    let response = app
        .clone()
        .oneshot(get_request("/api/users", Some(&admin_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_account_management_round_trip() {
    let (app, shared) = spawn_app().await;
    let admin_id = seed_account(&shared, "admin", Role::PrimaryAdmin, "hunter42").await;
    let cookie = login(&app, "admin", "hunter42").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&cookie),
            json!({"handle": "newbie", "contact": "newbie@example.com", "role": "incident_manager"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let temp_password = body["data"]["temporary_password"].as_str().unwrap().to_string();
    let newbie_id = body["data"]["account"]["id"].as_i64().unwrap();
    assert_eq!(temp_password.len(), 16);

    // The temporary password works and lands in the forced-change state
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"handle": "newbie", "password": temp_password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["password_change_required"], true);

    // Self-targeting admin operations are refused
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/users/{admin_id}/toggle"),
            Some(&cookie),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Deleting the other account works
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{newbie_id}"))
                .header("Cookie", &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_is_noncommittal() {
    let (app, shared) = spawn_app().await;
    // One account with no contact address on file
    shared
        .accounts
        .bootstrap_account("loner", None, Role::IncidentManager)
        .await
        .unwrap();

    let mut bodies = Vec::new();
    for handle in ["loner", "does-not-exist"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/forgot",
                None,
                json!({"handle": handle}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        bodies.push(body_json(response).await);
    }

    // Identical responses: account existence never leaks
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_reset_token_flow_via_api() {
    let (app, shared) = spawn_app().await;
    seed_account(&shared, "jsmith", Role::IncidentManager, "old-password").await;

    let issued = shared.tokens.issue("jsmith").await.unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/reset",
            None,
            json!({"token": issued.token, "new_password": "fresh-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // New password works, token is spent
    login(&app, "jsmith", "fresh-password").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/reset",
            None,
            json!({"token": issued.token, "new_password": "another-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_corrective_actions_update_via_api() {
    let (app, shared) = spawn_app().await;
    seed_account(&shared, "manager", Role::IncidentManager, "manager-pw").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/incidents",
            None,
            json!({
                "incident_type": "Type 1 – Criminal Intent",
                "incident_datetime": "2024-01-05T14:30",
                "location": "Dock 3",
                "incident_description": "break-in",
                "persons_involved": "unknown"
            }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let cookie = login(&app, "manager", "manager-pw").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/incidents/{id}/corrective-actions"),
            Some(&cookie),
            json!({"corrective_actions": "Locks replaced"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["corrective_actions"], "Locks replaced");
    assert_eq!(body["data"]["location"], "Dock 3");
}
