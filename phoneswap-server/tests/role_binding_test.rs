//! Role binding across login and request authorization
//!
//! A role is granted iff the capability flag is true AND the presented
//! credential contains the role-hash fragment recorded at issuance.

mod common;

use axum::http::header::AUTHORIZATION;
use common::{bearer, create_test_server, login, register, set_auth_flags};
use serde_json::{json, Value};

/// Test: login with an unknown role name fails loudly
#[tokio::test]
async fn test_login_unknown_role_rejected() {
    let (server, _) = create_test_server();
    register(&server, "kim", "password1").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "kim", "password": "password1", "roles": ["superuser"] }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

/// Test: requesting a role without its capability flag is 403
#[tokio::test]
async fn test_login_role_without_flag_rejected() {
    let (server, _) = create_test_server();
    register(&server, "kim", "password1").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "kim", "password": "password1", "roles": ["seller"] }))
        .await;

    assert_eq!(response.status_code(), 403);
}

/// Test: wrong password is 401 regardless of roles
#[tokio::test]
async fn test_login_wrong_password() {
    let (server, _) = create_test_server();
    register(&server, "kim", "password1").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "kim", "password": "wrong-password", "roles": ["buyer"] }))
        .await;

    assert_eq!(response.status_code(), 401);
}

/// Test: issued roles come back out of the credential on a request
#[tokio::test]
async fn test_granted_roles_are_provable() {
    let (server, _) = create_test_server();
    let user_id = register(&server, "kim", "password1").await;
    set_auth_flags(&server, user_id, json!({ "isSeller": true })).await;

    let token = login(&server, "kim", "password1", &["buyer", "seller"]).await;

    // Seller-only surface accepts the credential
    let response = server
        .post("/api/listings")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Galaxy S22", "priceCents": 30000 }))
        .await;
    assert_eq!(response.status_code(), 201);
}

/// Test: revoking the capability flag flips authorization without
/// touching the credential (P1)
#[tokio::test]
async fn test_flag_revocation_denies_existing_credential() {
    let (server, _) = create_test_server();
    let user_id = register(&server, "kim", "password1").await;
    set_auth_flags(&server, user_id, json!({ "isSeller": true })).await;
    let token = login(&server, "kim", "password1", &["seller"]).await;

    set_auth_flags(&server, user_id, json!({ "isSeller": false })).await;

    let response = server
        .post("/api/listings")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Galaxy S22", "priceCents": 30000 }))
        .await;
    assert_eq!(response.status_code(), 403);
}

/// Test: a later login invalidates the fragment binding of the earlier
/// credential for that role (P1)
#[tokio::test]
async fn test_stale_credential_loses_role_binding() {
    let (server, _) = create_test_server();
    let user_id = register(&server, "kim", "password1").await;
    set_auth_flags(&server, user_id, json!({ "isSeller": true })).await;

    let old_token = login(&server, "kim", "password1", &["seller"]).await;
    // Second login overwrites the stored seller fragment
    let _new_token = login(&server, "kim", "password1", &["seller"]).await;

    let response = server
        .post("/api/listings")
        .add_header(AUTHORIZATION, bearer(&old_token))
        .json(&json!({ "title": "Galaxy S22", "priceCents": 30000 }))
        .await;
    assert_eq!(response.status_code(), 403);
}

/// Test: no credential at all is 401
#[tokio::test]
async fn test_missing_credential_is_401() {
    let (server, _) = create_test_server();

    let response = server
        .post("/api/listings")
        .json(&json!({ "title": "Galaxy S22", "priceCents": 30000 }))
        .await;
    assert_eq!(response.status_code(), 401);
}

/// Test: admin login requires the password marker, not just the flag
#[tokio::test]
async fn test_admin_requires_password_marker() {
    let (server, _) = create_test_server();

    // Registered with the admin marker suffix
    register(&server, "ops", "opspassword#admin").await;

    // Base password alone cannot claim admin
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "ops", "password": "opspassword", "roles": ["admin"] }))
        .await;
    assert_eq!(response.status_code(), 403);

    // The marked password can
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "ops", "password": "opspassword#admin", "roles": ["admin"] }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Test: a staff-marked password cannot claim admin
#[tokio::test]
async fn test_staff_marker_does_not_grant_admin() {
    let (server, _) = create_test_server();
    register(&server, "helpdesk", "deskpassword#staff").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "helpdesk", "password": "deskpassword#staff", "roles": ["admin"] }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": "helpdesk", "password": "deskpassword#staff", "roles": ["staff"] }))
        .await;
    assert_eq!(response.status_code(), 200);
}
