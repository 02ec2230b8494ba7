//! Dev-only auth-status administration

mod common;

use common::{create_test_server, create_test_server_with_dev_mode, register};
use serde_json::{json, Value};

/// The admin surface does not exist outside dev mode
#[tokio::test]
async fn test_route_absent_in_production() {
    let (server, _) = create_test_server_with_dev_mode(false);
    register(&server, "kim", "password1").await;

    let response = server
        .put("/api/admin/users/auth-status")
        .json(&json!({ "userId": 1, "isSeller": true }))
        .await;
    assert_eq!(response.status_code(), 404);
}

/// user_status follows the verification-flag precedence table (P7,
/// through the API)
#[tokio::test]
async fn test_user_status_derivation() {
    let (server, _) = create_test_server();
    let user_id = register(&server, "kim", "password1").await;

    let cases = [
        (json!({ "verifiedEmail": true, "verifiedPhone": true, "verifiedUserId": true }), 7),
        (json!({ "verifiedUserId": false }), 6),
        (json!({ "verifiedPhone": false }), 3),
        (json!({ "verifiedEmail": false }), 0),
        (json!({ "verifiedPhone": true, "verifiedUserId": true }), 4),
        (json!({ "verifiedPhone": false }), 1),
    ];

    for (patch, expected) in cases {
        let mut body = json!({ "userId": user_id });
        for (key, value) in patch.as_object().unwrap() {
            body[key] = value.clone();
        }
        let response = server.put("/api/admin/users/auth-status").json(&body).await;
        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert_eq!(
            body["authStatus"]["userStatus"], expected,
            "wrong user_status for patch {:?}",
            patch
        );
    }
}

/// Patching an unknown user is 404
#[tokio::test]
async fn test_patch_unknown_user() {
    let (server, _) = create_test_server();

    let response = server
        .put("/api/admin/users/auth-status")
        .json(&json!({ "userId": 999, "isSeller": true }))
        .await;
    assert_eq!(response.status_code(), 404);
}

/// Flags unrelated to the patch survive it
#[tokio::test]
async fn test_patch_preserves_unrelated_flags() {
    let (server, _) = create_test_server();
    let user_id = register(&server, "kim", "password1").await;

    server
        .put("/api/admin/users/auth-status")
        .json(&json!({ "userId": user_id, "isSeller": true }))
        .await;
    let response = server
        .put("/api/admin/users/auth-status")
        .json(&json!({ "userId": user_id, "isArbiter": true }))
        .await;

    let body: Value = response.json();
    assert_eq!(body["authStatus"]["isSeller"], true);
    assert_eq!(body["authStatus"]["isArbiter"], true);
}
