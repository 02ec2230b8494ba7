//! Common test utilities for marketplace integration tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum_test::TestServer;
use serde_json::{json, Value};

use phoneswap_core::{NotificationKind, UserId};
use phoneswap_server::{routes, AppState, InMemoryStore, Notifier};

pub const TEST_SECRET: &str = "integration-test-secret";

/// A notification captured by the mock channel
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub user_id: UserId,
    pub subject: String,
    pub message: String,
    pub kind: NotificationKind,
}

/// Mock notifier that captures deliveries and can be told to fail
#[derive(Default, Clone)]
pub struct MockNotifier {
    pub sent: Arc<RwLock<Vec<SentNotification>>>,
    pub fail: Arc<AtomicBool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications delivered to a user, oldest first
    pub fn sent_to(&self, user_id: u64) -> Vec<SentNotification> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == UserId(user_id))
            .cloned()
            .collect()
    }

    /// Make every subsequent delivery fail
    pub fn fail_deliveries(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl Notifier for MockNotifier {
    fn notify(
        &self,
        user_id: UserId,
        subject: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("mock delivery failure".to_string());
        }
        self.sent.write().unwrap().push(SentNotification {
            user_id,
            subject: subject.to_string(),
            message: message.to_string(),
            kind,
        });
        Ok(())
    }
}

/// Create a test server (dev mode on, so the admin surface is routed)
pub fn create_test_server() -> (TestServer, MockNotifier) {
    create_test_server_with_dev_mode(true)
}

pub fn create_test_server_with_dev_mode(dev_mode: bool) -> (TestServer, MockNotifier) {
    let notifier = MockNotifier::new();
    let state = Arc::new(AppState::new(
        InMemoryStore::new(),
        notifier.clone(),
        TEST_SECRET,
        60,
        dev_mode,
    ));
    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, notifier)
}

/// Bearer header value for a token
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// Register a user and return their id
pub async fn register(server: &TestServer, name: &str, password: &str) -> u64 {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "name": name, "password": password }))
        .await;
    assert_eq!(response.status_code(), 201, "register failed: {}", response.text());
    let body: Value = response.json();
    body["userId"].as_u64().expect("No userId in response")
}

/// Log in requesting the given roles, returning the issued credential
pub async fn login(server: &TestServer, name: &str, password: &str, roles: &[&str]) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "name": name, "password": password, "roles": roles }))
        .await;
    assert_eq!(response.status_code(), 200, "login failed: {}", response.text());
    let body: Value = response.json();
    body["token"].as_str().expect("No token in response").to_string()
}

/// Flip auth-status flags through the dev-only admin surface
pub async fn set_auth_flags(server: &TestServer, user_id: u64, patch: Value) {
    let mut body = json!({ "userId": user_id });
    for (key, value) in patch.as_object().unwrap() {
        body[key] = value.clone();
    }
    let response = server.put("/api/admin/users/auth-status").json(&body).await;
    assert_eq!(response.status_code(), 200, "auth-status update failed: {}", response.text());
}

/// Create a listing as the given seller, returning its id
pub async fn create_listing(server: &TestServer, seller_token: &str, title: &str) -> u64 {
    let response = server
        .post("/api/listings")
        .add_header(AUTHORIZATION, bearer(seller_token))
        .json(&json!({ "title": title, "priceCents": 25000 }))
        .await;
    assert_eq!(response.status_code(), 201, "create listing failed: {}", response.text());
    let body: Value = response.json();
    body["listingId"].as_u64().expect("No listingId in response")
}

/// Fetch a listing's status string
pub async fn listing_status(server: &TestServer, listing_id: u64) -> String {
    let response = server.get(&format!("/api/listings/{}", listing_id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["listing"]["status"].as_str().unwrap().to_string()
}

/// A fully seeded trade scenario: one seller with a listing, one buyer,
/// and four users holding arbiter standing.
pub struct TradeSetup {
    pub buyer_id: u64,
    pub seller_id: u64,
    pub buyer_token: String,
    pub seller_token: String,
    pub listing_id: u64,
    pub arbiter_ids: Vec<u64>,
}

pub async fn setup_trade(server: &TestServer) -> TradeSetup {
    let seller_id = register(server, "seller", "sellerpass").await;
    set_auth_flags(server, seller_id, json!({ "isSeller": true })).await;
    let seller_token = login(server, "seller", "sellerpass", &["seller"]).await;

    let buyer_id = register(server, "buyer", "buyerpass1").await;
    let buyer_token = login(server, "buyer", "buyerpass1", &["buyer"]).await;

    let mut arbiter_ids = Vec::new();
    for i in 1..=4 {
        let id = register(server, &format!("arbiter{}", i), "arbiterpass").await;
        set_auth_flags(server, id, json!({ "isArbiter": true })).await;
        arbiter_ids.push(id);
    }

    let listing_id = create_listing(server, &seller_token, "Pixel 7 Pro, 128 GB").await;

    TradeSetup {
        buyer_id,
        seller_id,
        buyer_token,
        seller_token,
        listing_id,
        arbiter_ids,
    }
}

/// Make an offer as the buyer, returning the offer id
pub async fn make_offer(
    server: &TestServer,
    buyer_token: &str,
    listing_id: u64,
    arbiter_ids: &[u64],
) -> u64 {
    let response = server
        .post("/api/trades/purchaseoffer/make")
        .add_header(AUTHORIZATION, bearer(buyer_token))
        .json(&json!({ "phonePostIdFk": listing_id, "arbiterUserIds": arbiter_ids }))
        .await;
    assert_eq!(response.status_code(), 201, "make offer failed: {}", response.text());
    let body: Value = response.json();
    body["purchaseOfferId"].as_u64().expect("No purchaseOfferId")
}

/// Accept an offer as the seller with the given arbiter selection
pub async fn accept_offer(
    server: &TestServer,
    seller_token: &str,
    offer_id: u64,
    selected: &[u64],
) {
    let response = server
        .post(&format!("/api/trades/decideoffer/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(seller_token))
        .json(&json!({ "status": "AcceptedBySeller", "selectedArbiterIds": selected }))
        .await;
    assert_eq!(response.status_code(), 200, "accept failed: {}", response.text());
}

/// Fetch an offer as seen through the current-offers listing
pub async fn find_offer(server: &TestServer, token: &str, offer_id: u64) -> Option<Value> {
    let response = server
        .get("/api/trades/purchaseoffers/current")
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["offers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["id"].as_u64() == Some(offer_id))
        .cloned()
}
