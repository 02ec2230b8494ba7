//! Dispute lifecycle: opening once goods are in motion, arbiter-only
//! resolution

mod common;

use axum::http::header::AUTHORIZATION;
use common::{
    accept_offer, bearer, create_test_server, find_offer, listing_status, login, make_offer,
    register, setup_trade, TradeSetup,
};
use axum_test::TestServer;
use phoneswap_core::NotificationKind;
use serde_json::{json, Value};

/// Drive a trade to SellerShipped and return the offer id
async fn shipped_offer(server: &TestServer, trade: &TradeSetup) -> u64 {
    let offer_id = make_offer(server, &trade.buyer_token, trade.listing_id, &trade.arbiter_ids).await;
    accept_offer(server, &trade.seller_token, offer_id, &trade.arbiter_ids[..3]).await;

    let response = server
        .post(&format!("/api/trades/payment/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.buyer_token))
        .json(&json!({ "amountCents": 25000, "photoUrls": ["https://img.example/receipt.jpg"] }))
        .await;
    assert_eq!(response.status_code(), 201);

    register(server, "verifier", "deskpassword#staff").await;
    let staff = login(server, "verifier", "deskpassword#staff", &["staff"]).await;
    let response = server
        .post(&format!("/api/trades/payment/{}/verify", offer_id))
        .add_header(AUTHORIZATION, bearer(&staff))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .post(&format!("/api/trades/ship/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.seller_token))
        .await;
    assert_eq!(response.status_code(), 200);

    offer_id
}

/// Opening a dispute notifies the selected panel
#[tokio::test]
async fn test_open_dispute() {
    let (server, notifier) = create_test_server();
    let trade = setup_trade(&server).await;
    let offer_id = shipped_offer(&server, &trade).await;

    let response = server
        .post(&format!("/api/trades/dispute/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.buyer_token))
        .json(&json!({ "reason": "Screen is cracked, not as described" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let offer = find_offer(&server, &trade.buyer_token, offer_id).await.unwrap();
    assert_eq!(offer["status"], "DisputeOpened");
    assert_eq!(listing_status(&server, trade.listing_id).await, "DisputeOpened");

    // Each selected arbiter got a mediation request
    for arbiter in &trade.arbiter_ids[..3] {
        let sent = notifier.sent_to(*arbiter);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::DisputeRequests);
    }
    // The unselected candidate did not
    assert!(notifier.sent_to(trade.arbiter_ids[3]).is_empty());
}

/// A dispute cannot be opened before shipment
#[tokio::test]
async fn test_dispute_before_shipment() {
    let (server, _) = create_test_server();
    let trade = setup_trade(&server).await;
    let offer_id = make_offer(&server, &trade.buyer_token, trade.listing_id, &trade.arbiter_ids).await;
    accept_offer(&server, &trade.seller_token, offer_id, &trade.arbiter_ids[..3]).await;

    let response = server
        .post(&format!("/api/trades/dispute/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.buyer_token))
        .json(&json!({ "reason": "cold feet" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_OFFER_STATUS");
}

/// Only a selected arbiter may resolve; panel membership alone is not
/// enough without the arbiter role in the credential
#[tokio::test]
async fn test_resolution_authorization() {
    let (server, notifier) = create_test_server();
    let trade = setup_trade(&server).await;
    let offer_id = shipped_offer(&server, &trade).await;

    server
        .post(&format!("/api/trades/dispute/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.buyer_token))
        .json(&json!({ "reason": "Screen is cracked" }))
        .await;

    // A party to the trade cannot resolve
    let response = server
        .post(&format!("/api/trades/dispute/{}/resolve", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.seller_token))
        .json(&json!({ "verdict": "refund the buyer" }))
        .await;
    assert_eq!(response.status_code(), 403);

    // The unselected candidate arbiter cannot resolve
    let unselected = login(&server, "arbiter4", "arbiterpass", &["arbiter"]).await;
    let response = server
        .post(&format!("/api/trades/dispute/{}/resolve", offer_id))
        .add_header(AUTHORIZATION, bearer(&unselected))
        .json(&json!({ "verdict": "refund the buyer" }))
        .await;
    assert_eq!(response.status_code(), 403);

    // A selected arbiter can
    let selected = login(&server, "arbiter1", "arbiterpass", &["arbiter"]).await;
    let response = server
        .post(&format!("/api/trades/dispute/{}/resolve", offer_id))
        .add_header(AUTHORIZATION, bearer(&selected))
        .json(&json!({ "verdict": "refund the buyer", "note": "photos confirm the damage" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let offer = find_offer(&server, &trade.buyer_token, offer_id).await.unwrap();
    assert_eq!(offer["status"], "DisputeResolved");
    assert_eq!(listing_status(&server, trade.listing_id).await, "DisputeResolved");

    // Both parties got the verdict
    assert!(notifier
        .sent_to(trade.buyer_id)
        .iter()
        .any(|n| n.kind == NotificationKind::DisputeUpdates));
    assert!(notifier
        .sent_to(trade.seller_id)
        .iter()
        .any(|n| n.kind == NotificationKind::DisputeUpdates));
}

/// Resolution is terminal: a second verdict bounces
#[tokio::test]
async fn test_resolution_is_terminal() {
    let (server, _) = create_test_server();
    let trade = setup_trade(&server).await;
    let offer_id = shipped_offer(&server, &trade).await;

    server
        .post(&format!("/api/trades/dispute/{}", offer_id))
        .add_header(AUTHORIZATION, bearer(&trade.buyer_token))
        .json(&json!({ "reason": "Screen is cracked" }))
        .await;

    let selected = login(&server, "arbiter1", "arbiterpass", &["arbiter"]).await;

    let response = server
        .post(&format!("/api/trades/dispute/{}/resolve", offer_id))
        .add_header(AUTHORIZATION, bearer(&selected))
        .json(&json!({ "verdict": "refund the buyer" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .post(&format!("/api/trades/dispute/{}/resolve", offer_id))
        .add_header(AUTHORIZATION, bearer(&selected))
        .json(&json!({ "verdict": "pay the seller" }))
        .await;
    assert_eq!(response.status_code(), 400);
}
