//! HTTP routes for the marketplace

mod accounts;
mod admin;
mod disputes;
mod fulfillment;
mod listings;
mod notifications;
mod trades;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::MarketStore;

/// Create the router with all routes
pub fn create_router<S, N>(state: Arc<AppState<S, N>>) -> Router
where
    S: MarketStore + 'static,
    N: Notifier + 'static,
{
    let mut router = Router::new()
        .route("/api/auth/register", post(accounts::register))
        .route("/api/auth/login", post(accounts::login))
        .route("/api/listings", post(listings::create_listing))
        .route("/api/listings/:listingId", get(listings::get_listing))
        .route("/api/trades/purchaseoffer/make", post(trades::make_offer))
        .route("/api/trades/decideoffer/:purchaseOfferId", post(trades::decide_offer))
        .route("/api/trades/purchaseoffers/current", get(trades::current_offers))
        .route("/api/trades/cancel/:purchaseOfferId", post(trades::cancel_offer))
        .route("/api/trades/payment/:purchaseOfferId", post(fulfillment::submit_payment_proof))
        .route("/api/trades/payment/:purchaseOfferId/verify", post(fulfillment::verify_payment))
        .route("/api/trades/ship/:purchaseOfferId", post(fulfillment::confirm_shipment))
        .route("/api/trades/receive/:purchaseOfferId", post(fulfillment::confirm_receipt))
        .route("/api/trades/complete/:purchaseOfferId", post(fulfillment::complete_trade))
        .route("/api/trades/dispute/:purchaseOfferId", post(disputes::open_dispute))
        .route("/api/trades/dispute/:purchaseOfferId/resolve", post(disputes::resolve_dispute))
        .route("/api/notifications/counters", get(notifications::get_counters))
        .route("/api/notifications/counters/reset", post(notifications::reset_counter));

    // Administrative mutation of auth status is a dev-only surface; the
    // route does not exist at all outside dev mode.
    if state.dev_mode {
        router = router.route("/api/admin/users/auth-status", put(admin::update_auth_status));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
