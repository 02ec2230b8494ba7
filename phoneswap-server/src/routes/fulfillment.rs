//! Post-acceptance trade progression: payment proof, verification,
//! shipment, receipt, completion

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use phoneswap_core::{ListingStatus, NotificationKind, OfferId, OfferStatus, PaymentStatus, Role};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::{Listing, MarketStore, OfferChange, PurchaseOffer};

/// Load an offer and its listing, or 404
fn load_trade<S, N>(
    state: &AppState<S, N>,
    purchase_offer_id: u64,
) -> Result<(PurchaseOffer, Listing), ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let offer = state
        .store
        .get_offer(OfferId(purchase_offer_id))?
        .ok_or(ApiError::OfferNotFound)?;
    let listing = state
        .store
        .get_listing(offer.listing_id)?
        .ok_or(ApiError::ListingNotFound)?;
    Ok((offer, listing))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProofRequest {
    pub amount_cents: i64,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProofResponse {
    pub success: bool,
    pub payment_id: u64,
}

/// POST /api/trades/payment/:purchaseOfferId
///
/// The buyer submits payment evidence against an accepted offer. The
/// offer moves to `AwaitingPaymentVerification`, a state of its own; it
/// never returns to `Pending`.
pub async fn submit_payment_proof<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
    Json(req): Json<PaymentProofRequest>,
) -> Result<(StatusCode, Json<PaymentProofResponse>), ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let (offer, listing) = load_trade(&state, purchase_offer_id)?;

    if principal.user_id != offer.buyer_id {
        return Err(ApiError::Forbidden);
    }
    if offer.status != OfferStatus::AcceptedBySeller {
        return Err(ApiError::InvalidOfferStatus);
    }
    if req.amount_cents <= 0 {
        return Err(ApiError::Validation("Amount must be positive".to_string()));
    }
    if req.photo_urls.is_empty() {
        return Err(ApiError::Validation(
            "At least one payment photo is required".to_string(),
        ));
    }

    // Claim the transition first so a racing submission cannot create a
    // second payment row against the same offer.
    let change = OfferChange::status(OfferStatus::AwaitingPaymentVerification);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }

    let payment_id =
        state
            .store
            .create_payment(offer.id, offer.buyer_id, req.amount_cents, &req.photo_urls)?;

    tracing::info!(offer = %offer.id.0, payment = %payment_id.0, "Payment proof submitted");

    state.dispatch(
        listing.seller_id,
        "Payment proof submitted",
        &format!(
            "{} submitted payment proof for \"{}\". It is awaiting verification.",
            principal.name, listing.title
        ),
        NotificationKind::Purchases,
    );

    Ok((
        StatusCode::CREATED,
        Json(PaymentProofResponse {
            success: true,
            payment_id: payment_id.0,
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub success: bool,
    pub purchase_offer_id: u64,
    pub status: OfferStatus,
}

/// POST /api/trades/payment/:purchaseOfferId/verify
///
/// Staff confirmation that the submitted payment proof checks out.
pub async fn verify_payment<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
) -> Result<Json<TransitionResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;
    principal.require_any(&[Role::Staff, Role::Admin])?;

    let (offer, listing) = load_trade(&state, purchase_offer_id)?;

    if offer.status != OfferStatus::AwaitingPaymentVerification {
        return Err(ApiError::InvalidOfferStatus);
    }
    let payment = state
        .store
        .get_payment_for_offer(offer.id)?
        .ok_or(ApiError::PaymentNotFound)?;

    let change = OfferChange::status(OfferStatus::BuyerPaid);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_payment_status(payment.id, PaymentStatus::Verified)?;

    tracing::info!(offer = %offer.id.0, payment = %payment.id.0, "Payment verified");

    state.dispatch(
        offer.buyer_id,
        "Payment verified",
        &format!("Your payment for \"{}\" was verified.", listing.title),
        NotificationKind::Purchases,
    );
    state.dispatch(
        listing.seller_id,
        "Payment verified",
        &format!("Payment for \"{}\" was verified. Please ship the device.", listing.title),
        NotificationKind::Purchases,
    );

    Ok(Json(TransitionResponse {
        success: true,
        purchase_offer_id: offer.id.0,
        status: OfferStatus::BuyerPaid,
    }))
}

/// POST /api/trades/ship/:purchaseOfferId
pub async fn confirm_shipment<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
) -> Result<Json<TransitionResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let (offer, listing) = load_trade(&state, purchase_offer_id)?;

    if principal.user_id != listing.seller_id {
        return Err(ApiError::Forbidden);
    }
    if offer.status != OfferStatus::BuyerPaid {
        return Err(ApiError::InvalidOfferStatus);
    }

    let change = OfferChange::status(OfferStatus::SellerShipped);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_listing_status(listing.id, ListingStatus::Shipped)?;

    tracing::info!(offer = %offer.id.0, "Shipment confirmed");

    state.dispatch(
        offer.buyer_id,
        "Device shipped",
        &format!("\"{}\" is on its way. Confirm receipt when it arrives.", listing.title),
        NotificationKind::Purchases,
    );

    Ok(Json(TransitionResponse {
        success: true,
        purchase_offer_id: offer.id.0,
        status: OfferStatus::SellerShipped,
    }))
}

/// POST /api/trades/receive/:purchaseOfferId
pub async fn confirm_receipt<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
) -> Result<Json<TransitionResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let (offer, listing) = load_trade(&state, purchase_offer_id)?;

    if principal.user_id != offer.buyer_id {
        return Err(ApiError::Forbidden);
    }
    if offer.status != OfferStatus::SellerShipped {
        return Err(ApiError::InvalidOfferStatus);
    }

    let change = OfferChange::status(OfferStatus::GoodsReceived);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_listing_status(listing.id, ListingStatus::GoodsReceived)?;

    tracing::info!(offer = %offer.id.0, "Receipt confirmed");

    state.dispatch(
        listing.seller_id,
        "Device received",
        &format!("The buyer confirmed receipt of \"{}\".", listing.title),
        NotificationKind::Purchases,
    );

    Ok(Json(TransitionResponse {
        success: true,
        purchase_offer_id: offer.id.0,
        status: OfferStatus::GoodsReceived,
    }))
}

/// POST /api/trades/complete/:purchaseOfferId
pub async fn complete_trade<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
) -> Result<Json<TransitionResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let (offer, listing) = load_trade(&state, purchase_offer_id)?;

    if principal.user_id != offer.buyer_id && principal.user_id != listing.seller_id {
        return Err(ApiError::Forbidden);
    }
    if offer.status != OfferStatus::GoodsReceived {
        return Err(ApiError::InvalidOfferStatus);
    }

    let change = OfferChange::status(OfferStatus::Completed);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state.store.set_listing_status(listing.id, ListingStatus::Sold)?;

    tracing::info!(offer = %offer.id.0, "Trade completed");

    state.dispatch(
        offer.buyer_id,
        "Trade completed",
        &format!("Your purchase of \"{}\" is complete.", listing.title),
        NotificationKind::Purchases,
    );
    state.dispatch(
        listing.seller_id,
        "Trade completed",
        &format!("The sale of \"{}\" is complete.", listing.title),
        NotificationKind::Purchases,
    );

    Ok(Json(TransitionResponse {
        success: true,
        purchase_offer_id: offer.id.0,
        status: OfferStatus::Completed,
    }))
}
