//! Arbiter-mediated dispute endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use phoneswap_core::{ListingStatus, NotificationKind, OfferId, OfferStatus, Role};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::{MarketStore, OfferChange};

#[derive(Deserialize)]
pub struct OpenDisputeRequest {
    pub reason: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeResponse {
    pub success: bool,
    pub purchase_offer_id: u64,
    pub status: OfferStatus,
}

/// POST /api/trades/dispute/:purchaseOfferId
///
/// Either party may open a dispute once goods are in motion. The three
/// selected arbiters are notified to mediate.
pub async fn open_dispute<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
    Json(req): Json<OpenDisputeRequest>,
) -> Result<Json<DisputeResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let offer = state
        .store
        .get_offer(OfferId(purchase_offer_id))?
        .ok_or(ApiError::OfferNotFound)?;
    let listing = state
        .store
        .get_listing(offer.listing_id)?
        .ok_or(ApiError::ListingNotFound)?;

    if principal.user_id != offer.buyer_id && principal.user_id != listing.seller_id {
        return Err(ApiError::Forbidden);
    }
    if !matches!(
        offer.status,
        OfferStatus::SellerShipped | OfferStatus::GoodsReceived
    ) {
        return Err(ApiError::InvalidOfferStatus);
    }
    if req.reason.trim().is_empty() {
        return Err(ApiError::Validation("A dispute reason is required".to_string()));
    }

    let change = OfferChange::status(OfferStatus::DisputeOpened);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_listing_status(listing.id, ListingStatus::DisputeOpened)?;

    tracing::info!(offer = %offer.id.0, by = %principal.user_id, "Dispute opened");

    for arbiter in offer.selected_arbiters() {
        state.dispatch(
            arbiter,
            "Dispute mediation requested",
            &format!(
                "A dispute was opened on the trade for \"{}\": {}",
                listing.title,
                req.reason.trim()
            ),
            NotificationKind::DisputeRequests,
        );
    }
    let counterparty = if principal.user_id == offer.buyer_id {
        listing.seller_id
    } else {
        offer.buyer_id
    };
    state.dispatch(
        counterparty,
        "Dispute opened",
        &format!("{} opened a dispute on the trade for \"{}\".", principal.name, listing.title),
        NotificationKind::DisputeUpdates,
    );

    Ok(Json(DisputeResponse {
        success: true,
        purchase_offer_id: offer.id.0,
        status: OfferStatus::DisputeOpened,
    }))
}

#[derive(Deserialize)]
pub struct ResolveDisputeRequest {
    pub verdict: String,
    #[serde(default)]
    pub note: String,
}

/// POST /api/trades/dispute/:purchaseOfferId/resolve
///
/// Only one of the offer's three selected arbiters may resolve.
pub async fn resolve_dispute<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
    Json(req): Json<ResolveDisputeRequest>,
) -> Result<Json<DisputeResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;
    principal.require_role(Role::Arbiter)?;

    let offer = state
        .store
        .get_offer(OfferId(purchase_offer_id))?
        .ok_or(ApiError::OfferNotFound)?;
    let listing = state
        .store
        .get_listing(offer.listing_id)?
        .ok_or(ApiError::ListingNotFound)?;

    if !offer.selected_arbiters().contains(&principal.user_id) {
        return Err(ApiError::Forbidden);
    }
    if offer.status != OfferStatus::DisputeOpened {
        return Err(ApiError::InvalidOfferStatus);
    }
    if req.verdict.trim().is_empty() {
        return Err(ApiError::Validation("A verdict is required".to_string()));
    }

    let change = OfferChange::status(OfferStatus::DisputeResolved);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_listing_status(listing.id, ListingStatus::DisputeResolved)?;

    tracing::info!(offer = %offer.id.0, arbiter = %principal.user_id, "Dispute resolved");

    let message = if req.note.trim().is_empty() {
        format!(
            "Arbiter {} resolved the dispute on \"{}\": {}",
            principal.name,
            listing.title,
            req.verdict.trim()
        )
    } else {
        format!(
            "Arbiter {} resolved the dispute on \"{}\": {} ({})",
            principal.name,
            listing.title,
            req.verdict.trim(),
            req.note.trim()
        )
    };
    state.dispatch(
        offer.buyer_id,
        "Dispute resolved",
        &message,
        NotificationKind::DisputeUpdates,
    );
    state.dispatch(
        listing.seller_id,
        "Dispute resolved",
        &message,
        NotificationKind::DisputeUpdates,
    );

    Ok(Json(DisputeResponse {
        success: true,
        purchase_offer_id: offer.id.0,
        status: OfferStatus::DisputeResolved,
    }))
}
