//! Purchase-offer endpoints: creation, seller review, listing, cancellation

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use phoneswap_core::offer::{validate_candidates, validate_selection};
use phoneswap_core::{ListingId, ListingStatus, NotificationKind, OfferId, OfferStatus, Role, UserId};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::{accepted_slots, Listing, MarketStore, OfferChange, PurchaseOffer};

/// Hours the buyer has to submit payment proof after acceptance
const PAYMENT_WINDOW_HOURS: u32 = 48;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeOfferRequest {
    pub phone_post_id_fk: u64,
    pub arbiter_user_ids: Vec<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeOfferResponse {
    pub success: bool,
    pub purchase_offer_id: u64,
}

/// POST /api/trades/purchaseoffer/make
pub async fn make_offer<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Json(req): Json<MakeOfferRequest>,
) -> Result<(StatusCode, Json<MakeOfferResponse>), ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;
    principal.require_role(Role::Buyer)?;

    let listing = state
        .store
        .get_listing(ListingId(req.phone_post_id_fk))?
        .ok_or(ApiError::ListingNotFound)?;

    if listing.status != ListingStatus::Available {
        return Err(ApiError::ListingUnavailable);
    }
    if listing.seller_id == principal.user_id {
        return Err(ApiError::Forbidden);
    }

    let candidates: Vec<UserId> = req.arbiter_user_ids.iter().copied().map(UserId).collect();
    validate_candidates(principal.user_id, listing.seller_id, &candidates)?;

    // Every candidate must currently hold arbiter standing; reject the
    // whole set with the offending ids, writing nothing.
    let mut invalid_ids = Vec::new();
    for candidate in &candidates {
        let is_arbiter = state
            .store
            .get_auth_status(*candidate)?
            .map(|s| s.is_arbiter)
            .unwrap_or(false);
        if !is_arbiter {
            invalid_ids.push(candidate.0);
        }
    }
    if !invalid_ids.is_empty() {
        return Err(ApiError::InvalidArbiters { invalid_ids });
    }

    let offer_id = state
        .store
        .create_offer(listing.id, principal.user_id, &candidates)?;
    state
        .store
        .set_listing_status(listing.id, ListingStatus::OfferPending)?;

    tracing::info!(offer = %offer_id.0, listing = %listing.id.0, buyer = %principal.user_id, "Purchase offer created");

    state.dispatch(
        listing.seller_id,
        "New purchase offer",
        &format!(
            "{} made an offer on your listing \"{}\". Review it to accept or reject.",
            principal.name, listing.title
        ),
        NotificationKind::Offers,
    );

    Ok((
        StatusCode::CREATED,
        Json(MakeOfferResponse {
            success: true,
            purchase_offer_id: offer_id.0,
        }),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideOfferRequest {
    pub status: String,
    #[serde(default)]
    pub selected_arbiter_ids: Option<Vec<u64>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideOfferResponse {
    pub success: bool,
    pub message: String,
    pub purchase_offer_id: u64,
}

/// POST /api/trades/decideoffer/:purchaseOfferId
///
/// Seller review of a pending offer. Checks run in a fixed order:
/// caller identity, offer status, selection arity, candidate-set
/// membership, then current arbiter standing. A candidate who lost
/// arbiter standing since creation destroys the offer row rather than
/// leaving an accepted offer referencing a non-arbiter.
pub async fn decide_offer<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
    Json(req): Json<DecideOfferRequest>,
) -> Result<Json<DecideOfferResponse>, ApiError>
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

    // (1) Only the listing's seller, never the buyer themself
    if principal.user_id == offer.buyer_id || principal.user_id != listing.seller_id {
        return Err(ApiError::Forbidden);
    }
    principal.require_role(Role::Seller)?;

    // (2) Only a pending offer can be decided
    if offer.status != OfferStatus::Pending {
        return Err(ApiError::InvalidOfferStatus);
    }

    let DecideOfferRequest {
        status,
        selected_arbiter_ids,
    } = req;
    match status.as_str() {
        "AcceptedBySeller" => {
            accept_offer(&state, &principal.name, offer, listing, selected_arbiter_ids).await
        }
        "RejectedBySeller" => reject_offer(&state, offer, listing).await,
        other => Err(ApiError::Validation(format!(
            "Decision must be AcceptedBySeller or RejectedBySeller, got {}",
            other
        ))),
    }
}

async fn accept_offer<S, N>(
    state: &AppState<S, N>,
    seller_name: &str,
    offer: PurchaseOffer,
    listing: Listing,
    selected_arbiter_ids: Option<Vec<u64>>,
) -> Result<Json<DecideOfferResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    // (3) + (4) exactly three, all drawn from the original candidates
    let selection: Vec<UserId> = selected_arbiter_ids
        .ok_or_else(|| ApiError::Validation("selectedArbiterIds is required".to_string()))?
        .into_iter()
        .map(UserId)
        .collect();
    validate_selection(&offer.arbiter_ids(), &selection)?;

    // (5) every selected candidate must still hold arbiter standing
    let mut invalid_ids = Vec::new();
    for selected in &selection {
        let is_arbiter = state
            .store
            .get_auth_status(*selected)?
            .map(|s| s.is_arbiter)
            .unwrap_or(false);
        if !is_arbiter {
            invalid_ids.push(selected.0);
        }
    }
    if !invalid_ids.is_empty() {
        // Fail destructively rather than silently re-open: the offer row
        // is deleted, the listing is released, and the buyer is told.
        state.store.delete_offer(offer.id)?;
        state
            .store
            .set_listing_status(listing.id, ListingStatus::Available)?;

        tracing::warn!(
            offer = %offer.id.0,
            invalid = ?invalid_ids,
            "Offer deleted: candidate arbiters lost standing between creation and review"
        );

        state.dispatch(
            offer.buyer_id,
            "Purchase offer removed",
            &format!(
                "Your offer on \"{}\" was removed because proposed arbiters are no longer available. Please make a new offer.",
                listing.title
            ),
            NotificationKind::SystemNotes,
        );

        return Err(ApiError::ArbitersNoLongerValid { invalid_ids });
    }

    // Selection into slots 1..3, slots 4..6 cleared
    let change = OfferChange {
        status: OfferStatus::AcceptedBySeller,
        arbiters: Some(accepted_slots(&selection)),
    };
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        // Another review won the race; same answer as arriving late
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_listing_status(listing.id, ListingStatus::OfferAccepted)?;

    tracing::info!(offer = %offer.id.0, "Offer accepted by seller");

    state.dispatch(
        offer.buyer_id,
        "Offer accepted",
        &format!(
            "{} accepted your offer on \"{}\". Submit your payment proof within {} hours.",
            seller_name, listing.title, PAYMENT_WINDOW_HOURS
        ),
        NotificationKind::Accepts,
    );

    Ok(Json(DecideOfferResponse {
        success: true,
        message: "Offer accepted".to_string(),
        purchase_offer_id: offer.id.0,
    }))
}

async fn reject_offer<S, N>(
    state: &AppState<S, N>,
    offer: PurchaseOffer,
    listing: Listing,
) -> Result<Json<DecideOfferResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let change = OfferChange::status(OfferStatus::RejectedBySeller);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }
    state
        .store
        .set_listing_status(listing.id, ListingStatus::Available)?;

    tracing::info!(offer = %offer.id.0, "Offer rejected by seller");

    state.dispatch(
        offer.buyer_id,
        "Offer rejected",
        &format!("The seller rejected your offer on \"{}\".", listing.title),
        NotificationKind::RejectOffers,
    );

    Ok(Json(DecideOfferResponse {
        success: true,
        message: "Offer rejected".to_string(),
        purchase_offer_id: offer.id.0,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOffersQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOffersResponse {
    pub success: bool,
    pub offers: Vec<PurchaseOffer>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/trades/purchaseoffers/current
pub async fn current_offers<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Query(query): Query<CurrentOffersQuery>,
) -> Result<Json<CurrentOffersResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let status = query
        .status
        .as_deref()
        .map(OfferStatus::parse)
        .transpose()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let (offers, total) = state
        .store
        .list_offers_for_user(principal.user_id, status, page, per_page)?;

    Ok(Json(CurrentOffersResponse {
        success: true,
        offers,
        page,
        per_page,
        total,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOfferResponse {
    pub success: bool,
    pub purchase_offer_id: u64,
}

/// POST /api/trades/cancel/:purchaseOfferId
///
/// Manual cancellation by either party, from any live state.
pub async fn cancel_offer<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Path(purchase_offer_id): Path<u64>,
) -> Result<Json<CancelOfferResponse>, ApiError>
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
    if !offer.status.can_transition(OfferStatus::Cancelled) {
        return Err(ApiError::InvalidOfferStatus);
    }

    let change = OfferChange::status(OfferStatus::Cancelled);
    if !state.store.update_offer(offer.id, offer.version, &change)? {
        return Err(ApiError::InvalidOfferStatus);
    }

    // Goods already in motion keep the listing out of circulation
    let listing_status = if matches!(
        offer.status,
        OfferStatus::SellerShipped | OfferStatus::GoodsReceived | OfferStatus::DisputeOpened
    ) {
        ListingStatus::Cancelled
    } else {
        ListingStatus::Available
    };
    state.store.set_listing_status(listing.id, listing_status)?;

    tracing::info!(offer = %offer.id.0, by = %principal.user_id, "Offer cancelled");

    let counterparty = if principal.user_id == offer.buyer_id {
        listing.seller_id
    } else {
        offer.buyer_id
    };
    state.dispatch(
        counterparty,
        "Trade cancelled",
        &format!("The trade for \"{}\" was cancelled by {}.", listing.title, principal.name),
        NotificationKind::SystemNotes,
    );

    Ok(Json(CancelOfferResponse {
        success: true,
        purchase_offer_id: offer.id.0,
    }))
}
