//! Listing endpoints (the minimal surface the offer lifecycle needs)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use phoneswap_core::{ListingId, Role};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::{Listing, MarketStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub price_cents: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingResponse {
    pub success: bool,
    pub listing_id: u64,
}

/// POST /api/listings
pub async fn create_listing<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: axum::http::HeaderMap,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<CreateListingResponse>), ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;
    principal.require_role(Role::Seller)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty".to_string()));
    }
    if req.price_cents <= 0 {
        return Err(ApiError::Validation("Price must be positive".to_string()));
    }

    let listing_id = state
        .store
        .create_listing(principal.user_id, req.title.trim(), req.price_cents)?;

    tracing::info!(listing = %listing_id.0, seller = %principal.user_id, "Listing created");

    Ok((
        StatusCode::CREATED,
        Json(CreateListingResponse {
            success: true,
            listing_id: listing_id.0,
        }),
    ))
}

#[derive(Serialize)]
pub struct GetListingResponse {
    pub success: bool,
    pub listing: Listing,
}

/// GET /api/listings/:listingId
pub async fn get_listing<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    Path(listing_id): Path<u64>,
) -> Result<Json<GetListingResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let listing = state
        .store
        .get_listing(ListingId(listing_id))?
        .ok_or(ApiError::ListingNotFound)?;

    Ok(Json(GetListingResponse {
        success: true,
        listing,
    }))
}
