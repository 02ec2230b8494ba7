//! Dev-only administrative endpoints
//!
//! These mutate auth status directly and are only routed in dev mode;
//! in production the route does not exist.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use phoneswap_core::UserId;

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::{AuthStatusPatch, MarketStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthStatusRequest {
    pub user_id: u64,
    #[serde(flatten)]
    pub patch: AuthStatusPatch,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusView {
    pub user_id: u64,
    pub is_seller: bool,
    pub is_arbiter: bool,
    pub is_staff_admin: bool,
    pub verified_email: bool,
    pub verified_phone: bool,
    pub verified_user_id: bool,
    pub user_status: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthStatusResponse {
    pub success: bool,
    pub auth_status: AuthStatusView,
}

/// PUT /api/admin/users/auth-status
pub async fn update_auth_status<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    Json(req): Json<UpdateAuthStatusRequest>,
) -> Result<Json<UpdateAuthStatusResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let record = state
        .store
        .update_auth_status(UserId(req.user_id), &req.patch)?;

    tracing::info!(user = %record.user_id, "Auth status updated via admin surface");

    Ok(Json(UpdateAuthStatusResponse {
        success: true,
        auth_status: AuthStatusView {
            user_id: record.user_id.0,
            is_seller: record.is_seller,
            is_arbiter: record.is_arbiter,
            is_staff_admin: record.is_staff_admin,
            verified_email: record.verified_email,
            verified_phone: record.verified_phone,
            verified_user_id: record.verified_user_id,
            user_status: record.user_status,
        },
    }))
}
