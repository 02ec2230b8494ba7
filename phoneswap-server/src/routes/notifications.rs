//! Notification counter endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use phoneswap_core::NotificationKind;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::MarketStore;

#[derive(Serialize)]
pub struct CountersResponse {
    pub success: bool,
    pub counters: Map<String, Value>,
}

/// GET /api/notifications/counters
pub async fn get_counters<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
) -> Result<Json<CountersResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let counters = state.store.counters_for(principal.user_id)?;
    let mut map = Map::new();
    for (kind, count) in counters {
        map.insert(kind.as_str().to_string(), Value::from(count));
    }

    Ok(Json(CountersResponse {
        success: true,
        counters: map,
    }))
}

#[derive(Deserialize)]
pub struct ResetCounterRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize)]
pub struct ResetCounterResponse {
    pub success: bool,
}

/// POST /api/notifications/counters/reset
pub async fn reset_counter<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    Json(req): Json<ResetCounterRequest>,
) -> Result<Json<ResetCounterResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let principal = authenticate(&state, &headers)?;

    let kind = NotificationKind::parse(&req.kind)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    state.store.reset_counter(principal.user_id, kind)?;

    Ok(Json(ResetCounterResponse { success: true }))
}
