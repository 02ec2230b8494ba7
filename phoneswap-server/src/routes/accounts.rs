//! Account registration and credential issuance

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use phoneswap_core::credential::{self, Claims};
use phoneswap_core::role::split_password_marker;
use phoneswap_core::Role;

use crate::crypto::{generate_login_salt, hash_password, verify_password, PASSWORD_MAX, PASSWORD_MIN};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::MarketStore;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: u64,
}

/// POST /api/auth/register
pub async fn register<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Name must not be empty".to_string()));
    }
    if req.password.len() < PASSWORD_MIN {
        return Err(ApiError::Validation(format!(
            "Password too short (minimum {} characters)",
            PASSWORD_MIN
        )));
    }
    if req.password.len() > PASSWORD_MAX {
        return Err(ApiError::Validation(format!(
            "Password too long (maximum {} characters)",
            PASSWORD_MAX
        )));
    }

    // The staff/admin marker is password shape, not password content:
    // it is recorded and stripped before hashing.
    let (base_password, marker) = split_password_marker(&req.password);
    let password_hash =
        hash_password(base_password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user_id = state.store.create_user(name, &password_hash, marker)?;

    tracing::info!(user = %user_id, staff_marker = ?marker, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user_id: user_id.0,
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
    /// Roles the credential should assert; defaults to buyer
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub roles: Vec<Role>,
}

/// POST /api/auth/login
///
/// Issues a bearer credential asserting the requested roles and records
/// the per-role hash fragments that later bind those roles to this
/// specific credential.
pub async fn login<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    // Unknown role names fail loudly before any credential work
    let requested = if req.roles.is_empty() {
        vec![Role::Buyer]
    } else {
        req.roles
            .iter()
            .map(|r| Role::parse(r))
            .collect::<Result<Vec<_>, _>>()?
    };

    let user = state
        .store
        .get_user_by_name(req.name.trim())?
        .ok_or(ApiError::InvalidCredentials)?;

    let (base_password, presented_marker) = split_password_marker(&req.password);
    let valid = verify_password(base_password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let status = state
        .store
        .get_auth_status(user.id)?
        .ok_or(ApiError::Forbidden)?;

    for role in &requested {
        let permitted = match role {
            Role::Buyer => true,
            Role::Seller => status.is_seller,
            Role::Arbiter => status.is_arbiter,
            // Staff standing needs the capability flag AND the password
            // marker, both as recorded at set time and as presented now
            Role::Staff | Role::Admin => {
                status.is_staff_admin
                    && status.staff_marker.is_some_and(|m| m.role() == *role)
                    && presented_marker.is_some_and(|m| m.role() == *role)
            }
        };
        if !permitted {
            return Err(ApiError::RoleNotPermitted(role.to_string()));
        }
    }

    let salt = generate_login_salt();
    let claims = Claims::new(
        user.id.0,
        &user.name,
        &salt,
        requested.clone(),
        state.credential_ttl,
    );
    let token = credential::issue(&claims, &state.credential_secret)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let fragment = credential::signature_fragment(&token)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    for role in &requested {
        state.store.set_role_fragment(user.id, *role, &fragment)?;
    }

    tracing::info!(user = %user.id, roles = ?requested, "Credential issued");

    Ok(Json(LoginResponse {
        success: true,
        token,
        roles: requested,
    }))
}
