//! Request authentication and principal resolution
//!
//! Every handler resolves an explicit [`AuthenticatedPrincipal`] up
//! front; nothing is attached ambiently to the request. A principal's
//! role set is the intersection of the signed role claims in the
//! credential and the roles derivable from the stored capability flags
//! and role-hash fragments.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use phoneswap_core::{credential, derive_roles, Role, UserId};

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::MarketStore;

/// The acting user for a request, with the currently provable role set
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub user_id: UserId,
    pub name: String,
    pub roles: Vec<Role>,
}

impl AuthenticatedPrincipal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::RoleNotPermitted(role.to_string()))
        }
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Extract the bearer credential from the Authorization header
fn bearer_credential(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::NotAuthenticated)
}

/// Resolve the acting principal for a request.
///
/// Signature or expiry failure is 401. A valid credential whose user has
/// no auth-status record, or for which no claimed role survives the
/// flag-and-fragment derivation, is 403.
pub fn authenticate<S, N>(
    state: &AppState<S, N>,
    headers: &HeaderMap,
) -> Result<AuthenticatedPrincipal, ApiError>
where
    S: MarketStore,
    N: Notifier,
{
    let presented = bearer_credential(headers)?;

    let claims = credential::verify(presented, &state.credential_secret)
        .map_err(|_| ApiError::NotAuthenticated)?;

    let user_id = UserId(claims.sub);
    let status = state
        .store
        .get_auth_status(user_id)?
        .ok_or(ApiError::Forbidden)?;
    let token_record = state
        .store
        .get_token_record(user_id)?
        .ok_or(ApiError::Forbidden)?;

    let derivable = derive_roles(&status.flags(), &token_record.fragments, presented);
    let roles: Vec<Role> = derivable
        .into_iter()
        .filter(|role| claims.roles.contains(role))
        .collect();

    if roles.is_empty() {
        return Err(ApiError::Forbidden);
    }

    Ok(AuthenticatedPrincipal {
        user_id,
        name: claims.name,
        roles,
    })
}
