//! API error types and response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Role not permitted: {0}")]
    RoleNotPermitted(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Listing not found")]
    ListingNotFound,

    #[error("Offer not found")]
    OfferNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Listing is not available")]
    ListingUnavailable,

    #[error("Invalid arbiter candidates")]
    InvalidArbiters { invalid_ids: Vec<u64> },

    #[error("Selected arbiters are not in the candidate set")]
    ArbitersNotInCandidateSet,

    #[error("Arbiters no longer valid; offer deleted")]
    ArbitersNoLongerValid { invalid_ids: Vec<u64> },

    #[error("Offer is not in the required status for this transition")]
    InvalidOfferStatus,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable code for errors that carry one
    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::ListingUnavailable => Some("LISTING_UNAVAILABLE"),
            ApiError::InvalidArbiters { .. } => Some("INVALID_ARBITERS"),
            ApiError::ArbitersNotInCandidateSet => Some("ARBITERS_NOT_IN_CANDIDATE_SET"),
            ApiError::ArbitersNoLongerValid { .. } => Some("ARBITERS_NO_LONGER_VALID"),
            ApiError::InvalidOfferStatus => Some("INVALID_OFFER_STATUS"),
            _ => None,
        }
    }
}

impl From<phoneswap_core::Error> for ApiError {
    fn from(err: phoneswap_core::Error) -> Self {
        use phoneswap_core::Error as CoreError;
        match err {
            CoreError::UnknownRole(name) => ApiError::UnknownRole(name),
            CoreError::NotInCandidateSet(_) | CoreError::DuplicateSelection(_) => {
                ApiError::ArbitersNotInCandidateSet
            }
            CoreError::Jwt(_) | CoreError::InvalidCredential(_) => ApiError::NotAuthenticated,
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_)
            | ApiError::UnknownRole(_)
            | ApiError::InvalidArbiters { .. }
            | ApiError::ArbitersNotInCandidateSet
            | ApiError::ArbitersNoLongerValid { .. }
            | ApiError::InvalidOfferStatus => StatusCode::BAD_REQUEST,

            ApiError::InvalidCredentials | ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,

            ApiError::Forbidden | ApiError::RoleNotPermitted(_) => StatusCode::FORBIDDEN,

            // An unavailable listing is indistinguishable from a missing
            // one to an offer-making buyer
            ApiError::ListingUnavailable
            | ApiError::UserNotFound
            | ApiError::ListingNotFound
            | ApiError::OfferNotFound
            | ApiError::PaymentNotFound => StatusCode::NOT_FOUND,

            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let reason = match &self {
            // Never leak internals to the client
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({ "success": false, "reason": reason });
        if let Some(code) = self.code() {
            body["code"] = json!(code);
        }
        match &self {
            ApiError::InvalidArbiters { invalid_ids }
            | ApiError::ArbitersNoLongerValid { invalid_ids } => {
                body["invalidArbiterIds"] = json!(invalid_ids);
            }
            _ => {}
        }

        (status, axum::Json(body)).into_response()
    }
}
