//! Error types for phoneswap-core

use thiserror::Error;

use crate::types::{OfferStatus, UserId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Expected between 3 and 6 candidate arbiters, got {0}")]
    CandidateCount(usize),

    #[error("Duplicate candidate arbiter: {0}")]
    DuplicateCandidate(UserId),

    #[error("Buyer cannot be a candidate arbiter")]
    CandidateIsBuyer,

    #[error("Seller cannot be a candidate arbiter")]
    CandidateIsSeller,

    #[error("Expected exactly 3 selected arbiters, got {0}")]
    SelectionCount(usize),

    #[error("Duplicate selected arbiter: {0}")]
    DuplicateSelection(UserId),

    #[error("Selected arbiter {0} is not in the candidate set")]
    NotInCandidateSet(UserId),

    #[error("Invalid offer transition: {from} -> {to}")]
    InvalidTransition { from: OfferStatus, to: OfferStatus },

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
