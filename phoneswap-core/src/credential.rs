//! Signed bearer credentials
//!
//! A credential is an HS256 JWT over a shared secret. The claim set is
//! structured: it names the user and carries the list of roles granted at
//! issuance, so role assertions are verified by signature rather than
//! reconstructed from the token text. The per-role hash fragments written
//! at issuance (see [`crate::role`]) bind each role to this specific
//! credential on top of the signature check.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::{Error, Result};

/// Length of the per-role hash fragment sliced from an issued credential
pub const ROLE_FRAGMENT_LEN: usize = 8;

/// Claims carried by a bearer credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: u64,

    /// Display name
    pub name: String,

    /// Per-login nonce, so two logins never issue the same credential
    pub salt: String,

    /// Roles granted at issuance
    pub roles: Vec<Role>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: u64, name: &str, salt: &str, roles: Vec<Role>, validity: Duration) -> Self {
        Self {
            sub,
            name: name.to_string(),
            salt: salt.to_string(),
            roles,
            exp: (Utc::now() + validity).timestamp(),
        }
    }
}

/// Sign a claim set into an encoded credential
pub fn issue(claims: &Claims, secret: &[u8]) -> Result<String> {
    Ok(encode(&Header::default(), claims, &EncodingKey::from_secret(secret))?)
}

/// Verify a credential's signature and expiry, returning its claims
pub fn verify(credential: &str, secret: &[u8]) -> Result<Claims> {
    let data = decode::<Claims>(
        credential,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Slice the role-hash fragment out of an issued credential.
///
/// The fragment is the leading [`ROLE_FRAGMENT_LEN`] characters of the
/// signature part, which is unique per issuance (the salt claim varies
/// per login).
pub fn signature_fragment(credential: &str) -> Result<String> {
    let signature = credential
        .rsplit('.')
        .next()
        .filter(|s| s.len() >= ROLE_FRAGMENT_LEN)
        .ok_or_else(|| Error::InvalidCredential("signature part too short".to_string()))?;
    Ok(signature[..ROLE_FRAGMENT_LEN].to_string())
}
