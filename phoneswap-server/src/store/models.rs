//! Data models for marketplace storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use phoneswap_core::{
    user_status_from_flags, AuthFlags, ListingId, ListingStatus, OfferId, OfferStatus, PaymentId,
    PaymentStatus, RoleFragments, StaffMarker, UserId,
};

/// Number of arbiter slots on an offer row
pub const ARBITER_SLOTS: usize = 6;

/// A user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Capability and verification flags for a user
#[derive(Debug, Clone)]
pub struct AuthStatusRecord {
    pub user_id: UserId,
    pub is_seller: bool,
    pub is_arbiter: bool,
    pub is_staff_admin: bool,
    /// Which marker the password carried when set; gates Staff vs Admin
    /// at credential issuance
    pub staff_marker: Option<StaffMarker>,
    pub verified_email: bool,
    pub verified_phone: bool,
    pub verified_user_id: bool,
    /// Aggregate verification level; always recomputed from the flags
    pub user_status: u8,
}

impl AuthStatusRecord {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_seller: false,
            is_arbiter: false,
            is_staff_admin: false,
            staff_marker: None,
            verified_email: false,
            verified_phone: false,
            verified_user_id: false,
            user_status: 0,
        }
    }

    pub fn flags(&self) -> AuthFlags {
        AuthFlags {
            is_seller: self.is_seller,
            is_arbiter: self.is_arbiter,
            is_staff_admin: self.is_staff_admin,
        }
    }

    /// Recompute the aggregate verification level from the flags
    pub fn recompute_user_status(&mut self) {
        self.user_status =
            user_status_from_flags(self.verified_email, self.verified_phone, self.verified_user_id);
    }
}

/// Explicit patchable fields for an auth-status update. Every mutable
/// flag is enumerated here; `user_status` is not patchable because it is
/// derived.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusPatch {
    pub is_seller: Option<bool>,
    pub is_arbiter: Option<bool>,
    pub is_staff_admin: Option<bool>,
    pub verified_email: Option<bool>,
    pub verified_phone: Option<bool>,
    pub verified_user_id: Option<bool>,
}

impl AuthStatusPatch {
    pub fn apply(&self, record: &mut AuthStatusRecord) {
        if let Some(v) = self.is_seller {
            record.is_seller = v;
        }
        if let Some(v) = self.is_arbiter {
            record.is_arbiter = v;
        }
        if let Some(v) = self.is_staff_admin {
            record.is_staff_admin = v;
        }
        if let Some(v) = self.verified_email {
            record.verified_email = v;
        }
        if let Some(v) = self.verified_phone {
            record.verified_phone = v;
        }
        if let Some(v) = self.verified_user_id {
            record.verified_user_id = v;
        }
        record.recompute_user_status();
    }
}

/// Per-user role-hash fragments, written at credential issuance
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub user_id: UserId,
    pub fragments: RoleFragments,
}

impl TokenRecord {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            fragments: RoleFragments::default(),
        }
    }
}

/// A phone listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    /// The owning seller
    pub seller_id: UserId,
    pub title: String,
    pub price_cents: i64,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

/// A buyer's proposal to purchase a listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOffer {
    pub id: OfferId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    /// Candidate slots 1..6 at creation; slots 1..3 hold the selected
    /// panel after acceptance, 4..6 are cleared
    pub arbiters: [Option<UserId>; ARBITER_SLOTS],
    pub status: OfferStatus,
    /// Optimistic-concurrency counter; bumped on every status write
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl PurchaseOffer {
    /// The populated arbiter slots, in slot order
    pub fn arbiter_ids(&self) -> Vec<UserId> {
        self.arbiters.iter().flatten().copied().collect()
    }

    /// The selected panel of an accepted offer (slots 1..3)
    pub fn selected_arbiters(&self) -> Vec<UserId> {
        self.arbiters[..3].iter().flatten().copied().collect()
    }
}

/// The status and arbiter-slot change applied by an offer transition
#[derive(Debug, Clone)]
pub struct OfferChange {
    pub status: OfferStatus,
    /// `None` leaves the slots untouched
    pub arbiters: Option<[Option<UserId>; ARBITER_SLOTS]>,
}

impl OfferChange {
    pub fn status(status: OfferStatus) -> Self {
        Self {
            status,
            arbiters: None,
        }
    }
}

/// Build the slot layout for an accepted offer: selection in slots 1..3,
/// slots 4..6 cleared.
pub fn accepted_slots(selection: &[UserId]) -> [Option<UserId>; ARBITER_SLOTS] {
    let mut slots = [None; ARBITER_SLOTS];
    for (slot, id) in slots.iter_mut().zip(selection.iter()) {
        *slot = Some(*id);
    }
    slots
}

/// A buyer-submitted payment proof
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    pub id: PaymentId,
    pub offer_id: OfferId,
    pub buyer_id: UserId,
    pub amount_cents: i64,
    pub photo_urls: Vec<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_recomputes_user_status() {
        let mut record = AuthStatusRecord::new(UserId(1));
        let patch = AuthStatusPatch {
            verified_email: Some(true),
            verified_phone: Some(true),
            ..Default::default()
        };
        patch.apply(&mut record);
        assert_eq!(record.user_status, 6);

        let patch = AuthStatusPatch {
            verified_phone: Some(false),
            ..Default::default()
        };
        patch.apply(&mut record);
        assert_eq!(record.user_status, 3);
    }

    #[test]
    fn test_accepted_slots_layout() {
        let slots = accepted_slots(&[UserId(1), UserId(2), UserId(3)]);
        assert_eq!(slots[..3], [Some(UserId(1)), Some(UserId(2)), Some(UserId(3))]);
        assert_eq!(slots[3..], [None, None, None]);
    }
}
