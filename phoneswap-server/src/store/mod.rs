//! Storage abstractions for the marketplace

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use models::*;
pub use sqlite::SqliteStore;

use phoneswap_core::{
    ListingId, ListingStatus, NotificationKind, OfferId, OfferStatus, PaymentId, PaymentStatus,
    Role, UserId,
};

use crate::error::ApiError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ApiError>;

/// Trait for user accounts, auth status, and token records
pub trait UserStore: Send + Sync {
    /// Create a new user; also seeds the auth-status and token records
    fn create_user(
        &self,
        name: &str,
        password_hash: &str,
        staff_marker: Option<phoneswap_core::StaffMarker>,
    ) -> StoreResult<UserId>;

    /// Get a user by id
    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// Get a user by display name
    fn get_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    /// Get a user's auth status
    fn get_auth_status(&self, user_id: UserId) -> StoreResult<Option<AuthStatusRecord>>;

    /// Apply a typed patch to a user's auth status, returning the result
    fn update_auth_status(
        &self,
        user_id: UserId,
        patch: &AuthStatusPatch,
    ) -> StoreResult<AuthStatusRecord>;

    /// Get a user's token record
    fn get_token_record(&self, user_id: UserId) -> StoreResult<Option<TokenRecord>>;

    /// Write the role-hash fragment recorded at credential issuance
    fn set_role_fragment(&self, user_id: UserId, role: Role, fragment: &str) -> StoreResult<()>;
}

/// Trait for listings, purchase offers, and payment proofs
pub trait TradeStore: Send + Sync {
    fn create_listing(&self, seller: UserId, title: &str, price_cents: i64)
        -> StoreResult<ListingId>;

    fn get_listing(&self, listing_id: ListingId) -> StoreResult<Option<Listing>>;

    fn set_listing_status(&self, listing_id: ListingId, status: ListingStatus) -> StoreResult<()>;

    /// Insert an offer in `Pending` with the candidate slots populated
    fn create_offer(
        &self,
        listing_id: ListingId,
        buyer: UserId,
        candidates: &[UserId],
    ) -> StoreResult<OfferId>;

    fn get_offer(&self, offer_id: OfferId) -> StoreResult<Option<PurchaseOffer>>;

    /// Apply a transition conditional on the version read during
    /// validation. Returns `false` when the version no longer matches
    /// (another writer got there first); nothing is written in that case.
    fn update_offer(
        &self,
        offer_id: OfferId,
        expected_version: u64,
        change: &OfferChange,
    ) -> StoreResult<bool>;

    /// Remove an offer row entirely (destructive invalidation path)
    fn delete_offer(&self, offer_id: OfferId) -> StoreResult<()>;

    /// Offers where the user is the buyer or the listing's seller,
    /// newest first, optionally filtered by status. Returns the page and
    /// the total match count.
    fn list_offers_for_user(
        &self,
        user_id: UserId,
        status: Option<OfferStatus>,
        page: u64,
        per_page: u64,
    ) -> StoreResult<(Vec<PurchaseOffer>, u64)>;

    fn create_payment(
        &self,
        offer_id: OfferId,
        buyer: UserId,
        amount_cents: i64,
        photo_urls: &[String],
    ) -> StoreResult<PaymentId>;

    fn get_payment_for_offer(&self, offer_id: OfferId) -> StoreResult<Option<PaymentProof>>;

    fn set_payment_status(&self, payment_id: PaymentId, status: PaymentStatus) -> StoreResult<()>;
}

/// Trait for per-user unread notification counters
pub trait CounterStore: Send + Sync {
    fn increment_counter(&self, user_id: UserId, kind: NotificationKind) -> StoreResult<()>;

    /// All counters for a user, including zero entries, in kind order
    fn counters_for(&self, user_id: UserId) -> StoreResult<Vec<(NotificationKind, u64)>>;

    fn reset_counter(&self, user_id: UserId, kind: NotificationKind) -> StoreResult<()>;
}

/// The full store surface the application state requires
pub trait MarketStore: UserStore + TradeStore + CounterStore {}

impl<T: UserStore + TradeStore + CounterStore> MarketStore for T {}
