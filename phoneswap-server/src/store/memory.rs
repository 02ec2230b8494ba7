//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use phoneswap_core::{
    ListingId, ListingStatus, NotificationKind, OfferId, OfferStatus, PaymentId, PaymentStatus,
    Role, StaffMarker, UserId,
};

use super::{
    AuthStatusPatch, AuthStatusRecord, CounterStore, Listing, OfferChange, PaymentProof,
    PurchaseOffer, StoreResult, TokenRecord, TradeStore, User, UserStore, ARBITER_SLOTS,
};
use crate::error::ApiError;

/// In-memory store backing all three store traits
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    auth_status: RwLock<HashMap<UserId, AuthStatusRecord>>,
    tokens: RwLock<HashMap<UserId, TokenRecord>>,
    listings: RwLock<HashMap<ListingId, Listing>>,
    offers: RwLock<HashMap<OfferId, PurchaseOffer>>,
    payments: RwLock<HashMap<PaymentId, PaymentProof>>,
    counters: RwLock<HashMap<(UserId, NotificationKind), u64>>,
    next_user_id: AtomicU64,
    next_listing_id: AtomicU64,
    next_offer_id: AtomicU64,
    next_payment_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            auth_status: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            listings: RwLock::new(HashMap::new()),
            offers: RwLock::new(HashMap::new()),
            payments: RwLock::new(HashMap::new()),
            counters: RwLock::new(HashMap::new()),
            next_user_id: AtomicU64::new(1),
            next_listing_id: AtomicU64::new(1),
            next_offer_id: AtomicU64::new(1),
            next_payment_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryStore {
    fn create_user(
        &self,
        name: &str,
        password_hash: &str,
        staff_marker: Option<StaffMarker>,
    ) -> StoreResult<UserId> {
        if self.get_user_by_name(name)?.is_some() {
            return Err(ApiError::Validation(format!("Name already taken: {}", name)));
        }

        let id = UserId(self.next_user_id.fetch_add(1, Ordering::SeqCst));
        let user = User {
            id,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.users.write().unwrap().insert(id, user);

        let mut status = AuthStatusRecord::new(id);
        if let Some(marker) = staff_marker {
            status.is_staff_admin = true;
            status.staff_marker = Some(marker);
        }
        self.auth_status.write().unwrap().insert(id, status);
        self.tokens.write().unwrap().insert(id, TokenRecord::new(id));

        Ok(id)
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&user_id).cloned())
    }

    fn get_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.name == name)
            .cloned())
    }

    fn get_auth_status(&self, user_id: UserId) -> StoreResult<Option<AuthStatusRecord>> {
        Ok(self.auth_status.read().unwrap().get(&user_id).cloned())
    }

    fn update_auth_status(
        &self,
        user_id: UserId,
        patch: &AuthStatusPatch,
    ) -> StoreResult<AuthStatusRecord> {
        let mut records = self.auth_status.write().unwrap();
        let record = records.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;
        patch.apply(record);
        Ok(record.clone())
    }

    fn get_token_record(&self, user_id: UserId) -> StoreResult<Option<TokenRecord>> {
        Ok(self.tokens.read().unwrap().get(&user_id).cloned())
    }

    fn set_role_fragment(&self, user_id: UserId, role: Role, fragment: &str) -> StoreResult<()> {
        let mut tokens = self.tokens.write().unwrap();
        let record = tokens.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;
        record.fragments.set(role, fragment.to_string());
        Ok(())
    }
}

impl TradeStore for InMemoryStore {
    fn create_listing(
        &self,
        seller: UserId,
        title: &str,
        price_cents: i64,
    ) -> StoreResult<ListingId> {
        let id = ListingId(self.next_listing_id.fetch_add(1, Ordering::SeqCst));
        let listing = Listing {
            id,
            seller_id: seller,
            title: title.to_string(),
            price_cents,
            status: ListingStatus::Available,
            created_at: Utc::now(),
        };
        self.listings.write().unwrap().insert(id, listing);
        Ok(id)
    }

    fn get_listing(&self, listing_id: ListingId) -> StoreResult<Option<Listing>> {
        Ok(self.listings.read().unwrap().get(&listing_id).cloned())
    }

    fn set_listing_status(&self, listing_id: ListingId, status: ListingStatus) -> StoreResult<()> {
        let mut listings = self.listings.write().unwrap();
        let listing = listings.get_mut(&listing_id).ok_or(ApiError::ListingNotFound)?;
        listing.status = status;
        Ok(())
    }

    fn create_offer(
        &self,
        listing_id: ListingId,
        buyer: UserId,
        candidates: &[UserId],
    ) -> StoreResult<OfferId> {
        let id = OfferId(self.next_offer_id.fetch_add(1, Ordering::SeqCst));

        let mut arbiters = [None; ARBITER_SLOTS];
        for (slot, candidate) in arbiters.iter_mut().zip(candidates.iter()) {
            *slot = Some(*candidate);
        }

        let offer = PurchaseOffer {
            id,
            listing_id,
            buyer_id: buyer,
            arbiters,
            status: OfferStatus::Pending,
            version: 1,
            created_at: Utc::now(),
        };
        self.offers.write().unwrap().insert(id, offer);
        Ok(id)
    }

    fn get_offer(&self, offer_id: OfferId) -> StoreResult<Option<PurchaseOffer>> {
        Ok(self.offers.read().unwrap().get(&offer_id).cloned())
    }

    fn update_offer(
        &self,
        offer_id: OfferId,
        expected_version: u64,
        change: &OfferChange,
    ) -> StoreResult<bool> {
        let mut offers = self.offers.write().unwrap();
        let offer = offers.get_mut(&offer_id).ok_or(ApiError::OfferNotFound)?;

        if offer.version != expected_version {
            return Ok(false);
        }

        offer.status = change.status;
        if let Some(arbiters) = change.arbiters {
            offer.arbiters = arbiters;
        }
        offer.version += 1;
        Ok(true)
    }

    fn delete_offer(&self, offer_id: OfferId) -> StoreResult<()> {
        self.offers.write().unwrap().remove(&offer_id);
        Ok(())
    }

    fn list_offers_for_user(
        &self,
        user_id: UserId,
        status: Option<OfferStatus>,
        page: u64,
        per_page: u64,
    ) -> StoreResult<(Vec<PurchaseOffer>, u64)> {
        let listings = self.listings.read().unwrap();
        let offers = self.offers.read().unwrap();

        let mut matches: Vec<PurchaseOffer> = offers
            .values()
            .filter(|offer| {
                offer.buyer_id == user_id
                    || listings
                        .get(&offer.listing_id)
                        .is_some_and(|l| l.seller_id == user_id)
            })
            .filter(|offer| status.map_or(true, |s| offer.status == s))
            .cloned()
            .collect();

        // Newest first
        matches.sort_by(|a, b| b.id.0.cmp(&a.id.0));

        let total = matches.len() as u64;
        let start = ((page.max(1) - 1) * per_page) as usize;
        let page_items = matches
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok((page_items, total))
    }

    fn create_payment(
        &self,
        offer_id: OfferId,
        buyer: UserId,
        amount_cents: i64,
        photo_urls: &[String],
    ) -> StoreResult<PaymentId> {
        let id = PaymentId(self.next_payment_id.fetch_add(1, Ordering::SeqCst));
        let payment = PaymentProof {
            id,
            offer_id,
            buyer_id: buyer,
            amount_cents,
            photo_urls: photo_urls.to_vec(),
            status: PaymentStatus::ProofSubmitted,
            created_at: Utc::now(),
        };
        self.payments.write().unwrap().insert(id, payment);
        Ok(id)
    }

    fn get_payment_for_offer(&self, offer_id: OfferId) -> StoreResult<Option<PaymentProof>> {
        Ok(self
            .payments
            .read()
            .unwrap()
            .values()
            .filter(|p| p.offer_id == offer_id)
            .max_by_key(|p| p.id.0)
            .cloned())
    }

    fn set_payment_status(&self, payment_id: PaymentId, status: PaymentStatus) -> StoreResult<()> {
        let mut payments = self.payments.write().unwrap();
        let payment = payments.get_mut(&payment_id).ok_or(ApiError::PaymentNotFound)?;
        payment.status = status;
        Ok(())
    }
}

impl CounterStore for InMemoryStore {
    fn increment_counter(&self, user_id: UserId, kind: NotificationKind) -> StoreResult<()> {
        *self
            .counters
            .write()
            .unwrap()
            .entry((user_id, kind))
            .or_insert(0) += 1;
        Ok(())
    }

    fn counters_for(&self, user_id: UserId) -> StoreResult<Vec<(NotificationKind, u64)>> {
        let counters = self.counters.read().unwrap();
        Ok(NotificationKind::ALL
            .iter()
            .map(|kind| (*kind, counters.get(&(user_id, *kind)).copied().unwrap_or(0)))
            .collect())
    }

    fn reset_counter(&self, user_id: UserId, kind: NotificationKind) -> StoreResult<()> {
        self.counters.write().unwrap().insert((user_id, kind), 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_version_check() {
        let store = InMemoryStore::new();
        let seller = store.create_user("seller", "hash", None).unwrap();
        let buyer = store.create_user("buyer", "hash", None).unwrap();
        let listing = store.create_listing(seller, "Pixel 6", 12000).unwrap();
        let offer_id = store
            .create_offer(listing, buyer, &[UserId(5), UserId(6), UserId(7)])
            .unwrap();

        let offer = store.get_offer(offer_id).unwrap().unwrap();
        let change = OfferChange::status(OfferStatus::AcceptedBySeller);

        // First writer wins
        assert!(store.update_offer(offer_id, offer.version, &change).unwrap());

        // Second writer carrying the stale version loses
        let change = OfferChange::status(OfferStatus::RejectedBySeller);
        assert!(!store.update_offer(offer_id, offer.version, &change).unwrap());

        let after = store.get_offer(offer_id).unwrap().unwrap();
        assert_eq!(after.status, OfferStatus::AcceptedBySeller);
        assert_eq!(after.version, offer.version + 1);
    }

    #[test]
    fn test_list_offers_joins_seller_side() {
        let store = InMemoryStore::new();
        let seller = store.create_user("seller", "hash", None).unwrap();
        let buyer = store.create_user("buyer", "hash", None).unwrap();
        let listing = store.create_listing(seller, "iPhone 12", 25000).unwrap();
        store
            .create_offer(listing, buyer, &[UserId(5), UserId(6), UserId(7)])
            .unwrap();

        let (buyer_view, total) = store.list_offers_for_user(buyer, None, 1, 20).unwrap();
        assert_eq!(total, 1);
        assert_eq!(buyer_view.len(), 1);

        let (seller_view, _) = store.list_offers_for_user(seller, None, 1, 20).unwrap();
        assert_eq!(seller_view.len(), 1);

        let outsider = store.create_user("outsider", "hash", None).unwrap();
        let (other_view, total) = store.list_offers_for_user(outsider, None, 1, 20).unwrap();
        assert_eq!(total, 0);
        assert!(other_view.is_empty());
    }

    #[test]
    fn test_counters() {
        let store = InMemoryStore::new();
        let user = store.create_user("u", "hash", None).unwrap();

        store.increment_counter(user, NotificationKind::Offers).unwrap();
        store.increment_counter(user, NotificationKind::Offers).unwrap();

        let counters = store.counters_for(user).unwrap();
        let offers = counters
            .iter()
            .find(|(k, _)| *k == NotificationKind::Offers)
            .unwrap();
        assert_eq!(offers.1, 2);

        store.reset_counter(user, NotificationKind::Offers).unwrap();
        let counters = store.counters_for(user).unwrap();
        assert!(counters.iter().all(|(k, n)| *n == 0 || *k != NotificationKind::Offers));
    }
}
