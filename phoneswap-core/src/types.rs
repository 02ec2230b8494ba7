//! Identifier and status vocabulary for the marketplace
//!
//! Status enums carry one canonical string form (the variant name), used
//! both on the wire and in storage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique listing identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub u64);

/// Unique purchase-offer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub u64);

/// Unique payment-proof identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Status of a purchase offer
///
/// `AwaitingPaymentVerification` is its own state: the submitted payment
/// proof has not yet been checked by staff. The legacy system reused the
/// `Pending` value for this, which made "awaiting seller review" and
/// "awaiting payment verification" indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    Pending,
    AcceptedBySeller,
    RejectedBySeller,
    AwaitingPaymentVerification,
    BuyerPaid,
    SellerShipped,
    GoodsReceived,
    DisputeOpened,
    DisputeResolved,
    Cancelled,
    Completed,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "Pending",
            OfferStatus::AcceptedBySeller => "AcceptedBySeller",
            OfferStatus::RejectedBySeller => "RejectedBySeller",
            OfferStatus::AwaitingPaymentVerification => "AwaitingPaymentVerification",
            OfferStatus::BuyerPaid => "BuyerPaid",
            OfferStatus::SellerShipped => "SellerShipped",
            OfferStatus::GoodsReceived => "GoodsReceived",
            OfferStatus::DisputeOpened => "DisputeOpened",
            OfferStatus::DisputeResolved => "DisputeResolved",
            OfferStatus::Cancelled => "Cancelled",
            OfferStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "Pending" => Ok(OfferStatus::Pending),
            "AcceptedBySeller" => Ok(OfferStatus::AcceptedBySeller),
            "RejectedBySeller" => Ok(OfferStatus::RejectedBySeller),
            "AwaitingPaymentVerification" => Ok(OfferStatus::AwaitingPaymentVerification),
            "BuyerPaid" => Ok(OfferStatus::BuyerPaid),
            "SellerShipped" => Ok(OfferStatus::SellerShipped),
            "GoodsReceived" => Ok(OfferStatus::GoodsReceived),
            "DisputeOpened" => Ok(OfferStatus::DisputeOpened),
            "DisputeResolved" => Ok(OfferStatus::DisputeResolved),
            "Cancelled" => Ok(OfferStatus::Cancelled),
            "Completed" => Ok(OfferStatus::Completed),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OfferStatus::RejectedBySeller
                | OfferStatus::DisputeResolved
                | OfferStatus::Cancelled
                | OfferStatus::Completed
        )
    }

    /// Whether `next` is a legal transition out of `self`
    pub fn can_transition(&self, next: OfferStatus) -> bool {
        use OfferStatus::*;
        match (*self, next) {
            (Pending, AcceptedBySeller | RejectedBySeller) => true,
            (AcceptedBySeller, AwaitingPaymentVerification) => true,
            (AwaitingPaymentVerification, BuyerPaid) => true,
            (BuyerPaid, SellerShipped) => true,
            (SellerShipped, GoodsReceived | DisputeOpened) => true,
            (GoodsReceived, Completed | DisputeOpened) => true,
            (DisputeOpened, DisputeResolved) => true,
            // Cancellation is manual and allowed from any live state
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a phone listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Draft,
    PendingApproval,
    Rejected,
    Available,
    OfferPending,
    OfferAccepted,
    Sold,
    Shipped,
    GoodsReceived,
    DisputeOpened,
    DisputeResolved,
    Cancelled,
    Completed,
    Inactive,
    Removed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "Draft",
            ListingStatus::PendingApproval => "PendingApproval",
            ListingStatus::Rejected => "Rejected",
            ListingStatus::Available => "Available",
            ListingStatus::OfferPending => "OfferPending",
            ListingStatus::OfferAccepted => "OfferAccepted",
            ListingStatus::Sold => "Sold",
            ListingStatus::Shipped => "Shipped",
            ListingStatus::GoodsReceived => "GoodsReceived",
            ListingStatus::DisputeOpened => "DisputeOpened",
            ListingStatus::DisputeResolved => "DisputeResolved",
            ListingStatus::Cancelled => "Cancelled",
            ListingStatus::Completed => "Completed",
            ListingStatus::Inactive => "Inactive",
            ListingStatus::Removed => "Removed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "Draft" => Ok(ListingStatus::Draft),
            "PendingApproval" => Ok(ListingStatus::PendingApproval),
            "Rejected" => Ok(ListingStatus::Rejected),
            "Available" => Ok(ListingStatus::Available),
            "OfferPending" => Ok(ListingStatus::OfferPending),
            "OfferAccepted" => Ok(ListingStatus::OfferAccepted),
            "Sold" => Ok(ListingStatus::Sold),
            "Shipped" => Ok(ListingStatus::Shipped),
            "GoodsReceived" => Ok(ListingStatus::GoodsReceived),
            "DisputeOpened" => Ok(ListingStatus::DisputeOpened),
            "DisputeResolved" => Ok(ListingStatus::DisputeResolved),
            "Cancelled" => Ok(ListingStatus::Cancelled),
            "Completed" => Ok(ListingStatus::Completed),
            "Inactive" => Ok(ListingStatus::Inactive),
            "Removed" => Ok(ListingStatus::Removed),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a payment-proof submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    ProofSubmitted,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::ProofSubmitted => "ProofSubmitted",
            PaymentStatus::Verified => "Verified",
            PaymentStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "ProofSubmitted" => Ok(PaymentStatus::ProofSubmitted),
            "Verified" => Ok(PaymentStatus::Verified),
            "Rejected" => Ok(PaymentStatus::Rejected),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Per-user unread-counter categories for notification dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Offers,
    Messages,
    Purchases,
    RejectOffers,
    Accepts,
    DisputeRequests,
    DisputeRejections,
    DisputeUpdates,
    SystemNotes,
    UrgentNotes,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 10] = [
        NotificationKind::Offers,
        NotificationKind::Messages,
        NotificationKind::Purchases,
        NotificationKind::RejectOffers,
        NotificationKind::Accepts,
        NotificationKind::DisputeRequests,
        NotificationKind::DisputeRejections,
        NotificationKind::DisputeUpdates,
        NotificationKind::SystemNotes,
        NotificationKind::UrgentNotes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Offers => "Offers",
            NotificationKind::Messages => "Messages",
            NotificationKind::Purchases => "Purchases",
            NotificationKind::RejectOffers => "RejectOffers",
            NotificationKind::Accepts => "Accepts",
            NotificationKind::DisputeRequests => "DisputeRequests",
            NotificationKind::DisputeRejections => "DisputeRejections",
            NotificationKind::DisputeUpdates => "DisputeUpdates",
            NotificationKind::SystemNotes => "SystemNotes",
            NotificationKind::UrgentNotes => "UrgentNotes",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "Offers" => Ok(NotificationKind::Offers),
            "Messages" => Ok(NotificationKind::Messages),
            "Purchases" => Ok(NotificationKind::Purchases),
            "RejectOffers" => Ok(NotificationKind::RejectOffers),
            "Accepts" => Ok(NotificationKind::Accepts),
            "DisputeRequests" => Ok(NotificationKind::DisputeRequests),
            "DisputeRejections" => Ok(NotificationKind::DisputeRejections),
            "DisputeUpdates" => Ok(NotificationKind::DisputeUpdates),
            "SystemNotes" => Ok(NotificationKind::SystemNotes),
            "UrgentNotes" => Ok(NotificationKind::UrgentNotes),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}
