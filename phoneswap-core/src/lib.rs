//! PhoneSwap Core Library
//!
//! Domain model for the peer-to-peer used-phone marketplace:
//! - Roles and role derivation from issued credentials
//! - Listing and purchase-offer status vocabulary
//! - Purchase-offer negotiation rules (candidate arbiters, seller selection)
//! - Signed bearer credentials carrying a structured role claim set

pub mod credential;
pub mod error;
pub mod offer;
pub mod role;
pub mod types;

pub use credential::{Claims, ROLE_FRAGMENT_LEN};
pub use error::Error;
pub use role::{derive_roles, user_status_from_flags, AuthFlags, Role, RoleFragments, StaffMarker};
pub use types::{
    ListingId, ListingStatus, NotificationKind, OfferId, OfferStatus, PaymentId, PaymentStatus,
    UserId,
};

/// Result type for phoneswap-core operations
pub type Result<T> = std::result::Result<T, Error>;
