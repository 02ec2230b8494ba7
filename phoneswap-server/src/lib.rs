//! PhoneSwap Server
//!
//! HTTP backend for the peer-to-peer used-phone marketplace: listing
//! creation, buyer/seller offer negotiation with buyer-proposed arbiter
//! panels, payment-proof intake, and notification dispatch.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::AuthenticatedPrincipal;
pub use config::Config;
pub use error::ApiError;
pub use notify::{ConsoleNotifier, Notifier, SmtpConfig, SmtpNotifier};
pub use state::AppState;
pub use store::{CounterStore, InMemoryStore, SqliteStore, TradeStore, UserStore};
