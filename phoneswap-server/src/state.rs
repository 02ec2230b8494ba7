//! Application state

use chrono::Duration;

use phoneswap_core::{NotificationKind, UserId};

use crate::notify::Notifier;
use crate::store::MarketStore;

/// Shared application state, generic over the store and the notifier
pub struct AppState<S, N> {
    pub store: S,
    pub notifier: N,
    /// Shared secret for signing bearer credentials
    pub credential_secret: Vec<u8>,
    /// Credential lifetime
    pub credential_ttl: Duration,
    /// Whether dev-only surfaces are enabled
    pub dev_mode: bool,
}

impl<S, N> AppState<S, N>
where
    S: MarketStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, credential_secret: &str, ttl_minutes: i64, dev_mode: bool) -> Self {
        Self {
            store,
            notifier,
            credential_secret: credential_secret.as_bytes().to_vec(),
            credential_ttl: Duration::minutes(ttl_minutes),
            dev_mode,
        }
    }

    /// Record an unread counter and attempt channel delivery.
    ///
    /// The counter write happens first; delivery failures are logged and
    /// swallowed so they never surface into a handler that has already
    /// committed its state transition.
    pub fn dispatch(&self, user_id: UserId, subject: &str, message: &str, kind: NotificationKind) {
        if let Err(err) = self.store.increment_counter(user_id, kind) {
            tracing::warn!(user = %user_id, kind = kind.as_str(), error = %err, "Failed to record notification counter");
        }

        if let Err(err) = self.notifier.notify(user_id, subject, message, kind) {
            tracing::warn!(user = %user_id, kind = kind.as_str(), error = %err, "Notification delivery failed");
        }
    }
}
