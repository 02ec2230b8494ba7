//! Notification dispatch abstractions
//!
//! Delivery is best-effort: the channel (console in development, SMTP in
//! production) reports errors as strings, and callers log them without
//! ever failing a committed state transition over one.

pub mod console;
pub mod smtp;

pub use console::ConsoleNotifier;
pub use smtp::{SmtpConfig, SmtpNotifier};

use phoneswap_core::{NotificationKind, UserId};

/// Trait for delivering user-facing notifications
pub trait Notifier: Send + Sync {
    /// Deliver a notification to a user over the configured channel
    fn notify(
        &self,
        user_id: UserId,
        subject: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), String>;
}

/// Allow using Box<dyn Notifier> as a Notifier
impl Notifier for Box<dyn Notifier> {
    fn notify(
        &self,
        user_id: UserId,
        subject: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), String> {
        (**self).notify(user_id, subject, message, kind)
    }
}
