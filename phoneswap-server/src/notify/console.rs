//! Console-based notifier for development

use phoneswap_core::{NotificationKind, UserId};

use super::Notifier;

/// Notifier that logs to console (for development)
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(
        &self,
        user_id: UserId,
        subject: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  NOTIFICATION FOR USER: {}", user_id);
        println!("  [{}] {}", kind.as_str(), subject);
        println!("  {}", message);
        println!("========================================");
        println!();

        tracing::info!(user = %user_id, kind = kind.as_str(), subject = %subject, "Notification sent");

        Ok(())
    }
}
