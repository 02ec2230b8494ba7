//! SMTP-based notifier for production

use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use serde::Deserialize;

use phoneswap_core::{NotificationKind, UserId};

use super::Notifier;

/// Configuration for SMTP notification delivery
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server host (e.g., "smtp.resend.com")
    pub host: String,
    /// SMTP server port (typically 465 for TLS, 587 for STARTTLS)
    pub port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password (or API key for services like Resend)
    pub password: String,
    /// From email address
    pub from_email: String,
    /// Domain whose relay maps user mailboxes (user-<id>@<domain>)
    pub recipient_domain: String,
}

impl SmtpConfig {
    /// Create config from environment variables
    ///
    /// Required:
    /// - SMTP_HOST
    /// - SMTP_USERNAME
    /// - SMTP_PASSWORD
    /// - SMTP_FROM_EMAIL
    /// - SMTP_RECIPIENT_DOMAIN
    ///
    /// Optional:
    /// - SMTP_PORT (default: 465)
    pub fn from_env() -> Option<Self> {
        // Helper to get non-empty env var
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        let host = get_env("SMTP_HOST")?;
        let username = get_env("SMTP_USERNAME")?;
        let password = get_env("SMTP_PASSWORD")?;
        let from_email = get_env("SMTP_FROM_EMAIL")?;
        let recipient_domain = get_env("SMTP_RECIPIENT_DOMAIN")?;

        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(465);

        Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            recipient_domain,
        })
    }
}

/// SMTP notifier for production use
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn recipient_for(&self, user_id: UserId) -> String {
        format!("user-{}@{}", user_id, self.config.recipient_domain)
    }
}

impl Notifier for SmtpNotifier {
    fn notify(
        &self,
        user_id: UserId,
        subject: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), String> {
        let to = self.recipient_for(user_id);

        let email = Message::builder()
            .from(
                self.config
                    .from_email
                    .parse()
                    .map_err(|e| format!("invalid from address: {}", e))?,
            )
            .to(to.parse().map_err(|e| format!("invalid to address: {}", e))?)
            .subject(format!("[{}] {}", kind.as_str(), subject))
            .header(ContentType::TEXT_PLAIN)
            .body(message.to_string())
            .map_err(|e| format!("failed to build message: {}", e))?;

        let mailer = SmtpTransport::relay(&self.config.host)
            .map_err(|e| format!("failed to create transport: {}", e))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        mailer
            .send(&email)
            .map_err(|e| format!("failed to send: {}", e))?;

        tracing::info!(user = %user_id, kind = kind.as_str(), "Notification delivered via SMTP");
        Ok(())
    }
}
