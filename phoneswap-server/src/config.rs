//! Server configuration

use serde::Deserialize;

use crate::notify::SmtpConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Shared secret for signing bearer credentials
    pub credential_secret: String,

    /// Credential lifetime in minutes
    pub credential_ttl_minutes: i64,

    /// Path to the SQLite database ("" selects the in-memory store)
    pub db_path: String,

    /// Whether dev-only surfaces (admin auth-status mutation) are enabled
    pub dev_mode: bool,

    /// SMTP configuration for delivering notifications
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// development defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("PHONESWAP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let credential_secret = std::env::var("PHONESWAP_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "dev-credential-secret".to_string());

        let credential_ttl_minutes = std::env::var("PHONESWAP_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(12 * 60);

        let db_path = std::env::var("PHONESWAP_DB").unwrap_or_default();

        let dev_mode = std::env::var("PHONESWAP_DEV_MODE")
            .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            port,
            credential_secret,
            credential_ttl_minutes,
            db_path,
            dev_mode,
            smtp: SmtpConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            credential_secret: "dev-credential-secret".to_string(),
            credential_ttl_minutes: 12 * 60,
            db_path: String::new(),
            dev_mode: false,
            smtp: None,
        }
    }
}
