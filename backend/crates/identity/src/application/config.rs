//! Application Configuration
//!
//! Configuration for the identity application layer.

use std::fmt;
use std::time::Duration;

use platform::crypto::random_bytes;

#[derive(Clone)]
pub struct IdentityConfig {
    /// HS256 key for session tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Session token lifetime (24 hours)
    pub token_ttl: Duration,
    /// Digits per verification code
    pub code_length: usize,
    /// Minimum interval between two codes for the same recipient (60 seconds)
    pub code_cooldown: Duration,
    /// Verification code lifetime (5 minutes)
    pub code_ttl: Duration,
    /// How often expired codes are swept from memory (10 minutes)
    pub code_purge_interval: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// From-address shown on outbound mails
    pub notification_sender: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(24 * 3600),
            code_length: 6,
            code_cooldown: Duration::from_secs(60),
            code_ttl: Duration::from_secs(5 * 60),
            code_purge_interval: Duration::from_secs(10 * 60),
            password_pepper: None,
            notification_sender: "no-reply@localhost".to_string(),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&random_bytes(32));
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Random secret, no pepper
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        to_chrono(self.token_ttl)
    }

    pub fn code_cooldown_chrono(&self) -> chrono::Duration {
        to_chrono(self.code_cooldown)
    }

    pub fn code_ttl_chrono(&self) -> chrono::Duration {
        to_chrono(self.code_ttl)
    }

    /// Whole minutes, as quoted in the verification mail
    pub fn code_ttl_minutes(&self) -> u64 {
        self.code_ttl.as_secs() / 60
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("code_length", &self.code_length)
            .field("code_cooldown", &self.code_cooldown)
            .field("code_ttl", &self.code_ttl)
            .field("code_purge_interval", &self.code_purge_interval)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("notification_sender", &self.notification_sender)
            .finish()
    }
}
