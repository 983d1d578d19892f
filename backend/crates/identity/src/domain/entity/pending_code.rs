//! Pending Verification Code
//!
//! The code and its issue time live in one value so they are always replaced
//! together.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl PendingCode {
    pub fn new(code: String, issued_at: DateTime<Utc>) -> Self {
        Self { code, issued_at }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.issued_at
    }

    /// Expired once `ttl` has fully elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.elapsed(now) >= ttl
    }

    /// Time left before another code may be issued, if any.
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<Duration> {
        let elapsed = self.elapsed(now);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }
}

impl std::fmt::Debug for PendingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCode")
            .field("code", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
        let pending = PendingCode::new("000123".into(), issued);
        let ttl = Duration::minutes(5);

        assert!(!pending.is_expired(issued + Duration::seconds(299), ttl));
        assert!(pending.is_expired(issued + ttl, ttl));
    }

    #[test]
    fn test_cooldown_remaining() {
        let issued = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
        let pending = PendingCode::new("000123".into(), issued);
        let cooldown = Duration::seconds(60);

        assert_eq!(
            pending.cooldown_remaining(issued + Duration::seconds(45), cooldown),
            Some(Duration::seconds(15))
        );
        assert_eq!(pending.cooldown_remaining(issued + cooldown, cooldown), None);
    }

    #[test]
    fn test_debug_hides_code() {
        let pending = PendingCode::new("987654".into(), Utc::now());
        assert!(!format!("{pending:?}").contains("987654"));
    }
}
