//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, collaborator traits, authorization rules
//! - `application/` - Use cases, the verification code store, the token service
//! - `infra/` - PostgreSQL and in-memory repositories, notification transports
//! - `presentation/` - HTTP handlers, DTOs, extractors, middleware, router
//!
//! ## Features
//! - Email verification codes with a resend cooldown and a short expiry
//! - Registration, sign-in and password reset driven by those codes
//! - Stateless HS256 JWT bearer tokens
//! - Per-request authentication with once-a-day activity bookkeeping
//! - Nickname availability checks and profile edits
//! - Admin-only enabling, disabling and deletion of accounts, daily active count
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Codes compared in constant time
//! - Token failures never reveal why a token was refused
//! - Disabled accounts are turned away before any handler runs

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::{InMemoryAccountRepository, PgAccountRepository, TracingTransport};
pub use presentation::handlers::IdentityAppState;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod extractors {
    pub use crate::presentation::extractors::*;
}

#[cfg(test)]
mod scenario_tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use platform::clock::ManualClock;

    use crate::application::{TokenService, VerificationCodeStore};
    use crate::error::IdentityError;
    use crate::IdentityConfig;

    #[test]
    fn test_code_and_token_lifecycle() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
        ));
        let config = IdentityConfig::development();
        let codes = VerificationCodeStore::new(&config, clock.clone())
            .with_code_source(|_| "123456".to_string());
        let tokens = TokenService::new(&config, clock.clone());

        codes.issue("a@x.com").unwrap();
        clock.advance(Duration::seconds(30));
        assert!(matches!(
            codes.issue("a@x.com"),
            Err(IdentityError::Throttled { .. })
        ));

        clock.advance(Duration::seconds(30));
        assert_eq!(codes.issue("a@x.com").unwrap(), "123456");
        clock.advance(Duration::minutes(4));
        assert!(codes.verify("a@x.com", "123456"));
        clock.advance(Duration::minutes(2));
        assert!(!codes.verify("a@x.com", "123456"));

        let token = tokens
            .issue("42", BTreeMap::new(), Duration::hours(1))
            .unwrap();
        assert_eq!(tokens.verify(&token).unwrap().subject, "42");
        clock.advance(Duration::hours(2));
        assert!(tokens.verify(&token).is_err());
    }
}
