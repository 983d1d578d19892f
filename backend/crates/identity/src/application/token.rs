//! Session Token Service
//!
//! Stateless HS256 JWTs. Besides `sub`, `iat` and `exp` a token carries
//! string claims such as the account's email. No server-side record exists,
//! so a token stays valid until it expires.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use platform::clock::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::IdentityConfig;
use crate::error::{IdentityError, IdentityResult};

/// Claim holding the account's email address.
pub const EMAIL_CLAIM: &str = "email";

/// Registered claims managed by the service itself
const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Verification failed. Deliberately carries no reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Contents of a token that passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub claims: BTreeMap<String, String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedToken {
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }
}

/// JWT body. `iat` and `exp` are seconds since the epoch.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &IdentityConfig, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against the injected clock in `decode_claims`,
        // the library would read the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.token_secret),
            decoding_key: DecodingKey::from_secret(&config.token_secret),
            validation,
            default_ttl: config.token_ttl_chrono(),
            clock,
        }
    }

    /// Sign a token for `subject` valid for `ttl` from now.
    ///
    /// Claims named like a registered claim are dropped.
    pub fn issue(
        &self,
        subject: &str,
        mut claims: BTreeMap<String, String>,
        ttl: Duration,
    ) -> IdentityResult<String> {
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            IdentityError::Internal(format!("Token lifetime {ttl} is out of range"))
        })?;

        claims.retain(|name, _| !RESERVED_CLAIMS.contains(&name.as_str()));
        let body = SessionClaims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            extra: claims,
        };

        encode(&Header::new(Algorithm::HS256), &body, &self.encoding_key)
            .map_err(|e| IdentityError::Internal(format!("Failed to encode JWT: {e}")))
    }

    /// Sign a session token with the configured lifetime.
    pub fn issue_session(
        &self,
        subject: &str,
        claims: BTreeMap<String, String>,
    ) -> IdentityResult<String> {
        self.issue(subject, claims, self.default_ttl)
    }

    /// Check signature and expiry. Any failure, including garbage input,
    /// yields [`InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, InvalidToken> {
        self.decode_claims(token).map_err(|reason| {
            tracing::debug!(reason = %reason, "Token verification failed");
            InvalidToken
        })
    }

    fn decode_claims(&self, token: &str) -> Result<VerifiedToken, String> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| format!("{:?}", e.kind()))?;
        let claims = data.claims;

        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or("iat out of range")?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or("exp out of range")?;

        if self.clock.now() >= expires_at {
            return Err("expired".to_string());
        }

        Ok(VerifiedToken {
            subject: claims.sub,
            claims: claims.extra,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use platform::clock::ManualClock;

    fn to_base64url(bytes: &[u8]) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn service() -> (Arc<ManualClock>, TokenService) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
        ));
        let config = IdentityConfig {
            token_secret: [42u8; 32],
            ..IdentityConfig::default()
        };
        let service = TokenService::new(&config, clock.clone());
        (clock, service)
    }

    fn email_claims() -> BTreeMap<String, String> {
        BTreeMap::from([(EMAIL_CLAIM.to_string(), "a@x.com".to_string())])
    }

    #[test]
    fn test_issue_then_verify() {
        let (_, service) = service();
        let token = service.issue("42", email_claims(), Duration::hours(1)).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verified = service.verify(&token).unwrap();
        assert_eq!(verified.subject, "42");
        assert_eq!(verified.claim(EMAIL_CLAIM), Some("a@x.com"));
        assert_eq!(verified.expires_at - verified.issued_at, Duration::hours(1));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let (clock, service) = service();
        let token = service.issue("42", BTreeMap::new(), Duration::hours(1)).unwrap();

        clock.advance(Duration::minutes(59));
        assert!(service.verify(&token).is_ok());

        clock.advance(Duration::minutes(1));
        assert_eq!(service.verify(&token), Err(InvalidToken));

        clock.advance(Duration::hours(1));
        assert_eq!(service.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn test_issue_is_deterministic_for_fixed_clock() {
        let (_, service) = service();
        let a = service.issue("7", email_claims(), Duration::hours(1)).unwrap();
        let b = service.issue("7", email_claims(), Duration::hours(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_session_uses_configured_ttl() {
        let (_, service) = service();
        let token = service.issue_session("1", email_claims()).unwrap();
        let verified = service.verify(&token).unwrap();
        assert_eq!(verified.expires_at - verified.issued_at, Duration::hours(24));
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let (clock, _) = service();
        let config = IdentityConfig {
            token_ttl: std::time::Duration::from_secs(10_000_000_000_000),
            ..IdentityConfig::with_random_secret()
        };
        let service = TokenService::new(&config, clock);

        assert!(matches!(
            service.issue_session("1", BTreeMap::new()),
            Err(IdentityError::Internal(_))
        ));
    }

    #[test]
    fn test_reserved_claims_cannot_be_overridden() {
        let (_, service) = service();
        let mut claims = email_claims();
        claims.insert("sub".into(), "1".into());
        claims.insert("exp".into(), "9999999999".into());

        let token = service.issue("42", claims, Duration::hours(1)).unwrap();
        let verified = service.verify(&token).unwrap();
        assert_eq!(verified.subject, "42");
        assert_eq!(verified.claims, email_claims());
    }

    #[test]
    fn test_tampered_signature() {
        let (_, service) = service();
        let token = service.issue("42", email_claims(), Duration::hours(1)).unwrap();
        let (signed, sig) = token.rsplit_once('.').unwrap();

        let mut sig_bytes = URL_SAFE_NO_PAD.decode(sig).unwrap();
        sig_bytes[0] ^= 0x01;
        let forged = format!("{signed}.{}", to_base64url(&sig_bytes));
        assert_eq!(service.verify(&forged), Err(InvalidToken));
    }

    #[test]
    fn test_tampered_payload() {
        let (_, service) = service();
        let token = service.issue("42", email_claims(), Duration::hours(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = to_base64url(
            br#"{"sub":"1","email":"admin@x.com","iat":0,"exp":9999999999}"#,
        );
        let forged = format!("{}.{forged_payload}.{}", parts[0], parts[2]);
        assert_eq!(service.verify(&forged), Err(InvalidToken));
    }

    #[test]
    fn test_other_key_rejected() {
        let (clock, service) = service();
        let token = service.issue("42", email_claims(), Duration::hours(1)).unwrap();

        let other = TokenService::new(&IdentityConfig::with_random_secret(), clock);
        assert_eq!(other.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn test_unsigned_algorithm_rejected() {
        let (_, service) = service();
        let header = to_base64url(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = to_base64url(br#"{"sub":"42","iat":0,"exp":9999999999}"#);
        assert_eq!(
            service.verify(&format!("{header}.{payload}.")),
            Err(InvalidToken)
        );
    }

    #[test]
    fn test_garbage_never_panics() {
        let (_, service) = service();
        for garbage in [
            "",
            ".",
            "..",
            "a.b.c",
            "not-a-token",
            "====.====.====",
            "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.c2ln",
            "\u{0}\u{1}.\u{2}",
            "🦀.🦀.🦀",
        ] {
            assert_eq!(service.verify(garbage), Err(InvalidToken), "{garbage:?}");
        }
    }

    #[test]
    fn test_non_string_claim_rejected() {
        let (_, service) = service();
        let body = serde_json::json!({ "sub": "42", "iat": 0, "exp": 9999999999i64, "admin": true });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &body,
            &EncodingKey::from_secret(&[42u8; 32]),
        )
        .unwrap();
        assert_eq!(service.verify(&token), Err(InvalidToken));
    }
}
