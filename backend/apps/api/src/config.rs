//! Server configuration from the environment

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use identity::IdentityConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
/// One year
const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 3600;

pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub identity: IdentityConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let frontend_origins = parse_origins(
            &env::var("FRONTEND_ORIGINS").unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string()),
        );

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            identity: identity_config_from_env()?,
        })
    }
}

fn identity_config_from_env() -> anyhow::Result<IdentityConfig> {
    let mut config = match env::var("TOKEN_SECRET") {
        Ok(encoded) => IdentityConfig {
            token_secret: decode_secret(&encoded)?,
            ..IdentityConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("TOKEN_SECRET not set, using a random secret for this process");
            IdentityConfig::with_random_secret()
        }
        Err(_) => bail!("TOKEN_SECRET must be set in production"),
    };

    if let Ok(secs) = env::var("TOKEN_TTL_SECS") {
        config.token_ttl = parse_token_ttl(&secs)?;
    }

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(
            general_purpose::STANDARD
                .decode(pepper.trim())
                .context("PASSWORD_PEPPER is not valid base64")?,
        );
    }

    if let Ok(sender) = env::var("NOTIFICATION_SENDER") {
        config.notification_sender = sender;
    }

    Ok(config)
}

/// Standard base64 of exactly 32 bytes.
fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .context("TOKEN_SECRET is not valid base64")?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        anyhow::anyhow!("TOKEN_SECRET must decode to 32 bytes, got {}", bytes.len())
    })
}

fn parse_token_ttl(raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw.trim().parse().context("TOKEN_TTL_SECS is not a number")?;
    if secs == 0 || secs > MAX_TOKEN_TTL_SECS {
        bail!("TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_secret() {
        let encoded = general_purpose::STANDARD.encode([7u8; 32]);
        assert_eq!(decode_secret(&encoded).unwrap(), [7u8; 32]);

        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(decode_secret(&short).is_err());
        assert!(decode_secret("not base64!").is_err());
    }

    #[test]
    fn test_parse_token_ttl_bounds() {
        assert_eq!(parse_token_ttl("3600").unwrap(), Duration::from_secs(3600));
        assert!(parse_token_ttl("0").is_err());
        assert!(parse_token_ttl("10000000000000").is_err());
        assert!(parse_token_ttl("soon").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test ,,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
