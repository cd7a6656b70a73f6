//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, bail};

use quill_infra::GoogleConfig;
use quill_infra::database::DatabaseConfig;

/// Minimum `SESSION_SECRET` length; the cookie signing key is derived from it.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// `None` means a random key per process: sessions do not survive restarts.
    pub secret: Option<String>,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl: Duration::from_secs(24 * 3600),
            cookie_secure: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub redis_url: Option<String>,
    pub session: SessionConfig,
    pub google: Option<GoogleConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 10),
        });

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            Err(_) => 3000,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            database,
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            session: Self::session_from_env()?,
            google: Self::google_from_env(),
        })
    }

    fn session_from_env() -> anyhow::Result<SessionConfig> {
        let secret = env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty());

        match &secret {
            Some(s) if s.len() < MIN_SESSION_SECRET_LEN => {
                bail!("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes")
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    "SESSION_SECRET not set. Using a random signing key; sessions end on restart."
                );
            }
        }

        Ok(SessionConfig {
            secret,
            ttl: session_ttl(parse_or("SESSION_TTL_HOURS", 24u64)),
            cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Google sign-in is enabled only when both client id and secret are present.
    fn google_from_env() -> Option<GoogleConfig> {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok().filter(|s| !s.is_empty());
        let client_secret = env::var("GOOGLE_CLIENT_SECRET").ok().filter(|s| !s.is_empty());

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Some(GoogleConfig::new(
                id,
                secret,
                env::var("GOOGLE_CALLBACK_URL").unwrap_or_else(|_| {
                    "http://localhost:3000/auth/google/callback".to_string()
                }),
            )),
            _ => {
                tracing::info!("Google OAuth not configured; /auth/google is disabled");
                None
            }
        }
    }
}

/// Saturates instead of overflowing on absurd hour counts.
fn session_ttl(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
