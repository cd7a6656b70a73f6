//! Server-side sessions referenced by a signed cookie.
//!
//! The cookie only carries a random session id; the user id lives in the
//! [`Cache`] under `session:{id}` and expires with the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, CookieJar, Key, SameSite, time};
use uuid::Uuid;

use quill_core::ports::{Cache, CacheError};

use crate::config::SessionConfig;

pub const SESSION_COOKIE: &str = "quill.sid";
pub const OAUTH_STATE_COOKIE: &str = "quill.oauth";

/// How long a started Google sign-in may take before its state is discarded.
const OAUTH_STATE_TTL: Duration = Duration::from_secs(600);

/// Issues, resolves and revokes browser sessions.
#[derive(Clone)]
pub struct SessionManager {
    cache: Arc<dyn Cache>,
    key: Key,
    ttl: Duration,
    secure: bool,
}

impl SessionManager {
    pub fn new(cache: Arc<dyn Cache>, config: &SessionConfig) -> Self {
        let key = match &config.secret {
            Some(secret) => Key::derive_from(secret.as_bytes()),
            None => Key::generate(),
        };

        Self {
            cache,
            key,
            ttl: config.ttl,
            secure: config.cookie_secure,
        }
    }

    /// Persist a new session for `user_id` and return the cookie that references it.
    pub async fn start(&self, user_id: Uuid) -> Result<Cookie<'static>, CacheError> {
        let session_id = Uuid::new_v4();
        self.cache
            .set(
                &session_key(session_id),
                &user_id.to_string(),
                Some(self.ttl),
            )
            .await?;

        tracing::debug!(user_id = %user_id, "Session started");

        let cookie = self.cookie(SESSION_COOKIE, session_id.to_string(), self.ttl);
        Ok(self.sign(cookie))
    }

    /// The user behind the request's session cookie, if it is authentic and unexpired.
    pub async fn user_id(&self, req: &HttpRequest) -> Option<Uuid> {
        let session_id = self.verified(req, SESSION_COOKIE)?.parse::<Uuid>().ok()?;
        let user_id = self.cache.get(&session_key(session_id)).await?;
        user_id.parse().ok()
    }

    /// Revoke the request's session server-side and return a cookie that clears it.
    pub async fn end(&self, req: &HttpRequest) -> Cookie<'static> {
        if let Some(session_id) = self
            .verified(req, SESSION_COOKIE)
            .and_then(|v| v.parse::<Uuid>().ok())
        {
            if let Err(e) = self.cache.delete(&session_key(session_id)).await {
                tracing::error!(error = %e, "Failed to revoke session");
            }
        }

        removal(SESSION_COOKIE)
    }

    /// Remember the PKCE verifier for a pending sign-in and bind its state to this browser.
    pub async fn begin_oauth(&self, state: &str, verifier: &str) -> Result<Cookie<'static>, CacheError> {
        self.cache
            .set(&oauth_key(state), verifier, Some(OAUTH_STATE_TTL))
            .await?;

        let cookie = self.cookie(OAUTH_STATE_COOKIE, state.to_string(), OAUTH_STATE_TTL);
        Ok(self.sign(cookie))
    }

    /// Consume the pending sign-in for `state`. Succeeds at most once, and only
    /// for the browser that started it.
    pub async fn finish_oauth(&self, req: &HttpRequest, state: &str) -> Option<String> {
        let expected = self.verified(req, OAUTH_STATE_COOKIE)?;
        if expected != state {
            tracing::warn!("OAuth state does not match this browser");
            return None;
        }

        let key = oauth_key(state);
        let verifier = self.cache.get(&key).await?;
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(error = %e, "Failed to discard OAuth state");
        }
        Some(verifier)
    }

    /// Cookie that clears the pending sign-in marker.
    pub fn clear_oauth(&self) -> Cookie<'static> {
        removal(OAUTH_STATE_COOKIE)
    }

    fn cookie(&self, name: &'static str, value: String, ttl: Duration) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(ttl.as_secs() as i64))
            .finish()
    }

    fn sign(&self, cookie: Cookie<'static>) -> Cookie<'static> {
        let name = cookie.name().to_string();
        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key).add(cookie);
        jar.get(&name)
            .cloned()
            .unwrap_or_else(|| removal(SESSION_COOKIE))
    }

    /// Cookie value after signature verification.
    fn verified(&self, req: &HttpRequest, name: &str) -> Option<String> {
        let cookie = req.cookie(name)?;
        let mut jar = CookieJar::new();
        jar.add_original(cookie);
        let verified = jar.signed(&self.key).get(name);
        if verified.is_none() {
            tracing::warn!(cookie = name, "Rejected cookie with invalid signature");
        }
        verified.map(|c| c.value().to_string())
    }
}

fn session_key(session_id: Uuid) -> String {
    format!("session:{session_id}")
}

fn oauth_key(state: &str) -> String {
    format!("oauth:{state}")
}

fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}
