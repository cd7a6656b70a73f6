//! Authentication ports.
//!
//! The web layer only ever talks to [`AuthService`]; credential hashing and the
//! third-party identity provider sit behind their own traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::error::RepoError;

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Registration input for a local account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Profile returned by an identity provider after a successful callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider_id: String,
    pub email: String,
    pub display_name: String,
}

/// A provider authorization redirect and the secrets needed to finish it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    /// CSRF state echoed back on the callback.
    pub state: String,
    /// PKCE verifier that must accompany the code exchange.
    pub verifier: String,
}

/// Third-party identity provider (OAuth2 authorization-code flow).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the URL the browser is sent to for consent.
    fn authorization_request(&self) -> Result<AuthorizationRequest, AuthError>;

    /// Exchange the callback code and fetch the user's profile.
    async fn exchange(&self, code: &str, verifier: &str) -> Result<OAuthProfile, AuthError>;
}

/// Account operations the web layer depends on.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a local account. No record is written if validation or a uniqueness check fails.
    async fn register(&self, account: NewAccount) -> Result<User, AuthError>;

    /// Check a username and password pair.
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Find or create the user behind a provider profile, keyed by email.
    async fn login_with_profile(&self, profile: OAuthProfile) -> Result<User, AuthError>;

    /// Load the user a session points at.
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Already registered: {0}")]
    Duplicate(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),
}
