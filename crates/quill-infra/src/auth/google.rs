//! Google OAuth2 identity provider (authorization code flow with PKCE).

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use quill_core::ports::{AuthError, AuthorizationRequest, IdentityProvider, OAuthProfile};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested on the consent screen.
const SCOPES: [&str; 2] = ["profile", "email"];

/// Google OAuth2 client configuration.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    /// Configuration against Google's public endpoints.
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Google userinfo (v2) response.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
    #[serde(default)]
    verified_email: bool,
    name: Option<String>,
}

impl GoogleUser {
    fn into_profile(self) -> Result<OAuthProfile, AuthError> {
        if !self.verified_email {
            return Err(AuthError::Provider("Google email is not verified".to_string()));
        }

        let display_name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.split('@').next().unwrap_or_default().to_string());

        Ok(OAuthProfile {
            provider_id: self.id,
            email: self.email,
            display_name,
        })
    }
}

/// [`IdentityProvider`] for Google accounts.
pub struct GoogleIdentityProvider {
    client: BasicClient,
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleConfig) -> Result<Self, AuthError> {
        let invalid = |e: oauth2::url::ParseError| AuthError::Provider(e.to_string());

        let client = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            AuthUrl::new(config.auth_url).map_err(invalid)?,
            Some(TokenUrl::new(config.token_url).map_err(invalid)?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url).map_err(invalid)?);

        Ok(Self {
            client,
            http: reqwest::Client::new(),
            userinfo_url: config.userinfo_url,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, AuthError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "Failed to get Google user profile: {}",
                response.status()
            )));
        }

        let user: GoogleUser = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        user.into_profile()
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_request(&self) -> Result<AuthorizationRequest, AuthError> {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let (url, csrf_token) = request.url();

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state: csrf_token.secret().clone(),
            verifier: pkce_verifier.secret().clone(),
        })
    }

    async fn exchange(&self, code: &str, verifier: &str) -> Result<OAuthProfile, AuthError> {
        tracing::debug!("Exchanging Google authorization code");

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(verifier.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        self.fetch_profile(token.access_token().secret()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleIdentityProvider {
        GoogleIdentityProvider::new(GoogleConfig::new(
            "client-123".to_string(),
            "secret".to_string(),
            "http://localhost:3000/auth/google/callback".to_string(),
        ))
        .unwrap()
    }

    #[test]
    fn test_authorization_url_carries_state_and_pkce() {
        let request = provider().authorization_request().unwrap();

        assert!(request.url.starts_with(GOOGLE_AUTH_URL));
        assert!(request.url.contains("client_id=client-123"));
        assert!(request.url.contains("code_challenge_method=S256"));
        assert!(request.url.contains(&format!("state={}", request.state)));
        assert!(request.url.contains("scope=profile+email"));
        assert!(!request.verifier.is_empty());
    }

    #[test]
    fn test_each_request_gets_fresh_state() {
        let provider = provider();
        let a = provider.authorization_request().unwrap();
        let b = provider.authorization_request().unwrap();
        assert_ne!(a.state, b.state);
        assert_ne!(a.verifier, b.verifier);
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let mut config = GoogleConfig::new("id".into(), "secret".into(), "not a url".into());
        config.auth_url = GOOGLE_AUTH_URL.to_string();
        assert!(matches!(
            GoogleIdentityProvider::new(config),
            Err(AuthError::Provider(_))
        ));
    }

    #[test]
    fn test_profile_falls_back_to_email_name() {
        let user = GoogleUser {
            id: "g-1".into(),
            email: "ada@example.com".into(),
            verified_email: true,
            name: None,
        };
        let profile = user.into_profile().unwrap();
        assert_eq!(profile.display_name, "ada");
        assert_eq!(profile.provider_id, "g-1");
    }

    #[test]
    fn test_unverified_email_is_refused() {
        let user = GoogleUser {
            id: "g-1".into(),
            email: "ada@example.com".into(),
            verified_email: false,
            name: Some("Ada".into()),
        };
        assert!(user.into_profile().is_err());
    }
}
