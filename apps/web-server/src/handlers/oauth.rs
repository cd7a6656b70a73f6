//! Google sign-in (OAuth2 authorization code with PKCE).

use actix_web::{HttpRequest, HttpResponse, web};

use quill_core::domain::User;
use quill_shared::dto::OAuthCallbackQuery;

use super::auth::start_session;
use super::see_other;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /auth/google - redirect to Google's consent screen.
pub async fn google_start(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let provider = state.identity_provider.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Google sign-in is not configured".to_string())
    })?;

    let request = provider
        .authorization_request()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = state
        .sessions
        .begin_oauth(&request.state, &request.verifier)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store OAuth state: {e}")))?;

    Ok(see_other(&request.url).cookie(cookie).finish())
}

/// GET /auth/google/callback
pub async fn google_callback(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<OAuthCallbackQuery>,
) -> HttpResponse {
    let clear = state.sessions.clear_oauth();

    let user = match complete_sign_in(&state, &req, query.into_inner()).await {
        Ok(user) => user,
        Err(reason) => {
            tracing::warn!(reason = %reason, "Google sign-in failed");
            return see_other("/login").cookie(clear).finish();
        }
    };

    match start_session(&state, &req, user.id).await {
        Ok(cookie) => {
            tracing::info!(user_id = %user.id, "User signed in with Google");
            see_other("/").cookie(cookie).cookie(clear).finish()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start session after Google sign-in");
            see_other("/login").cookie(clear).finish()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    req: &HttpRequest,
    query: OAuthCallbackQuery,
) -> Result<User, String> {
    if let Some(error) = query.error {
        return Err(format!("provider returned error: {error}"));
    }

    let provider = state
        .identity_provider
        .as_ref()
        .ok_or("Google sign-in is not configured")?;
    let code = query.code.ok_or("missing code")?;
    let csrf_state = query.state.ok_or("missing state")?;

    let verifier = state
        .sessions
        .finish_oauth(req, &csrf_state)
        .await
        .ok_or("unknown or expired state")?;

    let profile = provider
        .exchange(&code, &verifier)
        .await
        .map_err(|e| e.to_string())?;

    state
        .auth
        .login_with_profile(profile)
        .await
        .map_err(|e| e.to_string())
}
