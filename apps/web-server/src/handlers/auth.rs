//! Local account handlers: registration, login and logout.

use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use quill_core::ports::{AuthError, NewAccount};
use quill_shared::ApiResponse;
use quill_shared::dto::{LoginForm, RegisterForm};

use super::see_other;
use super::views::page_context;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Replace any session the browser already holds with a fresh one for `user_id`.
pub(super) async fn start_session(
    state: &AppState,
    req: &HttpRequest,
    user_id: Uuid,
) -> AppResult<Cookie<'static>> {
    state.sessions.end(req).await;
    state
        .sessions
        .start(user_id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to start session: {e}")))
}

/// GET /register
pub async fn register_form(identity: OptionalIdentity, req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(page_context(identity.0.as_ref(), &req)))
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let RegisterForm {
        email,
        username,
        password,
    } = form.into_inner();

    let user = match state
        .auth
        .register(NewAccount {
            email,
            username,
            password,
        })
        .await
    {
        Ok(user) => user,
        Err(AuthError::Validation(msg)) | Err(AuthError::Duplicate(msg)) => {
            tracing::info!(reason = %msg, "Registration rejected");
            return Ok(see_other("/register").finish());
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };

    let cookie = start_session(&state, &req, user.id).await?;
    Ok(see_other("/").cookie(cookie).finish())
}

/// GET /login
pub async fn login_form(identity: OptionalIdentity, req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(page_context(identity.0.as_ref(), &req)))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let LoginForm { username, password } = form.into_inner();

    let user = match state.auth.verify_credentials(&username, &password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed: invalid credentials");
            return Ok(see_other("/login").finish());
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };

    tracing::info!(user_id = %user.id, "User logged in");
    let cookie = start_session(&state, &req, user.id).await?;
    Ok(see_other("/").cookie(cookie).finish())
}

/// GET /logout
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let removal = state.sessions.end(&req).await;
    see_other("/login").cookie(removal).finish()
}
