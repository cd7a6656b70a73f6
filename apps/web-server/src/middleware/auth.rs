//! Session-backed identity extractors.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use quill_core::domain::User;
use quill_shared::ErrorResponse;
use quill_shared::dto::CurrentUser;

use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Resolves the session cookie to a user ("deserialization"). Handlers that take
/// an `Identity` are login-gated: anonymous requests are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

impl Identity {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.user_id.to_string(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Why a request could not be tied to a user.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("No valid session")]
    NoSession,

    #[error("Session refers to a missing user")]
    UnknownUser,

    #[error("Server configuration error")]
    Misconfigured,

    #[error("User lookup failed: {0}")]
    Lookup(String),
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::NoSession | AuthenticationError::UnknownUser => {
                StatusCode::SEE_OTHER
            }
            AuthenticationError::Misconfigured | AuthenticationError::Lookup(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthenticationError::NoSession | AuthenticationError::UnknownUser => {
                HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, "/login"))
                    .finish()
            }
            AuthenticationError::Misconfigured | AuthenticationError::Lookup(_) => {
                tracing::error!(error = %self, "Authentication failed");
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal_error("An unexpected error occurred."))
            }
        }
    }
}

async fn resolve(req: HttpRequest) -> Result<Identity, AuthenticationError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("AppState not found in app data");
            AuthenticationError::Misconfigured
        })?;

    let user_id = state
        .sessions
        .user_id(&req)
        .await
        .ok_or(AuthenticationError::NoSession)?;

    let user = state
        .auth
        .find_user(user_id)
        .await
        .map_err(|e| AuthenticationError::Lookup(e.to_string()))?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Session refers to a missing user");
            AuthenticationError::UnknownUser
        })?;

    Ok(Identity::from(user))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(resolve(req.clone()))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match resolve(req).await {
                Ok(identity) => Ok(OptionalIdentity(Some(identity))),
                Err(AuthenticationError::Lookup(e)) => {
                    tracing::error!(error = %e, "User lookup failed; treating request as anonymous");
                    Ok(OptionalIdentity(None))
                }
                Err(_) => Ok(OptionalIdentity(None)),
            }
        })
    }
}
