use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::error::RepoError;
use crate::ports::{AuthError, AuthService, NewAccount, OAuthProfile, PasswordService, UserRepository};

/// Minimum accepted password length for local accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// [`AuthService`] backed by a user repository and a password hasher.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    fn validate(account: &NewAccount) -> Result<(), AuthError> {
        if account.email.is_empty() || !account.email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        if account.username.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if account.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

fn duplicate_on_constraint(err: RepoError) -> AuthError {
    match err {
        RepoError::Constraint(msg) => AuthError::Duplicate(msg),
        other => AuthError::Repository(other),
    }
}

#[async_trait]
impl AuthService for AccountService {
    async fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        let account = NewAccount {
            email: account.email.trim().to_string(),
            username: account.username.trim().to_string(),
            password: account.password,
        };
        Self::validate(&account)?;

        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(AuthError::Duplicate("Email already registered".to_string()));
        }
        if self.users.find_by_username(&account.username).await?.is_some() {
            return Err(AuthError::Duplicate("Username already taken".to_string()));
        }

        let password_hash = self.passwords.hash(&account.password)?;
        let user = User::new(account.email, account.username, password_hash);

        // The store's unique indexes still guard against a concurrent registration.
        let saved = self
            .users
            .insert(user)
            .await
            .map_err(duplicate_on_constraint)?;

        tracing::info!(user_id = %saved.id, "User registered");
        Ok(saved)
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn login_with_profile(&self, profile: OAuthProfile) -> Result<User, AuthError> {
        let OAuthProfile {
            provider_id,
            email,
            display_name,
        } = profile;

        match self.users.find_by_email(&email).await? {
            Some(mut user) => {
                user.link_google(provider_id, display_name);
                let user = self
                    .users
                    .update(user)
                    .await
                    .map_err(duplicate_on_constraint)?;
                tracing::info!(user_id = %user.id, "Google account refreshed");
                Ok(user)
            }
            None => {
                let user = User::from_google(email, display_name, provider_id);
                let user = self
                    .users
                    .insert(user)
                    .await
                    .map_err(duplicate_on_constraint)?;
                tracing::info!(user_id = %user.id, "User created from Google profile");
                Ok(user)
            }
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_id(id).await?)
    }
}
