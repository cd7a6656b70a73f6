//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    AuthService, Cache, IdentityProvider, PasswordService, PostRepository, UserRepository,
};
use quill_core::services::{AccountService, PostService};
use quill_infra::database::DatabaseConnections;
use quill_infra::{
    Argon2PasswordService, GoogleIdentityProvider, InMemoryCache, InMemoryPostRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use anyhow::Context;
#[cfg(feature = "postgres")]
use quill_infra::database::{PostgresPostRepository, PostgresUserRepository};
#[cfg(feature = "redis")]
use quill_infra::{RedisCache, RedisConfig};

use crate::config::{AppConfig, SessionConfig};
use crate::session::SessionManager;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub posts: PostService,
    pub sessions: SessionManager,
    /// `None` when Google sign-in is not configured.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub db: Option<Arc<DatabaseConnections>>,
}

type Repositories = (
    Option<Arc<DatabaseConnections>>,
    Arc<dyn UserRepository>,
    Arc<dyn PostRepository>,
);

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let cache = Self::init_cache(config.redis_url.as_deref()).await;
        let (db, users, posts) = Self::init_repositories(config).await?;

        let mut state = Self::assemble(cache, users, posts, &config.session, db);
        if let Some(google) = &config.google {
            state = state.with_identity_provider(Arc::new(GoogleIdentityProvider::new(
                google.clone(),
            )?));
        }

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Everything in memory: no database, no Redis, no Google sign-in.
    #[cfg(test)]
    pub fn in_memory(session: &SessionConfig) -> Self {
        Self::assemble(
            Arc::new(InMemoryCache::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            session,
            None,
        )
    }

    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    fn assemble(
        cache: Arc<dyn Cache>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        session: &SessionConfig,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        Self {
            auth: Arc::new(AccountService::new(users, passwords)),
            posts: PostService::new(posts),
            sessions: SessionManager::new(cache, session),
            identity_provider: None,
            db,
        }
    }

    #[cfg(feature = "redis")]
    async fn init_cache(redis_url: Option<&str>) -> Arc<dyn Cache> {
        let Some(url) = redis_url else {
            tracing::warn!("REDIS_URL not set. Sessions are kept in memory.");
            return Arc::new(InMemoryCache::new());
        };

        match RedisCache::new(RedisConfig::from_env(url.to_string())).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to in-memory sessions.",
                    e
                );
                Arc::new(InMemoryCache::new())
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn init_cache(redis_url: Option<&str>) -> Arc<dyn Cache> {
        if redis_url.is_some() {
            tracing::warn!("REDIS_URL ignored: built without the redis feature");
        }
        Arc::new(InMemoryCache::new())
    }

    #[cfg(feature = "postgres")]
    async fn init_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Self::memory_repositories());
        };

        let connections = DatabaseConnections::init(db_config)
            .await
            .context("Failed to connect to database")?;
        let conn = Arc::new(connections);

        Ok((
            Some(conn.clone()),
            Arc::new(PostgresUserRepository::new(conn.main.clone())),
            Arc::new(PostgresPostRepository::new(conn.main.clone())),
        ))
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Ok(Self::memory_repositories())
    }

    fn memory_repositories() -> Repositories {
        (
            None,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
        )
    }
}
