// ============================
// crates/backend-lib/src/store.rs
// ============================
//! Durable user storage abstraction with an in-memory implementation.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;

/// A finalized, email-verified user
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a finalized user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub refresh_token: String,
}

/** Trait for user storage backends.

Lookups are a closed set of named operations rather than a
field-name/value pair, so a caller can never parameterize a query with an
arbitrary column. Not-found on `update_refresh_token` is an error; the
`find_*` operations report it as `None`. */
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a finalized user, enforcing email and username uniqueness
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Replace a user's refresh token, returning the updated user
    async fn update_refresh_token(&self, id: Uuid, refresh_token: &str) -> Result<User, AppError>;
}

/// In-memory implementation of the `UserStore` trait
#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::Conflict { field: "email" });
        }
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::Conflict { field: "username" });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            refresh_token: user.refresh_token,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_refresh_token(&self, id: Uuid, refresh_token: &str) -> Result<User, AppError> {
        let mut entry = self
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
        entry.refresh_token = refresh_token.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }
}
