use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::ApiError, pagination::SearchFilter};

/// Role stored on the user and carried in token claims.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub role: Role,
    pub created_at: OffsetDateTime,
}

/// Insert payload; the password hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Storage access for user records. Handlers and the login flow only ever
/// talk to this trait, never to a row type with embedded persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    /// Page of users plus the total matching count. Ordering is stable
    /// (created_at, id) so pages are deterministic across calls.
    async fn find_all_paginated(
        &self,
        filter: &SearchFilter,
    ) -> Result<(Vec<User>, i64), ApiError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        // A duplicate email surfaces as a unique violation and is
        // translated to Conflict by From<sqlx::Error>.
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_all_paginated(
        &self,
        filter: &SearchFilter,
    ) -> Result<(Vec<User>, i64), ApiError> {
        match filter.search() {
            Some(term) => {
                let pattern = format!("%{}%", term);
                let users = sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS}
                    FROM users
                    WHERE name ILIKE $1 OR email ILIKE $1
                    ORDER BY created_at, id
                    LIMIT $2 OFFSET $3
                    "#
                ))
                .bind(&pattern)
                .bind(filter.limit())
                .bind(filter.offset())
                .fetch_all(&self.db)
                .await?;
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM users WHERE name ILIKE $1 OR email ILIKE $1",
                )
                .bind(&pattern)
                .fetch_one(&self.db)
                .await?;
                Ok((users, total))
            }
            None => {
                let users = sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS}
                    FROM users
                    ORDER BY created_at, id
                    LIMIT $1 OFFSET $2
                    "#
                ))
                .bind(filter.limit())
                .bind(filter.offset())
                .fetch_all(&self.db)
                .await?;
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.db)
                    .await?;
                Ok((users, total))
            }
        }
    }
}
