use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, pagination::SearchFilter};

/// Append-only audit row, written once per successful login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ip: String,
    pub timestamp: OffsetDateTime,
}

/// Log row with its user resolved at read time. name/email are None when
/// the referenced user cannot be found.
#[derive(Debug, Clone, FromRow)]
pub struct AccessLogWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ip: String,
    pub timestamp: OffsetDateTime,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

/// Storage access for the audit trail. Entries are never updated or
/// deleted; listings are timestamp-descending.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn record(&self, user_id: Uuid, ip: &str) -> Result<(), ApiError>;
    async fn list_all(&self) -> Result<Vec<AccessLogWithUser>, ApiError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<AccessLogWithUser>, ApiError>;
    /// `search` matches user name/email, not the log rows themselves: the
    /// matching user ids are resolved first and an empty id set
    /// short-circuits to an empty page with total 0.
    async fn list_all_paginated(
        &self,
        filter: &SearchFilter,
    ) -> Result<(Vec<AccessLogWithUser>, i64), ApiError>;
}

pub struct PgLogStore {
    db: PgPool,
}

impl PgLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const LOG_COLUMNS: &str = r#"l.id, l.user_id, l.ip, l.timestamp,
       u.name AS user_name, u.email AS user_email"#;

#[async_trait]
impl LogStore for PgLogStore {
    async fn record(&self, user_id: Uuid, ip: &str) -> Result<(), ApiError> {
        let row = sqlx::query_as::<_, AccessLog>(
            r#"
            INSERT INTO access_logs (user_id, ip)
            VALUES ($1, $2)
            RETURNING id, user_id, ip, timestamp
            "#,
        )
        .bind(user_id)
        .bind(ip)
        .fetch_one(&self.db)
        .await?;
        debug!(log_id = %row.id, user_id = %row.user_id, "access log recorded");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<AccessLogWithUser>, ApiError> {
        let rows = sqlx::query_as::<_, AccessLogWithUser>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM access_logs l
            LEFT JOIN users u ON u.id = l.user_id
            ORDER BY l.timestamp DESC
            "#
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<AccessLogWithUser>, ApiError> {
        let rows = sqlx::query_as::<_, AccessLogWithUser>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM access_logs l
            LEFT JOIN users u ON u.id = l.user_id
            WHERE l.user_id = $1
            ORDER BY l.timestamp DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_all_paginated(
        &self,
        filter: &SearchFilter,
    ) -> Result<(Vec<AccessLogWithUser>, i64), ApiError> {
        match filter.search() {
            Some(term) => {
                let pattern = format!("%{}%", term);
                let user_ids: Vec<Uuid> = sqlx::query_scalar(
                    "SELECT id FROM users WHERE name ILIKE $1 OR email ILIKE $1",
                )
                .bind(&pattern)
                .fetch_all(&self.db)
                .await?;

                if user_ids.is_empty() {
                    return Ok((Vec::new(), 0));
                }

                let rows = sqlx::query_as::<_, AccessLogWithUser>(&format!(
                    r#"
                    SELECT {LOG_COLUMNS}
                    FROM access_logs l
                    LEFT JOIN users u ON u.id = l.user_id
                    WHERE l.user_id = ANY($1)
                    ORDER BY l.timestamp DESC
                    LIMIT $2 OFFSET $3
                    "#
                ))
                .bind(&user_ids)
                .bind(filter.limit())
                .bind(filter.offset())
                .fetch_all(&self.db)
                .await?;
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM access_logs WHERE user_id = ANY($1)",
                )
                .bind(&user_ids)
                .fetch_one(&self.db)
                .await?;
                Ok((rows, total))
            }
            None => {
                let rows = sqlx::query_as::<_, AccessLogWithUser>(&format!(
                    r#"
                    SELECT {LOG_COLUMNS}
                    FROM access_logs l
                    LEFT JOIN users u ON u.id = l.user_id
                    ORDER BY l.timestamp DESC
                    LIMIT $1 OFFSET $2
                    "#
                ))
                .bind(filter.limit())
                .bind(filter.offset())
                .fetch_all(&self.db)
                .await?;
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_logs")
                    .fetch_one(&self.db)
                    .await?;
                Ok((rows, total))
            }
        }
    }
}
