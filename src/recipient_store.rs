use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    DatabaseError(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl Error for StoreError {}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::DatabaseError(Box::new(err))
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::DatabaseError(Box::new(err))
    }
}

/// aggregate usage numbers shown to admins via /stats
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStatistics {
    pub total_users: i64,
    pub new_today: i64,
    pub new_last_7d: i64,
    pub new_last_30d: i64,
    pub total_balance: f64,
    pub total_spent: f64,
    pub first_join: Option<DateTime<Utc>>,
    pub last_join: Option<DateTime<Utc>>,
}

/// persistence collaborator: who the recipients are and what they have done
#[async_trait]
pub trait RecipientStore: Send + Sync {
    /// records or refreshes a user the bot has seen
    async fn upsert_user(
        &self,
        telegram_user_id: i64,
        first_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), StoreError>;

    /// every known recipient identifier
    async fn list_recipients(&self) -> Result<Vec<i64>, StoreError>;

    async fn statistics(&self) -> Result<UsageStatistics, StoreError>;
}

pub struct PgRecipientStore {
    pool: Pool,
}

impl PgRecipientStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientStore for PgRecipientStore {
    async fn upsert_user(
        &self,
        telegram_user_id: i64,
        first_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), StoreError> {
        let client = self.pool.get().await?;

        let inserted = client
            .execute(
                "INSERT INTO users (telegram_user_id, first_name, username)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (telegram_user_id)
                 DO UPDATE SET first_name = EXCLUDED.first_name,
                               username = EXCLUDED.username,
                               updated_at = NOW()",
                &[&telegram_user_id, &first_name, &username],
            )
            .await?;

        if inserted > 0 {
            info!("Upserted user {}", telegram_user_id);
        }
        Ok(())
    }

    async fn list_recipients(&self) -> Result<Vec<i64>, StoreError> {
        let client = self.pool.get().await?;

        let rows = client
            .query("SELECT telegram_user_id FROM users ORDER BY id", &[])
            .await?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn statistics(&self) -> Result<UsageStatistics, StoreError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE created_at >= date_trunc('day', NOW())),
                        COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days'),
                        COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '30 days'),
                        COALESCE(SUM(balance), 0),
                        COALESCE(SUM(total_spent), 0),
                        MIN(created_at),
                        MAX(created_at)
                 FROM users",
                &[],
            )
            .await?;

        Ok(UsageStatistics {
            total_users: row.get(0),
            new_today: row.get(1),
            new_last_7d: row.get(2),
            new_last_30d: row.get(3),
            total_balance: row.get(4),
            total_spent: row.get(5),
            first_join: row.get(6),
            last_join: row.get(7),
        })
    }
}
