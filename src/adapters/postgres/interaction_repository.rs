//! PostgreSQL implementation of the interaction ledger.
//!
//! Duplicate detection relies on the unique index over the ordered
//! (swiper, swiped) pair; `ON CONFLICT DO NOTHING` turns a second
//! swipe into a zero-row insert rather than an error.

use crate::domain::foundation::{DomainError, ErrorCode, InteractionId, Timestamp, UserId};
use crate::domain::matching::{InteractionRecord, InteractionStats, SwipeAction};
use crate::ports::{InsertOutcome, InteractionRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the InteractionRepository port.
pub struct PostgresInteractionRepository {
    pool: PgPool,
}

impl PostgresInteractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InteractionRow {
    id: Uuid,
    swiper_user_id: String,
    swiped_user_id: String,
    action: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for InteractionRecord {
    type Error = DomainError;

    fn try_from(row: InteractionRow) -> Result<Self, Self::Error> {
        Ok(InteractionRecord {
            id: InteractionId::from_uuid(row.id),
            swiper_user_id: parse_user_id(&row.swiper_user_id)?,
            swiped_user_id: parse_user_id(&row.swiped_user_id)?,
            action: parse_action(&row.action)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    sent_interest: i64,
    sent_pass: i64,
    received_interest: i64,
    received_pass: i64,
}

fn parse_user_id(s: &str) -> Result<UserId, DomainError> {
    UserId::new(s).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
    })
}

fn parse_action(s: &str) -> Result<SwipeAction, DomainError> {
    s.parse::<SwipeAction>()
        .map_err(|_| DomainError::new(ErrorCode::DatabaseError, format!("Invalid action value: {}", s)))
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[async_trait]
impl InteractionRepository for PostgresInteractionRepository {
    async fn insert(&self, record: &InteractionRecord) -> Result<InsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO interactions (id, swiper_user_id, swiped_user_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (swiper_user_id, swiped_user_id) DO NOTHING
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.swiper_user_id.as_str())
        .bind(record.swiped_user_id.as_str())
        .bind(record.action.as_str())
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert interaction", e))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn reverse_interest_exists(
        &self,
        swiper: &UserId,
        swiped: &UserId,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM interactions
                WHERE swiper_user_id = $1 AND swiped_user_id = $2 AND action = 'interest'
            )
            "#,
        )
        .bind(swiped.as_str())
        .bind(swiper.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check reverse interest", e))?;

        Ok(exists)
    }

    async fn count_since_by_swiper(
        &self,
        swiper: &UserId,
        since: Timestamp,
    ) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM interactions WHERE swiper_user_id = $1 AND created_at >= $2",
        )
        .bind(swiper.as_str())
        .bind(since.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count interactions", e))?;

        Ok(count_to_u64(count))
    }

    async fn swiped_ids(&self, swiper: &UserId) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT swiped_user_id FROM interactions WHERE swiper_user_id = $1",
        )
        .bind(swiper.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list swiped users", e))?;

        ids.iter().map(|s| parse_user_id(s)).collect()
    }

    async fn stats_for_user(&self, user: &UserId) -> Result<InteractionStats, DomainError> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE swiper_user_id = $1 AND action = 'interest') AS sent_interest,
                COUNT(*) FILTER (WHERE swiper_user_id = $1 AND action = 'pass') AS sent_pass,
                COUNT(*) FILTER (WHERE swiped_user_id = $1 AND action = 'interest') AS received_interest,
                COUNT(*) FILTER (WHERE swiped_user_id = $1 AND action = 'pass') AS received_pass
            FROM interactions
            WHERE swiper_user_id = $1 OR swiped_user_id = $1
            "#,
        )
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to aggregate interaction stats", e))?;

        Ok(InteractionStats {
            sent_interest: count_to_u64(row.sent_interest),
            sent_pass: count_to_u64(row.sent_pass),
            received_interest: count_to_u64(row.received_interest),
            received_pass: count_to_u64(row.received_pass),
        })
    }
}
