//! PostgreSQL implementation of the match store.
//!
//! Exactly-once match creation rests on the unique index over the
//! canonical (user_lo, user_hi) pair: the insert is `ON CONFLICT DO
//! NOTHING` and the stored row is read back, so both sides of a
//! concurrent mutual swipe observe the same single match.

use crate::domain::foundation::{DomainError, ErrorCode, MatchId, Timestamp, UserId};
use crate::domain::matching::{CanonicalPair, MatchRecord, MatchState};
use crate::ports::MatchRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the MatchRepository port.
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: Uuid,
    user_lo: String,
    user_hi: String,
    state: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for MatchRecord {
    type Error = DomainError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let lo = parse_user_id(&row.user_lo)?;
        let hi = parse_user_id(&row.user_hi)?;
        let pair = CanonicalPair::new(lo, hi).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Corrupt match pair: {}", e))
        })?;

        Ok(MatchRecord {
            id: MatchId::from_uuid(row.id),
            pair,
            state: parse_state(&row.state)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_user_id(s: &str) -> Result<UserId, DomainError> {
    UserId::new(s).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
    })
}

fn parse_state(s: &str) -> Result<MatchState, DomainError> {
    match s {
        "active" => Ok(MatchState::Active),
        "ended" => Ok(MatchState::Ended),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid match state: {}", s),
        )),
    }
}

fn state_to_string(state: &MatchState) -> &'static str {
    match state {
        MatchState::Active => "active",
        MatchState::Ended => "ended",
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    async fn create_if_absent(
        &self,
        pair: &CanonicalPair,
        created_at: Timestamp,
    ) -> Result<MatchRecord, DomainError> {
        let record = MatchRecord::new(pair.clone(), created_at);

        sqlx::query(
            r#"
            INSERT INTO matches (id, user_lo, user_hi, state, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_lo, user_hi) DO NOTHING
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(pair.lo().as_str())
        .bind(pair.hi().as_str())
        .bind(state_to_string(&record.state))
        .bind(created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert match", e))?;

        // Read back whichever row the index kept.
        let row: MatchRow = sqlx::query_as(
            r#"
            SELECT id, user_lo, user_hi, state, created_at
            FROM matches
            WHERE user_lo = $1 AND user_hi = $2
            "#,
        )
        .bind(pair.lo().as_str())
        .bind(pair.hi().as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read back match", e))?;

        MatchRecord::try_from(row)
    }

    async fn list_active_for_user(&self, user: &UserId) -> Result<Vec<MatchRecord>, DomainError> {
        let rows: Vec<MatchRow> = sqlx::query_as(
            r#"
            SELECT id, user_lo, user_hi, state, created_at
            FROM matches
            WHERE state = 'active' AND (user_lo = $1 OR user_hi = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list matches", e))?;

        rows.into_iter().map(MatchRecord::try_from).collect()
    }

    async fn count_for_user(&self, user: &UserId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM matches WHERE state = 'active' AND (user_lo = $1 OR user_hi = $1)",
        )
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count matches", e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_state_round_trips_storage_values() {
        for state in [MatchState::Active, MatchState::Ended] {
            assert_eq!(parse_state(state_to_string(&state)).unwrap(), state);
        }
    }

    #[test]
    fn parse_state_rejects_invalid_value() {
        assert!(parse_state("paused").is_err());
        assert!(parse_state("").is_err());
    }
}
