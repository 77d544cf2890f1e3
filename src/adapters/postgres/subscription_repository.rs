//! PostgreSQL implementation of the subscription ledger.
//!
//! The one-open-subscription rule is enforced by a partial unique
//! index over (user_id) WHERE status IN ('pending', 'active'); its
//! constraint name is checked on insert. Status transitions are a
//! single conditional UPDATE guarded by the expected prior status,
//! with end_date moved through GREATEST/LEAST so renewals never
//! regress the period and cancellation never extends it.

use crate::domain::foundation::{PlanId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionStatus};
use crate::ports::{EndDateChange, SubscriptionChange, SubscriptionRepository, TransitionOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const ONE_OPEN_PER_USER_INDEX: &str = "subscriptions_one_open_per_user";

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: String,
    plan_id: Uuid,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    checkout_session_ref: Option<String>,
    provider_subscription_ref: Option<String>,
    provider_customer_ref: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = SubscriptionError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: parse_user_id(&row.user_id)?,
            plan_id: PlanId::from_uuid(row.plan_id),
            status: parse_status(&row.status)?,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            checkout_session_ref: row.checkout_session_ref,
            provider_subscription_ref: row.provider_subscription_ref,
            provider_customer_ref: row.provider_customer_ref,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_user_id(s: &str) -> Result<UserId, SubscriptionError> {
    UserId::new(s).map_err(|e| SubscriptionError::infrastructure(format!("Invalid user_id: {}", e)))
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, SubscriptionError> {
    match s {
        "pending" => Ok(SubscriptionStatus::Pending),
        "active" => Ok(SubscriptionStatus::Active),
        "payment_failed" => Ok(SubscriptionStatus::PaymentFailed),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        "expired" => Ok(SubscriptionStatus::Expired),
        _ => Err(SubscriptionError::infrastructure(format!(
            "Invalid subscription status: {}",
            s
        ))),
    }
}

fn db_error(context: &str, e: sqlx::Error) -> SubscriptionError {
    SubscriptionError::infrastructure(format!("{}: {}", context, e))
}

/// Splits an end-date change into the (mode, target) pair the UPDATE's
/// CASE expression expects. `Keep` carries no target.
fn end_date_params(change: EndDateChange) -> (&'static str, Option<DateTime<Utc>>) {
    match change {
        EndDateChange::Keep => ("keep", None),
        EndDateChange::ExtendTo(ts) => ("extend", Some(*ts.as_datetime())),
        EndDateChange::ClampTo(ts) => ("clamp", Some(*ts.as_datetime())),
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), SubscriptionError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, status, start_date, end_date,
                checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_str())
        .bind(subscription.plan_id.as_uuid())
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.as_datetime())
        .bind(subscription.checkout_session_ref.as_deref())
        .bind(subscription.provider_subscription_ref.as_deref())
        .bind(subscription.provider_customer_ref.as_deref())
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(ONE_OPEN_PER_USER_INDEX) =>
            {
                Err(SubscriptionError::already_exists(
                    subscription.user_id.clone(),
                ))
            }
            Err(e) => Err(db_error("Failed to insert subscription", e)),
        }
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), SubscriptionError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::not_found(*id));
        }
        Ok(())
    }

    async fn attach_session_ref(
        &self,
        id: &SubscriptionId,
        session_ref: &str,
    ) -> Result<(), SubscriptionError> {
        let result = sqlx::query(
            "UPDATE subscriptions SET checkout_session_ref = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(session_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to attach session ref", e))?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::not_found(*id));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, status, start_date, end_date,
                   checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                   created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscription by id", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, status, start_date, end_date,
                   checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                   created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1 AND status IN ('pending', 'active')
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find open subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, status, start_date, end_date,
                   checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                   created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find latest subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_session_ref(
        &self,
        session_ref: &str,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, status, start_date, end_date,
                   checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                   created_at, updated_at
            FROM subscriptions
            WHERE checkout_session_ref = $1
            "#,
        )
        .bind(session_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscription by session ref", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_provider_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, status, start_date, end_date,
                   checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                   created_at, updated_at
            FROM subscriptions
            WHERE provider_subscription_ref = $1
            "#,
        )
        .bind(provider_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscription by provider ref", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn transition(
        &self,
        id: &SubscriptionId,
        expected: &[SubscriptionStatus],
        change: SubscriptionChange,
    ) -> Result<TransitionOutcome, SubscriptionError> {
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();
        let (mode, target) = end_date_params(change.end_date);

        // The guard lives in the WHERE clause, so a redelivered or
        // out-of-order event updates zero rows instead of overwriting
        // a later state.
        let result: Result<Option<SubscriptionRow>, sqlx::Error> = sqlx::query_as(
            r#"
            UPDATE subscriptions
            SET status = $2,
                end_date = CASE
                    WHEN $3::text = 'extend' THEN GREATEST(end_date, $4)
                    WHEN $3::text = 'clamp' THEN LEAST(end_date, $4)
                    ELSE end_date
                END,
                provider_subscription_ref = COALESCE($5, provider_subscription_ref),
                provider_customer_ref = COALESCE($6, provider_customer_ref),
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($7)
            RETURNING id, user_id, plan_id, status, start_date, end_date,
                      checkout_session_ref, provider_subscription_ref, provider_customer_ref,
                      created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(change.status.as_str())
        .bind(mode)
        .bind(target)
        .bind(change.provider_subscription_ref.as_deref())
        .bind(change.provider_customer_ref.as_deref())
        .bind(&expected)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(TransitionOutcome::Applied(Subscription::try_from(row)?)),
            Ok(None) => Ok(TransitionOutcome::Stale),
            // Reopening this row would give the user a second open
            // subscription (a renewal for a payment_failed row after the
            // user already started a fresh checkout). The row is stale
            // by then, so the event must be acknowledged, not retried.
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(ONE_OPEN_PER_USER_INDEX) =>
            {
                Ok(TransitionOutcome::Stale)
            }
            Err(e) => Err(db_error("Failed to transition subscription", e)),
        }
    }

    async fn mark_all_expired(&self, now: Timestamp) -> Result<u64, SubscriptionError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'active' AND end_date < $1
            "#,
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to expire lapsed subscriptions", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_round_trips_storage_values() {
        for status in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Active,
            SubscriptionStatus::PaymentFailed,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
        ] {
            assert_eq!(parse_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn parse_status_rejects_invalid_value() {
        assert!(parse_status("paused").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn keep_carries_no_end_date_target() {
        let (mode, target) = end_date_params(EndDateChange::Keep);
        assert_eq!(mode, "keep");
        assert!(target.is_none());
    }

    #[test]
    fn extend_and_clamp_carry_their_targets() {
        let now = Timestamp::now();

        let (mode, target) = end_date_params(EndDateChange::ExtendTo(now));
        assert_eq!(mode, "extend");
        assert_eq!(target, Some(*now.as_datetime()));

        let (mode, target) = end_date_params(EndDateChange::ClampTo(now));
        assert_eq!(mode, "clamp");
        assert_eq!(target, Some(*now.as_datetime()));
    }
}
