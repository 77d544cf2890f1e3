//! PostgreSQL implementation of the plan catalogue.

use crate::domain::foundation::PlanId;
use crate::domain::subscription::{Plan, SubscriptionError};
use crate::ports::PlanRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PlanRepository port.
pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    price_cents: i64,
}

impl TryFrom<PlanRow> for Plan {
    type Error = SubscriptionError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Plan::new(PlanId::from_uuid(row.id), row.name, row.price_cents)
            .map_err(|e| SubscriptionError::infrastructure(format!("Corrupt plan row: {}", e)))
    }
}

fn db_error(context: &str, e: sqlx::Error) -> SubscriptionError {
    SubscriptionError::infrastructure(format!("{}: {}", context, e))
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, SubscriptionError> {
        let row: Option<PlanRow> =
            sqlx::query_as("SELECT id, name, price_cents FROM plans WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find plan", e))?;

        row.map(Plan::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Plan>, SubscriptionError> {
        let rows: Vec<PlanRow> =
            sqlx::query_as("SELECT id, name, price_cents FROM plans ORDER BY price_cents ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Failed to list plans", e))?;

        rows.into_iter().map(Plan::try_from).collect()
    }
}
