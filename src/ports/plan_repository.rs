//! Plan reference-data port.

use crate::domain::foundation::PlanId;
use crate::domain::subscription::{Plan, SubscriptionError};
use async_trait::async_trait;

/// Read-only repository port for subscription plans.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Finds a plan by id. Returns `None` if unknown.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, SubscriptionError>;

    /// Lists all purchasable plans.
    async fn list(&self) -> Result<Vec<Plan>, SubscriptionError>;
}
