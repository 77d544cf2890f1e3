//! Reports a user's current subscription, expiring it lazily if lapsed.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionStatus};
use crate::ports::{SubscriptionChange, SubscriptionRepository, TransitionOutcome};

/// Query for the caller's subscription status.
#[derive(Debug, Clone)]
pub struct SubscriptionStatusQuery {
    pub user_id: UserId,
}

/// The user's latest subscription, if any, and whether it grants premium.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionStatusResult {
    pub subscription: Option<Subscription>,
    pub is_premium: bool,
}

/// Handler for subscription status reads.
pub struct SubscriptionStatusHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionStatusHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(
        &self,
        query: SubscriptionStatusQuery,
    ) -> Result<SubscriptionStatusResult, SubscriptionError> {
        let now = Timestamp::now();
        let Some(latest) = self
            .subscriptions
            .find_latest_for_user(&query.user_id)
            .await?
        else {
            return Ok(SubscriptionStatusResult {
                subscription: None,
                is_premium: false,
            });
        };

        // Lazy expiry: a lapsed active row is expired on read, so the
        // answer is correct even between sweep runs.
        let subscription = if latest.is_lapsed(now) {
            let change = SubscriptionChange::status(SubscriptionStatus::Expired);
            match self
                .subscriptions
                .transition(&latest.id, &[SubscriptionStatus::Active], change)
                .await?
            {
                TransitionOutcome::Applied(updated) => {
                    info!(subscription_id = %updated.id, "Expired lapsed subscription on read");
                    updated
                }
                // Another reader or the sweep got there first.
                TransitionOutcome::Stale => self
                    .subscriptions
                    .find_by_id(&latest.id)
                    .await?
                    .unwrap_or(latest),
            }
        } else {
            latest
        };

        let is_premium = subscription.is_premium(now);
        Ok(SubscriptionStatusResult {
            subscription: Some(subscription),
            is_premium,
        })
    }
}
