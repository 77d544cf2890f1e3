//! Cancels a user's active subscription.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionStatus};
use crate::ports::{
    EndDateChange, PaymentGateway, SubscriptionChange, SubscriptionRepository, TransitionOutcome,
};

/// Command to cancel the caller's subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for user-initiated cancellation.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            subscriptions,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, SubscriptionError> {
        // 1. Only an open subscription can be cancelled by its owner.
        let subscription = self
            .subscriptions
            .find_open_for_user(&cmd.user_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found_for_user(cmd.user_id.clone()))?;
        if subscription.status != SubscriptionStatus::Active {
            return Err(SubscriptionError::invalid_state(
                subscription.status.as_str(),
                "cancel",
            ));
        }

        // 2. Stop future charges at the provider before touching our row.
        if let Some(provider_ref) = subscription.provider_subscription_ref.as_deref() {
            self.gateway.cancel_subscription(provider_ref).await?;
        }

        // 3. Guarded transition. A webhook may have closed the row in
        //    the meantime, which surfaces as a stale-transition conflict.
        let now = Timestamp::now();
        let change = SubscriptionChange::status(SubscriptionStatus::Cancelled)
            .with_end_date(EndDateChange::ClampTo(now));
        match self
            .subscriptions
            .transition(&subscription.id, &[SubscriptionStatus::Active], change)
            .await?
        {
            TransitionOutcome::Applied(updated) => {
                info!(
                    subscription_id = %updated.id,
                    user_id = %updated.user_id,
                    "Cancelled subscription"
                );
                Ok(CancelSubscriptionResult {
                    subscription: updated,
                })
            }
            TransitionOutcome::Stale => Err(SubscriptionError::stale_transition("cancel")),
        }
    }
}
