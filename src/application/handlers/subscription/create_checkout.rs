//! Starts a paid subscription by creating a provider checkout session.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{PlanId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{CheckoutRequest, PaymentGateway, PlanRepository, SubscriptionRepository};

/// Command to begin checkout for a plan.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub user_id: UserId,
    pub plan_id: PlanId,
}

/// Result of starting checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCheckoutResult {
    pub subscription_id: SubscriptionId,

    /// Provider-hosted page where the user completes payment.
    pub checkout_url: String,
}

/// Handler for starting checkout.
pub struct CreateCheckoutHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    gateway: Arc<dyn PaymentGateway>,
    success_url: String,
    cancel_url: String,
}

impl CreateCheckoutHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        gateway: Arc<dyn PaymentGateway>,
        success_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            gateway,
            success_url,
            cancel_url,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutCommand,
    ) -> Result<CreateCheckoutResult, SubscriptionError> {
        // 1. The plan must exist.
        let plan = self
            .plans
            .find_by_id(&cmd.plan_id)
            .await?
            .ok_or_else(|| SubscriptionError::plan_not_found(cmd.plan_id.clone()))?;

        // 2. Insert the pending row first. The partial unique index
        //    rejects a second open subscription for the same user.
        let now = Timestamp::now();
        let subscription = Subscription::create_pending(
            SubscriptionId::new(),
            cmd.user_id.clone(),
            cmd.plan_id.clone(),
            now,
        );
        self.subscriptions.insert(&subscription).await?;

        // 3. Ask the provider for a session. A refusal rolls the
        //    pending row back so the user can retry cleanly.
        let request = CheckoutRequest {
            user_id: cmd.user_id.clone(),
            plan_id: cmd.plan_id.clone(),
            plan_name: plan.name.clone(),
            price_cents: plan.price_cents,
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        };
        let session = match self.gateway.create_checkout_session(request).await {
            Ok(session) => session,
            Err(err) => {
                if let Err(delete_err) = self.subscriptions.delete(&subscription.id).await {
                    warn!(
                        subscription_id = %subscription.id,
                        error = %delete_err,
                        "Failed to roll back pending subscription"
                    );
                }
                return Err(err.into());
            }
        };

        // 4. Remember the session so the completion webhook can find us.
        self.subscriptions
            .attach_session_ref(&subscription.id, &session.id)
            .await?;

        info!(
            user_id = %cmd.user_id,
            subscription_id = %subscription.id,
            session_ref = %session.id,
            "Created checkout session"
        );

        Ok(CreateCheckoutResult {
            subscription_id: subscription.id,
            checkout_url: session.url,
        })
    }
}
