//! Applies a classified payment-provider event to the subscription ledger.
//!
//! Events arrive at-least-once and out of order. Every transition is a
//! guarded conditional update, so a redelivered or late event misses
//! its guard and becomes a logged no-op instead of a forced write.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::subscription::{
    PaymentEvent, SubscriptionError, SubscriptionStatus, BILLING_PERIOD_DAYS,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{EndDateChange, SubscriptionChange, SubscriptionRepository, TransitionOutcome};

/// Command carrying one classified provider event.
#[derive(Debug, Clone)]
pub struct ApplyPaymentEventCommand {
    pub event: PaymentEvent,
}

/// What applying the event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event changed a subscription row.
    Applied,

    /// The event was recognized but matched no row or a stale status.
    NoOp,

    /// An event type the ledger does not react to.
    Ignored,
}

/// Handler for provider webhook events.
pub struct ApplyPaymentEventHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl ApplyPaymentEventHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(
        &self,
        cmd: ApplyPaymentEventCommand,
    ) -> Result<EventDisposition, SubscriptionError> {
        let now = Timestamp::now();
        match cmd.event {
            PaymentEvent::CheckoutCompleted {
                session_ref,
                subscription_ref,
                customer_ref,
            } => {
                let Some(sub) = self.subscriptions.find_by_session_ref(&session_ref).await? else {
                    warn!(session_ref, "Checkout completed for unknown session");
                    return Ok(EventDisposition::NoOp);
                };
                // Guarded on Pending, so a redelivered completion event
                // misses the guard instead of extending the period twice.
                let change = SubscriptionChange::status(SubscriptionStatus::Active)
                    .with_end_date(EndDateChange::ExtendTo(now.add_days(BILLING_PERIOD_DAYS)))
                    .with_provider_refs(subscription_ref, customer_ref);
                match self
                    .subscriptions
                    .transition(&sub.id, &[SubscriptionStatus::Pending], change)
                    .await?
                {
                    TransitionOutcome::Applied(updated) => {
                        info!(subscription_id = %updated.id, user_id = %updated.user_id, "Activated subscription");
                        Ok(EventDisposition::Applied)
                    }
                    TransitionOutcome::Stale => {
                        debug!(subscription_id = %sub.id, status = ?sub.status, "Checkout completion already applied");
                        Ok(EventDisposition::NoOp)
                    }
                }
            }

            PaymentEvent::RenewalSucceeded { subscription_ref } => {
                let Some(sub) = self
                    .subscriptions
                    .find_by_provider_ref(&subscription_ref)
                    .await?
                else {
                    warn!(subscription_ref, "Renewal for unknown subscription");
                    return Ok(EventDisposition::NoOp);
                };
                // Also recovers from PaymentFailed once a retry succeeds.
                let change = SubscriptionChange::status(SubscriptionStatus::Active)
                    .with_end_date(EndDateChange::ExtendTo(now.add_days(BILLING_PERIOD_DAYS)));
                match self
                    .subscriptions
                    .transition(
                        &sub.id,
                        &[
                            SubscriptionStatus::Active,
                            SubscriptionStatus::PaymentFailed,
                        ],
                        change,
                    )
                    .await?
                {
                    TransitionOutcome::Applied(updated) => {
                        info!(subscription_id = %updated.id, end_date = ?updated.end_date, "Renewed subscription");
                        Ok(EventDisposition::Applied)
                    }
                    TransitionOutcome::Stale => {
                        debug!(subscription_id = %sub.id, status = ?sub.status, "Renewal arrived for closed subscription");
                        Ok(EventDisposition::NoOp)
                    }
                }
            }

            PaymentEvent::PaymentFailed { subscription_ref } => {
                let Some(sub) = self
                    .subscriptions
                    .find_by_provider_ref(&subscription_ref)
                    .await?
                else {
                    warn!(subscription_ref, "Payment failure for unknown subscription");
                    return Ok(EventDisposition::NoOp);
                };
                let change = SubscriptionChange::status(SubscriptionStatus::PaymentFailed);
                match self
                    .subscriptions
                    .transition(&sub.id, &[SubscriptionStatus::Active], change)
                    .await?
                {
                    TransitionOutcome::Applied(updated) => {
                        info!(subscription_id = %updated.id, "Suspended subscription after failed payment");
                        Ok(EventDisposition::Applied)
                    }
                    TransitionOutcome::Stale => {
                        debug!(subscription_id = %sub.id, status = ?sub.status, "Payment failure arrived out of order");
                        Ok(EventDisposition::NoOp)
                    }
                }
            }

            PaymentEvent::SubscriptionDeleted { subscription_ref } => {
                let Some(sub) = self
                    .subscriptions
                    .find_by_provider_ref(&subscription_ref)
                    .await?
                else {
                    warn!(subscription_ref, "Deletion for unknown subscription");
                    return Ok(EventDisposition::NoOp);
                };
                let change = SubscriptionChange::status(SubscriptionStatus::Cancelled)
                    .with_end_date(EndDateChange::ClampTo(now));
                match self
                    .subscriptions
                    .transition(
                        &sub.id,
                        &[
                            SubscriptionStatus::Active,
                            SubscriptionStatus::PaymentFailed,
                        ],
                        change,
                    )
                    .await?
                {
                    TransitionOutcome::Applied(updated) => {
                        info!(subscription_id = %updated.id, "Cancelled subscription after provider deletion");
                        Ok(EventDisposition::Applied)
                    }
                    TransitionOutcome::Stale => {
                        debug!(subscription_id = %sub.id, status = ?sub.status, "Deletion arrived for closed subscription");
                        Ok(EventDisposition::NoOp)
                    }
                }
            }

            PaymentEvent::Unrecognized { event_type } => {
                debug!(event_type, "Ignoring unhandled payment event");
                Ok(EventDisposition::Ignored)
            }
        }
    }
}
