//! Subscription status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a subscription.
///
/// Every transition is driven either by a user action (checkout, cancel)
/// or by an asynchronous payment-provider event. Events may arrive more
/// than once and out of order, so all persisted transitions are guarded
/// by the expected prior status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Checkout session created, awaiting first payment.
    /// Grants no premium access.
    Pending,

    /// Paid and current. Grants premium access while end_date is in the future.
    Active,

    /// A renewal charge failed. Access suspended until payment recovers.
    PaymentFailed,

    /// Ended by the user or by provider-side deletion. Terminal.
    Cancelled,

    /// Billing period lapsed without renewal. Terminal.
    Expired,
}

impl SubscriptionStatus {
    /// Returns true if this status can ever grant premium access.
    ///
    /// The aggregate additionally requires end_date to be in the future.
    pub fn grants_premium(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Returns true if this row blocks creation of another subscription
    /// for the same user.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Pending | SubscriptionStatus::Active
        )
    }

    /// Returns the stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PaymentFailed => "payment_failed",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Active)
            // From ACTIVE
                | (Active, Active) // Renewal
                | (Active, PaymentFailed)
                | (Active, Cancelled)
                | (Active, Expired)
            // From PAYMENT_FAILED
                | (PaymentFailed, Active)
                | (PaymentFailed, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active],
            Active => vec![Active, PaymentFailed, Cancelled, Expired],
            PaymentFailed => vec![Active, Cancelled],
            Cancelled => vec![],
            Expired => vec![],
        }
    }
}
