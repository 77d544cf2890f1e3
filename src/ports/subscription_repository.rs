//! Subscription ledger port.
//!
//! All status changes go through `transition`, a conditional update
//! guarded by the expected prior status. Payment events arrive
//! at-least-once and out of order, so a guard miss is an outcome
//! (`Stale`), never a forced write.

use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionStatus};
use async_trait::async_trait;

/// Result of a guarded status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The stored status matched a guard and the change was applied.
    Applied(Subscription),

    /// The stored status matched none of the guards; nothing changed.
    Stale,
}

/// How a transition affects end_date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDateChange {
    /// Leave end_date untouched.
    Keep,

    /// Move end_date forward to `max(current, target)`. Renewals never
    /// regress the entitlement period.
    ExtendTo(Timestamp),

    /// Move end_date back to `min(current, target)`. Cancellation clamps
    /// the period to the moment of cancellation.
    ClampTo(Timestamp),
}

/// A guarded change to apply to a subscription row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionChange {
    pub status: SubscriptionStatus,
    pub end_date: EndDateChange,
    /// Set only when present; never clears a stored ref.
    pub provider_subscription_ref: Option<String>,
    pub provider_customer_ref: Option<String>,
}

impl SubscriptionChange {
    /// A status-only change.
    pub fn status(status: SubscriptionStatus) -> Self {
        Self {
            status,
            end_date: EndDateChange::Keep,
            provider_subscription_ref: None,
            provider_customer_ref: None,
        }
    }

    pub fn with_end_date(mut self, change: EndDateChange) -> Self {
        self.end_date = change;
        self
    }

    pub fn with_provider_refs(
        mut self,
        subscription_ref: Option<String>,
        customer_ref: Option<String>,
    ) -> Self {
        self.provider_subscription_ref = subscription_ref;
        self.provider_customer_ref = customer_ref;
        self
    }
}

/// Repository port for subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Inserts a new subscription.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the user already has an open subscription
    /// - `Infrastructure` on persistence failure
    async fn insert(&self, subscription: &Subscription) -> Result<(), SubscriptionError>;

    /// Deletes a subscription row. Used to roll back a pending record
    /// whose checkout-session creation failed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no row exists
    async fn delete(&self, id: &SubscriptionId) -> Result<(), SubscriptionError>;

    /// Stores the checkout-session reference on a freshly inserted row.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no row exists
    async fn attach_session_ref(
        &self,
        id: &SubscriptionId,
        session_ref: &str,
    ) -> Result<(), SubscriptionError>;

    /// Finds a subscription by id.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionError>;

    /// Finds the user's open (pending or active) subscription, if any.
    async fn find_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, SubscriptionError>;

    /// Finds the user's most recently created subscription of any status.
    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, SubscriptionError>;

    /// Finds a subscription by its checkout-session reference.
    async fn find_by_session_ref(
        &self,
        session_ref: &str,
    ) -> Result<Option<Subscription>, SubscriptionError>;

    /// Finds a subscription by its provider subscription reference.
    async fn find_by_provider_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<Subscription>, SubscriptionError>;

    /// Applies `change` to the row iff its stored status is one of
    /// `expected`. Returns `Stale` when the guard misses, and also when
    /// reopening the row would give the user a second open subscription.
    async fn transition(
        &self,
        id: &SubscriptionId,
        expected: &[SubscriptionStatus],
        change: SubscriptionChange,
    ) -> Result<TransitionOutcome, SubscriptionError>;

    /// Expires every active subscription whose end_date is before `now`.
    /// Returns the number of rows transitioned.
    async fn mark_all_expired(&self, now: Timestamp) -> Result<u64, SubscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }

    #[test]
    fn change_builder_composes() {
        let now = Timestamp::now();
        let change = SubscriptionChange::status(SubscriptionStatus::Active)
            .with_end_date(EndDateChange::ExtendTo(now))
            .with_provider_refs(Some("sub_1".to_string()), None);

        assert_eq!(change.status, SubscriptionStatus::Active);
        assert_eq!(change.end_date, EndDateChange::ExtendTo(now));
        assert_eq!(change.provider_subscription_ref, Some("sub_1".to_string()));
        assert!(change.provider_customer_ref.is_none());
    }
}
