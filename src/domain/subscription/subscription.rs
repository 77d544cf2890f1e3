//! Subscription aggregate entity.
//!
//! Each user has at most one open (pending or active) subscription,
//! enforced by a partial unique index at the database level. Status
//! transitions follow the state machine rules and two end-date
//! invariants: renewals never move end_date backwards, and
//! cancellation clamps it to the moment of cancellation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, StateMachine, SubscriptionId, Timestamp, UserId,
};

use super::SubscriptionStatus;

/// Length of one billing period in days.
pub const BILLING_PERIOD_DAYS: i64 = 30;

/// Subscription aggregate - one user's entitlement record.
///
/// # Invariants
///
/// - `id` is globally unique
/// - at most one row per user with an open status
/// - status transitions follow state machine rules
/// - `start_date <= end_date` at creation; cancellation may clamp
///   `end_date` down to now, renewals only extend it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this subscription.
    pub id: SubscriptionId,

    /// User who owns this subscription.
    pub user_id: UserId,

    /// Plan being paid for.
    pub plan_id: PlanId,

    /// Current status in the lifecycle.
    pub status: SubscriptionStatus,

    /// Start of the entitlement period.
    pub start_date: Timestamp,

    /// End of the entitlement period.
    pub end_date: Timestamp,

    /// Provider checkout-session reference, set at creation.
    pub checkout_session_ref: Option<String>,

    /// Provider subscription reference, set on activation.
    pub provider_subscription_ref: Option<String>,

    /// Provider customer reference, set on activation.
    pub provider_customer_ref: Option<String>,

    /// When the record was created.
    pub created_at: Timestamp,

    /// When the record was last updated.
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates a pending subscription awaiting checkout completion.
    ///
    /// The row is inserted before the provider session exists; the
    /// session ref is attached once the provider accepts the request,
    /// and the row is deleted if it does not.
    pub fn create_pending(
        id: SubscriptionId,
        user_id: UserId,
        plan_id: PlanId,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            plan_id,
            status: SubscriptionStatus::Pending,
            start_date: now,
            end_date: now.add_days(BILLING_PERIOD_DAYS),
            checkout_session_ref: None,
            provider_subscription_ref: None,
            provider_customer_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this subscription currently grants premium access.
    pub fn is_premium(&self, now: Timestamp) -> bool {
        self.status.grants_premium() && self.end_date >= now
    }

    /// Returns true if this row blocks creation of another subscription.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Returns true if an active subscription has outlived its end date.
    pub fn is_lapsed(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date < now
    }

    /// Activates a pending subscription after successful checkout.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn activate(
        &mut self,
        provider_subscription_ref: Option<String>,
        provider_customer_ref: Option<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active)?;
        self.end_date = self.end_date.max(now.add_days(BILLING_PERIOD_DAYS));
        if let Some(sub_ref) = provider_subscription_ref {
            self.provider_subscription_ref = Some(sub_ref);
        }
        if let Some(cust_ref) = provider_customer_ref {
            self.provider_customer_ref = Some(cust_ref);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Renews for a new billing period. end_date never moves backwards.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn renew(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active)?;
        self.end_date = self.end_date.max(now.add_days(BILLING_PERIOD_DAYS));
        self.updated_at = now;
        Ok(())
    }

    /// Marks a renewal charge as failed.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_payment_failed(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::PaymentFailed)?;
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the subscription, clamping end_date to now.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        if self.end_date > now {
            self.end_date = now;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Expires a lapsed subscription.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.updated_at = now;
        Ok(())
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn pending_subscription(now: Timestamp) -> Subscription {
        let mut sub = Subscription::create_pending(
            SubscriptionId::new(),
            test_user_id(),
            PlanId::new(),
            now,
        );
        sub.checkout_session_ref = Some("cs_test_abc".to_string());
        sub
    }

    fn active_subscription(now: Timestamp) -> Subscription {
        let mut sub = pending_subscription(now);
        sub.activate(
            Some("sub_123".to_string()),
            Some("cus_456".to_string()),
            now,
        )
        .unwrap();
        sub
    }

    // Construction tests

    #[test]
    fn create_pending_sets_thirty_day_period() {
        let now = Timestamp::now();
        let sub = pending_subscription(now);

        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert_eq!(sub.start_date, now);
        assert_eq!(sub.end_date, now.add_days(30));
        assert_eq!(sub.checkout_session_ref, Some("cs_test_abc".to_string()));
        assert!(sub.provider_subscription_ref.is_none());
    }

    #[test]
    fn pending_is_open_but_not_premium() {
        let now = Timestamp::now();
        let sub = pending_subscription(now);
        assert!(sub.is_open());
        assert!(!sub.is_premium(now));
    }

    // Activation tests

    #[test]
    fn activate_persists_provider_refs() {
        let now = Timestamp::now();
        let sub = active_subscription(now);

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.provider_subscription_ref, Some("sub_123".to_string()));
        assert_eq!(sub.provider_customer_ref, Some("cus_456".to_string()));
        assert!(sub.is_premium(now));
    }

    #[test]
    fn activate_from_active_behaves_like_renewal() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        // Duplicate checkout event delivery; Active -> Active is allowed
        // and must not lose the provider refs already stored.
        assert!(sub.activate(None, None, now).is_ok());
        assert_eq!(sub.provider_subscription_ref, Some("sub_123".to_string()));
    }

    // Renewal tests

    #[test]
    fn renew_extends_end_date() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        let old_end = sub.end_date;

        let later = now.add_days(25);
        sub.renew(later).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.end_date, later.add_days(30));
        assert!(sub.end_date > old_end);
    }

    #[test]
    fn renew_never_regresses_end_date() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        sub.end_date = now.add_days(90);

        // A late-arriving renewal that would compute an earlier end date.
        sub.renew(now).unwrap();

        assert_eq!(sub.end_date, now.add_days(90));
    }

    #[test]
    fn renew_recovers_from_payment_failed() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        sub.mark_payment_failed(now).unwrap();
        assert!(!sub.is_premium(now));

        sub.renew(now).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_premium(now));
    }

    #[test]
    fn renew_from_pending_fails() {
        let now = Timestamp::now();
        let mut sub = pending_subscription(now);
        assert!(sub.renew(now).is_err());
    }

    // Cancellation tests

    #[test]
    fn cancel_clamps_end_date_to_now() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        assert!(sub.end_date > now);

        let cancel_time = now.add_days(5);
        sub.cancel(cancel_time).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(sub.end_date, cancel_time);
        assert!(!sub.is_premium(cancel_time));
    }

    #[test]
    fn cancel_does_not_extend_already_past_end_date() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        sub.end_date = now.minus_days(2);

        sub.cancel(now).unwrap();
        assert_eq!(sub.end_date, now.minus_days(2));
    }

    #[test]
    fn cancel_from_pending_fails() {
        let now = Timestamp::now();
        let mut sub = pending_subscription(now);
        assert!(sub.cancel(now).is_err());
    }

    #[test]
    fn cancelled_is_terminal() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        sub.cancel(now).unwrap();

        assert!(sub.renew(now).is_err());
        assert!(sub.expire(now).is_err());
    }

    // Expiry tests

    #[test]
    fn lapsed_active_subscription_is_detected() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        sub.end_date = now.minus_days(1);

        assert!(sub.is_lapsed(now));
        assert!(!sub.is_premium(now));
    }

    #[test]
    fn expire_marks_terminal() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        sub.end_date = now.minus_days(1);
        sub.expire(now).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert!(!sub.is_open());
        assert!(sub.renew(now).is_err());
    }

    #[test]
    fn premium_requires_end_date_in_future() {
        let now = Timestamp::now();
        let mut sub = active_subscription(now);
        assert!(sub.is_premium(now));

        sub.end_date = now.minus_days(1);
        assert!(!sub.is_premium(now));
    }
}
