//! Premium entitlement checks and the sliding-window swipe allowance.
//!
//! Premium status is recomputed from the subscription ledger on every
//! call rather than cached, so a subscription that lapsed a moment ago
//! is already rate limited on the next swipe.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::matching::MatchingError;
use crate::ports::{InteractionRepository, SubscriptionRepository};

/// Swipes a free user may make inside the sliding window.
pub const DAILY_INTERACTION_LIMIT: u32 = 10;

/// Width of the sliding allowance window.
pub const ALLOWANCE_WINDOW_HOURS: i64 = 24;

/// Outcome of an allowance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowance {
    /// Whether the next swipe may proceed.
    pub allowed: bool,

    /// Swipes left in the window. `None` means unlimited.
    pub remaining: Option<u32>,

    /// Whether the user holds an active premium subscription.
    pub is_premium: bool,
}

/// Gate deciding what a user's subscription entitles them to.
pub struct EntitlementGate {
    interactions: Arc<dyn InteractionRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl EntitlementGate {
    pub fn new(
        interactions: Arc<dyn InteractionRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            interactions,
            subscriptions,
        }
    }

    /// Returns true if the user currently holds premium access.
    pub async fn is_premium(&self, user: &UserId) -> Result<bool, MatchingError> {
        self.is_premium_at(user, Timestamp::now()).await
    }

    /// Fails with `PremiumRequired` naming `feature` unless the user is premium.
    pub async fn require_premium(&self, user: &UserId, feature: &str) -> Result<(), MatchingError> {
        if self.is_premium(user).await? {
            Ok(())
        } else {
            Err(MatchingError::premium_required(feature))
        }
    }

    /// Checks the swipe allowance for the sliding window ending now.
    pub async fn check_allowance(&self, user: &UserId) -> Result<Allowance, MatchingError> {
        let now = Timestamp::now();
        if self.is_premium_at(user, now).await? {
            return Ok(Allowance {
                allowed: true,
                remaining: None,
                is_premium: true,
            });
        }
        let since = now.minus_hours(ALLOWANCE_WINDOW_HOURS);
        let used = self.interactions.count_since_by_swiper(user, since).await?;
        let remaining = remaining_in_window(used);
        Ok(Allowance {
            allowed: remaining > 0,
            remaining: Some(remaining),
            is_premium: false,
        })
    }

    async fn is_premium_at(&self, user: &UserId, now: Timestamp) -> Result<bool, MatchingError> {
        let open = self
            .subscriptions
            .find_open_for_user(user)
            .await
            .map_err(|err| MatchingError::infrastructure(err.to_string()))?;
        Ok(open.map(|s| s.is_premium(now)).unwrap_or(false))
    }
}

fn remaining_in_window(used: u64) -> u32 {
    DAILY_INTERACTION_LIMIT.saturating_sub(u32::try_from(used).unwrap_or(u32::MAX))
}
