//! Eagerly expires every lapsed subscription.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::SubscriptionError;
use crate::ports::SubscriptionRepository;

/// How many rows a sweep transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepExpiredResult {
    pub expired: u64,
}

/// Handler for the periodic expiry sweep.
///
/// Lazy expiry on status reads keeps individual answers correct; the
/// sweep keeps the ledger itself tidy for aggregate queries.
pub struct SweepExpiredHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SweepExpiredHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(&self) -> Result<SweepExpiredResult, SubscriptionError> {
        let expired = self.subscriptions.mark_all_expired(Timestamp::now()).await?;
        if expired > 0 {
            info!(expired, "Expired lapsed subscriptions");
        }
        Ok(SweepExpiredResult { expired })
    }
}
