//! Request/response DTOs for the subscription endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::subscription::SweepExpiredResult;
use crate::domain::subscription::Subscription;

/// POST /api/subscriptions/checkout request body.
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub plan_id: String,
}

/// POST /api/subscriptions/checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub subscription_id: String,
    pub checkout_url: String,
}

/// Subscription view shared by the status and cancel responses.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub id: String,
    pub plan_id: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<Subscription> for SubscriptionView {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id.to_string(),
            plan_id: subscription.plan_id.to_string(),
            status: subscription.status.as_str().to_string(),
            start_date: subscription.start_date.as_datetime().to_rfc3339(),
            end_date: subscription.end_date.as_datetime().to_rfc3339(),
        }
    }
}

/// GET /api/subscriptions/status response body.
#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub subscription: Option<SubscriptionView>,
    pub is_premium: bool,
}

/// POST /api/subscriptions/cancel response body.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub subscription: SubscriptionView,
}

/// POST /api/subscriptions/sweep-expired response body.
#[derive(Debug, Serialize)]
pub struct SweepExpiredResponse {
    pub expired: u64,
}

impl From<SweepExpiredResult> for SweepExpiredResponse {
    fn from(result: SweepExpiredResult) -> Self {
        Self {
            expired: result.expired,
        }
    }
}
