//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, create_checkout, handle_payment_webhook, subscription_status,
    sweep_expired, SubscriptionAppState,
};

/// Create the subscription API router.
///
/// # Routes (require authentication)
///
/// - `POST /checkout` - Start the checkout flow
/// - `POST /cancel` - Cancel the caller's subscription
/// - `GET /status` - The caller's latest subscription
///
/// ## Maintenance
/// - `POST /sweep-expired` - Expire every lapsed subscription
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/cancel", post(cancel_subscription))
        .route("/status", get(subscription_status))
        .route("/sweep-expired", post(sweep_expired))
}

/// Create the payment webhook router.
///
/// Separate from the subscription routes because webhooks carry no
/// user authentication; they are verified via signature instead.
pub fn webhook_routes() -> Router<SubscriptionAppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}

/// Create the complete subscription module router, suitable for
/// mounting under `/api`.
pub fn subscription_router() -> Router<SubscriptionAppState> {
    Router::new()
        .nest("/subscriptions", subscription_routes())
        .nest("/webhooks", webhook_routes())
}
