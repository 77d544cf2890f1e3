//! Deterministic in-process payment gateway for local development.
//!
//! Selected via `payment.mock = true` in configuration. Every checkout
//! yields a session whose reference is derived from the subscription
//! owner, so a development webhook can be replayed against it.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::ports::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway};

/// How long a mock checkout session stays valid.
const SESSION_TTL_SECS: i64 = 30 * 60;

/// In-process PaymentGateway for development and demos.
#[derive(Default)]
pub struct MockPaymentGateway {
    counter: AtomicU64,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let id = format!("cs_mock_{}_{}", request.user_id, seq);
        let expires_at = chrono::Utc::now().timestamp() + SESSION_TTL_SECS;

        tracing::info!(session_ref = %id, user_id = %request.user_id, "Mock checkout session created");

        Ok(CheckoutSession {
            url: format!("https://checkout.mock.local/{}", id),
            id,
            expires_at,
        })
    }

    async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError> {
        tracing::info!(subscription_ref, "Mock subscription cancelled");
        Ok(())
    }
}
