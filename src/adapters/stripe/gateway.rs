//! Stripe implementation of the payment gateway port.
//!
//! Uses Stripe's form-encoded Checkout Session and Subscription APIs.
//! The API key is held in `secrecy::SecretString` and only exposed at
//! the point of the request. Webhook signature verification lives in
//! the domain and is applied at the HTTP boundary, not here.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe implementation of the PaymentGateway port.
pub struct StripePaymentGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    /// Absent once the session has been completed or expired.
    url: Option<String>,
    expires_at: i64,
}

/// Builds the form parameters for a Checkout Session create call.
///
/// Prices are inlined as `price_data` so plans do not have to be
/// pre-registered as Stripe Price objects.
fn checkout_params(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("client_reference_id", request.user_id.to_string()),
        ("metadata[user_id]", request.user_id.to_string()),
        ("metadata[plan_id]", request.plan_id.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "line_items[0][price_data][currency]",
            "usd".to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.price_cents.to_string(),
        ),
        (
            "line_items[0][price_data][recurring][interval]",
            "month".to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.plan_name.clone(),
        ),
    ]
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::authentication("Stripe rejected the API key"));
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Stripe checkout session create failed");
            return Err(GatewayError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let checkout_url = session
            .url
            .ok_or_else(|| GatewayError::provider("Checkout session has no URL"))?;

        Ok(CheckoutSession {
            id: session.id,
            url: checkout_url,
            expires_at: session.expires_at,
        })
    }

    async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError> {
        let url = format!(
            "{}/v1/subscriptions/{}",
            self.config.api_base_url, subscription_ref
        );

        let response = self
            .http_client
            .delete(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        // Already gone on the provider side counts as cancelled, so a
        // retried cancellation stays idempotent.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Stripe subscription cancel failed");
            return Err(GatewayError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        Ok(())
    }
}
