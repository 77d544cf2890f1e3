//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    #[serde(default)]
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    #[serde(default)]
    pub stripe_webhook_secret: String,

    /// Absolute URL the provider redirects to after successful checkout
    pub checkout_success_url: String,

    /// Absolute URL the provider redirects to after abandoned checkout
    pub checkout_cancel_url: String,

    /// Use the in-process mock gateway instead of Stripe (development)
    #[serde(default)]
    pub mock: bool,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    ///
    /// The webhook secret is required even in mock mode, since webhook
    /// signature verification is always on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !self.mock {
            if self.stripe_api_key.is_empty() {
                return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
            }
            if !self.stripe_api_key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }

        for url in [&self.checkout_success_url, &self.checkout_cancel_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidCheckoutUrl);
            }
        }

        Ok(())
    }
}
