//! Subscription domain: entitlement lifecycle driven by payment events.

mod errors;
mod payment_event;
mod plan;
mod status;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

pub use errors::SubscriptionError;
pub use payment_event::{PaymentEvent, ProviderEvent};
pub use plan::Plan;
pub use status::SubscriptionStatus;
pub use subscription::{Subscription, BILLING_PERIOD_DAYS};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{PaymentWebhookVerifier, SignatureHeader};

#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
