//! Payment-provider webhook events and their classification.
//!
//! The raw envelope is provider-shaped JSON; `classify` reduces it to
//! the handful of lifecycle events the subscription ledger reacts to.
//! Everything else is `Unrecognized` and acknowledged without effect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw webhook event envelope as received from the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g. "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    #[serde(default)]
    pub created: i64,

    /// Event payload containing the affected object.
    pub data: ProviderEventData,

    /// Whether the event originated from live mode.
    #[serde(default)]
    pub livemode: bool,
}

/// Payload wrapper around the affected object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEventData {
    pub object: Value,
}

impl ProviderEvent {
    /// Returns true if this event came from live mode.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Classifies the raw event into a subscription lifecycle event.
    pub fn classify(&self) -> PaymentEvent {
        let object = &self.data.object;
        match self.event_type.as_str() {
            "checkout.session.completed" => match object_str(object, "id") {
                Some(session_ref) => PaymentEvent::CheckoutCompleted {
                    session_ref,
                    subscription_ref: object_str(object, "subscription"),
                    customer_ref: object_str(object, "customer"),
                },
                None => PaymentEvent::Unrecognized {
                    event_type: self.event_type.clone(),
                },
            },
            "invoice.payment_succeeded" => match object_str(object, "subscription") {
                Some(subscription_ref) => PaymentEvent::RenewalSucceeded { subscription_ref },
                None => PaymentEvent::Unrecognized {
                    event_type: self.event_type.clone(),
                },
            },
            "invoice.payment_failed" => match object_str(object, "subscription") {
                Some(subscription_ref) => PaymentEvent::PaymentFailed { subscription_ref },
                None => PaymentEvent::Unrecognized {
                    event_type: self.event_type.clone(),
                },
            },
            "customer.subscription.deleted" => match object_str(object, "id") {
                Some(subscription_ref) => PaymentEvent::SubscriptionDeleted { subscription_ref },
                None => PaymentEvent::Unrecognized {
                    event_type: self.event_type.clone(),
                },
            },
            _ => PaymentEvent::Unrecognized {
                event_type: self.event_type.clone(),
            },
        }
    }
}

fn object_str(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Subscription lifecycle events the ledger reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// First payment completed; the pending subscription becomes active.
    CheckoutCompleted {
        session_ref: String,
        subscription_ref: Option<String>,
        customer_ref: Option<String>,
    },

    /// A recurring charge succeeded; extend the billing period.
    RenewalSucceeded { subscription_ref: String },

    /// A recurring charge failed; suspend access.
    PaymentFailed { subscription_ref: String },

    /// The provider deleted the subscription; treat as cancellation.
    SubscriptionDeleted { subscription_ref: String },

    /// Event type the ledger does not react to.
    Unrecognized { event_type: String },
}
