//! Subscription lifecycle operations: checkout, webhook-driven
//! transitions, cancellation, status, and expiry sweeping.

pub mod apply_payment_event;
pub mod cancel_subscription;
pub mod create_checkout;
pub mod subscription_status;
pub mod sweep_expired;

pub use apply_payment_event::{
    ApplyPaymentEventCommand, ApplyPaymentEventHandler, EventDisposition,
};
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult};
pub use subscription_status::{
    SubscriptionStatusHandler, SubscriptionStatusQuery, SubscriptionStatusResult,
};
pub use sweep_expired::{SweepExpiredHandler, SweepExpiredResult};
