//! HTTP adapter for subscription endpoints, including the payment
//! webhook.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::SubscriptionAppState;
pub use routes::{subscription_router, subscription_routes, webhook_routes};
