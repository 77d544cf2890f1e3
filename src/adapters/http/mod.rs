//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.
//! `AuthenticatedUser` and `ErrorResponse` are shared because both
//! modules authenticate and report errors the same way.

pub mod auth;
pub mod error;
pub mod interaction;
pub mod subscription;

pub use auth::AuthenticatedUser;
pub use error::ErrorResponse;
pub use interaction::{interaction_routes, InteractionAppState};
pub use subscription::{subscription_router, SubscriptionAppState};
