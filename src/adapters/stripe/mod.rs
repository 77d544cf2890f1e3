//! Stripe payment provider adapter.

pub mod gateway;
pub mod mock_gateway;

pub use gateway::{StripeConfig, StripePaymentGateway};
pub use mock_gateway::MockPaymentGateway;
