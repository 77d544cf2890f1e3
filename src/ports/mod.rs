//! Ports: async contracts between the application core and adapters.

mod interaction_repository;
mod match_repository;
mod payment_gateway;
mod plan_repository;
mod profile_directory;
mod subscription_repository;

pub use interaction_repository::{InsertOutcome, InteractionRepository};
pub use match_repository::MatchRepository;
pub use payment_gateway::{
    CheckoutRequest, CheckoutSession, GatewayError, GatewayErrorCode, PaymentGateway,
};
pub use plan_repository::PlanRepository;
pub use profile_directory::ProfileDirectory;
pub use subscription_repository::{
    EndDateChange, SubscriptionChange, SubscriptionRepository, TransitionOutcome,
};
