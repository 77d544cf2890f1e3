//! HTTP adapter for matching-engine endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::InteractionAppState;
pub use routes::interaction_routes;
