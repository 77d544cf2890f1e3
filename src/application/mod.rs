//! Application layer: use-case handlers orchestrating domain logic
//! through the repository and gateway ports.

pub mod entitlement_gate;
pub mod handlers;

#[cfg(test)]
pub(crate) mod testing;

pub use entitlement_gate::{Allowance, EntitlementGate, DAILY_INTERACTION_LIMIT};
