//! Domain layer: aggregates, value objects, and business rules.

pub mod foundation;
pub mod matching;
pub mod subscription;
