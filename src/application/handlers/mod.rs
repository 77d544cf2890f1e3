//! Use-case handlers, one per operation.

pub mod interaction;
pub mod subscription;
