//! ScoutLink - Matching and subscription backend for a sports network
//!
//! This crate implements profile discovery, mutual-interest matching and
//! subscription entitlements behind an HTTP API, following a hexagonal
//! architecture: pure domain logic, ports as trait seams, and adapters
//! for PostgreSQL, the payment provider and axum.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
