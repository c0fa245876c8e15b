//! Test utilities for the tessera crates.
//!
//! Provides fixture builders plus call-counting and fault-injecting
//! wrappers around any `DocumentClient`. Import in `#[cfg(test)]` blocks
//! and integration tests only — never in production code.

pub mod counting;
pub mod faults;
pub mod fixture;

pub use counting::CountingClient;
pub use faults::{Fault, FaultClient};
