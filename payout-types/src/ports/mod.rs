//! Port traits (interfaces for adapters).
//!
//! These are the contracts that bank adapters must implement.
//! The dispatcher depends on these traits, not concrete implementations.

mod provider;

pub use provider::BankProvider;
