//! # Payout Gateway
//!
//! Single entry point for bank payouts.
//!
//! ## Architecture
//!
//! - `dispatcher/` - Registry of bank providers and the routed operations
//!
//! Providers are injected as `Arc<dyn BankProvider>`, so banks are added
//! without touching the dispatcher and tests can register spies.

pub mod dispatcher;

#[cfg(test)]
mod dispatcher_tests;

pub use dispatcher::{DEFAULT_BANKS, Dispatcher, DispatcherBuilder, parse_bank_list};
