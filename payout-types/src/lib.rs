//! # Payout Types
//!
//! Domain types and the provider port for the bank payout gateway.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the gateway:
//! - `domain/` - Pure domain types (Currency, Money, RUT, bank catalog)
//! - `ports/` - The `BankProvider` contract every bank adapter implements
//! - `dto/` - Values crossing the gateway boundary (requests, responses, reports)
//! - `error/` - The closed failure taxonomy

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{BankInfo, Currency, Money, Rut, mask_account, normalize_account_number};
pub use dto::*;
pub use error::{DomainError, FailureKind, GatewayError};
pub use ports::BankProvider;
