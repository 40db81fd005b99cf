//! Domain models for the payout gateway.

pub mod account;
pub mod bank;
pub mod money;
pub mod rut;

pub use account::{mask_account, normalize_account_number};
pub use bank::BankInfo;
pub use money::{Currency, Money};
pub use rut::Rut;
