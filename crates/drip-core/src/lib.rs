//! # drip-core
//! Foundation types and traits for the Drip emission engine.

pub mod address;
pub mod amount;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod traits;
pub mod types;

pub use primitive_types::U256;
