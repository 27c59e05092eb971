//! # drip-minter — Block-synchronized token emission.
//!
//! A [`Minter`] pays a set of pools `amount_per_block` for every block that
//! elapsed since the last mint, clamped by an optional supply cap, and
//! lets anyone apply each pool's periodic emission decay.
//!
//! - [`registry`] — dense, re-indexable pool list with stable [`PoolId`](drip_core::types::PoolId)s
//! - [`minter`] — the engine: mint, decay, cap, and admin operations
//! - [`access`] — single-admin guard
//! - [`config`] — file/environment configuration
//! - [`snapshot`] — serializable engine state
//! - [`shared`] — mutex-serialized handle for multi-threaded hosts

pub mod access;
pub mod config;
pub mod minter;
pub mod registry;
pub mod shared;
pub mod snapshot;

pub use access::AccessControl;
pub use crate::config::{MinterConfig, PoolConfig};
pub use minter::{Minter, MinterParams};
pub use registry::PoolRegistry;
pub use shared::SharedMinter;
pub use snapshot::MinterSnapshot;
