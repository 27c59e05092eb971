//! Minter configuration.
//!
//! Provides [`MinterConfig`], loadable from an optional file (any format the
//! `config` crate recognizes by extension) layered under `DRIP_`-prefixed
//! environment variables. Nested keys use `__`, e.g. `DRIP_START_BLOCK=100`.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use drip_core::address::AccountId;
use drip_core::amount::{serde_decimal, serde_decimal_opt};
use drip_core::constants::ENV_PREFIX;
use drip_core::error::MinterError;
use drip_core::traits::{BlockClock, Ledger};
use drip_core::types::DecayParams;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::minter::{Minter, MinterParams};

/// Initial engine configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MinterConfig {
    pub admin: AccountId,
    /// Account the engine mints as on the ledger.
    pub minter_account: AccountId,
    #[serde(default)]
    pub start_block: u64,
    #[serde(default, with = "serde_decimal_opt")]
    pub supply_cap: Option<U256>,
    /// Pools registered at construction, in index order.
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

/// One initial pool.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub receiver: AccountId,
    #[serde(with = "serde_decimal")]
    pub amount_per_block: U256,
    #[serde(default)]
    pub decay: Option<DecayParams>,
}

impl MinterConfig {
    /// Load from `path` (if given) overlaid with environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "loading minter config");
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn params(&self) -> MinterParams {
        MinterParams {
            admin: self.admin,
            minter_account: self.minter_account,
            start_block: self.start_block,
            supply_cap: self.supply_cap,
        }
    }
}

impl<L: Ledger, C: BlockClock> Minter<L, C> {
    /// Build an engine and register the configured pools as the admin.
    ///
    /// # Errors
    ///
    /// Any error [`Minter::new`] or [`Minter::add_pool`] returns.
    pub fn from_config(config: &MinterConfig, ledger: L, clock: C) -> Result<Self, MinterError> {
        let mut minter = Self::new(ledger, clock, config.params())?;
        for pool in &config.pools {
            minter.add_pool(&config.admin, pool.receiver, pool.amount_per_block, pool.decay)?;
        }
        Ok(minter)
    }
}
