//! Serializable minter state.
//!
//! A [`MinterSnapshot`] captures everything the engine owns: admin, mint
//! markers, cap, lifetime total, and the pool registry. It does not include
//! the ledger or the clock. [`Minter::snapshot`](crate::Minter::snapshot)
//! and [`Minter::restore`](crate::Minter::restore) convert in both directions.

use drip_core::address::AccountId;
use drip_core::amount::{serde_decimal, serde_decimal_opt};
use drip_core::types::Pool;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MinterSnapshot {
    pub admin: AccountId,
    /// Account the engine mints as on the ledger.
    pub minter_account: AccountId,
    pub start_block: u64,
    pub last_mint_block: u64,
    #[serde(default, with = "serde_decimal_opt")]
    pub supply_cap: Option<U256>,
    #[serde(with = "serde_decimal")]
    pub total_minted: U256,
    pub next_pool_id: u64,
    /// Pools in registry order.
    pub pools: Vec<Pool>,
}

impl MinterSnapshot {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
