//! Core emission types: pools, decay schedules, mint receipts.
//!
//! All token amounts are in base units and use 256-bit integers.
//! All block numbers are `u64`.

use serde::{Deserialize, Serialize};
use std::fmt;

use primitive_types::U256;

use crate::address::AccountId;
use crate::amount::serde_decimal;
use crate::constants::MAX_DECAY_BPS;
use crate::error::DecayError;

/// Stable, never-reused pool identifier.
///
/// Pool *indices* are ephemeral: removing a pool moves the last pool into
/// the freed slot. A `PoolId` keeps naming the same pool across removals.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PoolId(pub u64);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Decay parameters supplied when adding or updating a pool.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecayParams {
    /// Rate reduction per period, in basis points (100 = 1%).
    pub percent_bp: u32,
    /// Length of one decay period in blocks.
    pub period_blocks: u64,
}

impl DecayParams {
    pub fn new(percent_bp: u32, period_blocks: u64) -> Self {
        Self {
            percent_bp,
            period_blocks,
        }
    }

    /// Check `percent_bp <= 10_000` and `period_blocks > 0`.
    pub fn validate(&self) -> Result<(), DecayError> {
        if self.percent_bp > MAX_DECAY_BPS {
            return Err(DecayError::InvalidPercent(self.percent_bp));
        }
        if self.period_blocks == 0 {
            return Err(DecayError::ZeroPeriod);
        }
        Ok(())
    }
}

/// A pool's decay schedule with its running timer.
///
/// `last_update_block` only ever advances by whole multiples of
/// `period_blocks`, so blocks left over from a partial period carry into
/// the next update.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecaySchedule {
    pub percent_bp: u32,
    pub period_blocks: u64,
    pub last_update_block: u64,
}

impl DecaySchedule {
    /// Start a validated schedule whose first period begins at `start_block`.
    pub fn new(params: DecayParams, start_block: u64) -> Result<Self, DecayError> {
        params.validate()?;
        Ok(Self {
            percent_bp: params.percent_bp,
            period_blocks: params.period_blocks,
            last_update_block: start_block,
        })
    }

    /// The parameters of this schedule without its timer.
    pub fn params(&self) -> DecayParams {
        DecayParams::new(self.percent_bp, self.period_blocks)
    }

    /// First block at which the next decay period completes.
    ///
    /// Returns `None` if that block is beyond `u64::MAX`.
    pub fn next_update_block(&self) -> Option<u64> {
        self.last_update_block.checked_add(self.period_blocks)
    }
}

/// An emission pool: a receiver paid `amount_per_block` for every elapsed block.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    /// Stable identifier assigned when the pool was added.
    pub id: PoolId,
    /// Account credited on every mint.
    pub receiver: AccountId,
    /// Emission rate in base units per block.
    #[serde(with = "serde_decimal")]
    pub amount_per_block: U256,
    /// Optional periodic rate decay.
    #[serde(default)]
    pub decay: Option<DecaySchedule>,
}

/// Result of applying whole decay periods to a rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecayStep {
    /// Rate after every completed period has been applied.
    pub new_rate: U256,
    /// Number of whole periods applied.
    pub periods: u64,
    /// Timer position after advancing by `periods * period_blocks`.
    pub last_update_block: u64,
}

/// One pool's share of a mint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Payout {
    /// Registry index at the time of the mint.
    pub index: usize,
    pub pool_id: PoolId,
    pub receiver: AccountId,
    #[serde(with = "serde_decimal")]
    pub amount: U256,
}

/// Outcome of a mint call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    /// `last_mint_block` before the call.
    pub from_block: u64,
    /// `last_mint_block` after the call.
    pub to_block: u64,
    /// Per-pool amounts in registry order, zero amounts included.
    pub payouts: Vec<Payout>,
    /// Sum of all payouts.
    #[serde(with = "serde_decimal")]
    pub total: U256,
    /// Whether the supply cap reduced at least one payout.
    pub clamped: bool,
}

impl MintReceipt {
    /// Receipt for a call that found no elapsed blocks.
    pub fn empty(block: u64) -> Self {
        Self {
            from_block: block,
            to_block: block,
            payouts: Vec::new(),
            total: U256::zero(),
            clamped: false,
        }
    }

    /// Number of blocks this mint paid for.
    pub fn blocks(&self) -> u64 {
        self.to_block - self.from_block
    }

    /// Whether the call changed nothing.
    pub fn is_noop(&self) -> bool {
        self.from_block == self.to_block
    }

    /// Amount paid to a given pool, if it took part in this mint.
    pub fn paid_to(&self, pool_id: PoolId) -> Option<U256> {
        self.payouts
            .iter()
            .find(|p| p.pool_id == pool_id)
            .map(|p| p.amount)
    }
}

/// A decay applied to one pool by `update_emissions`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmissionUpdate {
    pub index: usize,
    pub pool_id: PoolId,
    #[serde(with = "serde_decimal")]
    pub old_rate: U256,
    #[serde(with = "serde_decimal")]
    pub new_rate: U256,
    pub periods: u64,
    pub last_update_block: u64,
}
