//! Protocol constants. All token amounts are in base units (1 DRIP = 10^18 units).

use primitive_types::U256;

/// Number of decimal places of the emitted token.
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units (10^18).
pub const COIN: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// Basis-point denominator: 10_000 bp = 100%.
pub const BPS_PRECISION: u32 = 10_000;

/// Largest decay percentage a pool may carry (100%).
pub const MAX_DECAY_BPS: u32 = BPS_PRECISION;

/// Length in bytes of an account identifier.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Environment variable prefix used by configuration loading.
pub const ENV_PREFIX: &str = "DRIP";
