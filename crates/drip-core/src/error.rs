//! Error types for the Drip emission engine.
use primitive_types::U256;
use thiserror::Error;

use crate::address::AccountId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("missing 0x prefix")] MissingPrefix,
    #[error("invalid length: {0} hex digits")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("invalid character {0:?} in amount")] InvalidCharacter(char),
    #[error("amount exceeds 256 bits")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecayError {
    #[error("decay percent {0} bp exceeds 10000")] InvalidPercent(u32),
    #[error("decay period must be at least one block")] ZeroPeriod,
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{minter} is not authorized to mint")] Unauthorized { minter: AccountId },
    #[error("total supply overflow")] SupplyOverflow,
}

/// Errors surfaced by the minter's public operations.
///
/// Every error discards the state changes attempted by the failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MinterError {
    /// Caller is not the current admin.
    #[error("not authorized: {caller} is not the admin")]
    NotAuthorized { caller: AccountId },

    /// Pool index is outside the registry.
    #[error("invalid pool index {index} (length {len})")]
    IndexInvalid { index: usize, len: usize },

    /// The supply cap was already exhausted when mint was called.
    #[error("supply cap {cap} reached")]
    CapReached { cap: U256 },

    /// Multiplication or accumulation exceeded 256 bits.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Decay percentage above 10_000 bp.
    #[error("invalid decay percent: {0} bp")]
    InvalidDecayPercent(u32),

    /// Decay period of zero blocks.
    #[error("invalid decay period: 0 blocks")]
    InvalidDecayPeriod,

    /// The zero account was supplied where a real account is required.
    #[error("zero address")]
    ZeroAddress,

    /// A persisted snapshot violates a registry or state invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// The ledger rejected a mint.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<DecayError> for MinterError {
    fn from(err: DecayError) -> Self {
        match err {
            DecayError::InvalidPercent(bp) => MinterError::InvalidDecayPercent(bp),
            DecayError::ZeroPeriod => MinterError::InvalidDecayPeriod,
            DecayError::ArithmeticOverflow => MinterError::ArithmeticOverflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_errors_map_to_minter_taxonomy() {
        assert_eq!(
            MinterError::from(DecayError::InvalidPercent(10_001)),
            MinterError::InvalidDecayPercent(10_001)
        );
        assert_eq!(
            MinterError::from(DecayError::ZeroPeriod),
            MinterError::InvalidDecayPeriod
        );
        assert_eq!(
            MinterError::from(DecayError::ArithmeticOverflow),
            MinterError::ArithmeticOverflow
        );
    }

    #[test]
    fn ledger_error_is_transparent() {
        let minter = AccountId::repeat_byte(0xab);
        let err = MinterError::from(LedgerError::Unauthorized { minter });
        assert_eq!(
            err.to_string(),
            format!("{minter} is not authorized to mint")
        );
    }

    #[test]
    fn cap_reached_displays_decimal_cap() {
        let err = MinterError::CapReached { cap: U256::from(1_000u64) };
        assert_eq!(err.to_string(), "supply cap 1000 reached");
    }
}
