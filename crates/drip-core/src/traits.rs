//! Trait interfaces for the Drip emission engine.
//!
//! These traits define the contracts between the minter and its collaborators:
//! - [`Ledger`] — token balance ledger with a permissioned mint primitive
//! - [`BlockClock`] — monotonic block height source
//! - [`DecayCalculator`] — emission decay math (drip-decay implements)

use std::sync::Arc;

use primitive_types::U256;

use crate::address::AccountId;
use crate::error::{DecayError, LedgerError};
use crate::types::{DecaySchedule, DecayStep};

/// The token ledger the minter pays out through.
///
/// The minter never touches balances directly; it only calls
/// [`mint`](Self::mint) and reads supply.
pub trait Ledger: Send + Sync {
    /// Total supply in base units.
    fn total_supply(&self) -> U256;

    /// Balance of `account` in base units.
    fn balance_of(&self, account: &AccountId) -> U256;

    /// Whether `account` may call [`mint`](Self::mint).
    fn is_minter(&self, account: &AccountId) -> bool;

    /// Credit `amount` to `to`, increasing total supply.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `minter` is not an authorized minter
    /// - [`LedgerError::SupplyOverflow`] if total supply would exceed 256 bits
    fn mint(&mut self, minter: &AccountId, to: &AccountId, amount: U256)
        -> Result<(), LedgerError>;

    /// Supply still mintable under `cap`. Zero once supply has reached or passed it.
    fn remaining_under(&self, cap: U256) -> U256 {
        cap.saturating_sub(self.total_supply())
    }
}

/// Source of the current block height.
///
/// Sampled once at the start of each minter operation.
pub trait BlockClock: Send + Sync {
    fn current_block(&self) -> u64;
}

impl<C: BlockClock + ?Sized> BlockClock for Arc<C> {
    fn current_block(&self) -> u64 {
        (**self).current_block()
    }
}

/// Pure computation of per-period emission decay.
///
/// All math is integer-only; each period's result is floored before the
/// next period is applied.
pub trait DecayCalculator: Send + Sync {
    /// `rate` after `periods` consecutive decays of `percent_bp` basis points.
    fn decayed_rate(&self, rate: U256, percent_bp: u32, periods: u64)
        -> Result<U256, DecayError>;

    /// Apply every whole period completed by `current_block`.
    ///
    /// Returns `None` while the current period is still running (including
    /// when `current_block` is behind the timer). Otherwise the timer
    /// advances by exactly `periods * period_blocks`.
    fn step(
        &self,
        rate: U256,
        schedule: &DecaySchedule,
        current_block: u64,
    ) -> Result<Option<DecayStep>, DecayError> {
        if schedule.period_blocks == 0 {
            return Err(DecayError::ZeroPeriod);
        }
        let elapsed = current_block.saturating_sub(schedule.last_update_block);
        if elapsed < schedule.period_blocks {
            return Ok(None);
        }

        let periods = elapsed / schedule.period_blocks;
        let advance = periods
            .checked_mul(schedule.period_blocks)
            .ok_or(DecayError::ArithmeticOverflow)?;
        let last_update_block = schedule
            .last_update_block
            .checked_add(advance)
            .ok_or(DecayError::ArithmeticOverflow)?;
        let new_rate = self.decayed_rate(rate, schedule.percent_bp, periods)?;

        Ok(Some(DecayStep {
            new_rate,
            periods,
            last_update_block,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecayParams;
    use std::collections::HashMap;

    // ------------------------------------------------------------------
    // Mock: Ledger
    // ------------------------------------------------------------------

    struct MockLedger {
        supply: U256,
        balances: HashMap<AccountId, U256>,
        minter: AccountId,
    }

    impl Ledger for MockLedger {
        fn total_supply(&self) -> U256 {
            self.supply
        }

        fn balance_of(&self, account: &AccountId) -> U256 {
            self.balances.get(account).copied().unwrap_or_default()
        }

        fn is_minter(&self, account: &AccountId) -> bool {
            *account == self.minter
        }

        fn mint(
            &mut self,
            minter: &AccountId,
            to: &AccountId,
            amount: U256,
        ) -> Result<(), LedgerError> {
            if !self.is_minter(minter) {
                return Err(LedgerError::Unauthorized { minter: *minter });
            }
            self.supply = self
                .supply
                .checked_add(amount)
                .ok_or(LedgerError::SupplyOverflow)?;
            *self.balances.entry(*to).or_default() += amount;
            Ok(())
        }
    }

    fn mock_ledger(supply: u64) -> MockLedger {
        MockLedger {
            supply: U256::from(supply),
            balances: HashMap::new(),
            minter: AccountId::repeat_byte(0xee),
        }
    }

    #[test]
    fn remaining_under_cap() {
        let l = mock_ledger(400);
        assert_eq!(l.remaining_under(U256::from(1000u64)), U256::from(600u64));
    }

    #[test]
    fn remaining_under_saturates_at_zero() {
        let l = mock_ledger(1500);
        assert_eq!(l.remaining_under(U256::from(1000u64)), U256::zero());
    }

    #[test]
    fn mock_ledger_rejects_unknown_minter() {
        let mut l = mock_ledger(0);
        let stranger = AccountId::repeat_byte(1);
        assert_eq!(
            l.mint(&stranger, &stranger, U256::one()),
            Err(LedgerError::Unauthorized { minter: stranger })
        );
        assert!(l.total_supply().is_zero());
    }

    // ------------------------------------------------------------------
    // Mock: BlockClock
    // ------------------------------------------------------------------

    struct FixedClock(u64);

    impl BlockClock for FixedClock {
        fn current_block(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn arc_clock_delegates() {
        let clock = Arc::new(FixedClock(77));
        assert_eq!(clock.current_block(), 77);
        let dyn_clock: Arc<dyn BlockClock> = Arc::new(FixedClock(5));
        assert_eq!(dyn_clock.current_block(), 5);
    }

    // ------------------------------------------------------------------
    // Mock: DecayCalculator (halves per period)
    // ------------------------------------------------------------------

    struct Halving;

    impl DecayCalculator for Halving {
        fn decayed_rate(
            &self,
            rate: U256,
            _percent_bp: u32,
            periods: u64,
        ) -> Result<U256, DecayError> {
            Ok(if periods >= 256 { U256::zero() } else { rate >> periods as usize })
        }
    }

    fn schedule(period: u64, last: u64) -> DecaySchedule {
        DecaySchedule::new(DecayParams::new(5_000, period), last).unwrap()
    }

    #[test]
    fn step_waits_for_full_period() {
        let s = schedule(50, 100);
        assert_eq!(Halving.step(U256::from(64u64), &s, 149).unwrap(), None);
        assert_eq!(Halving.step(U256::from(64u64), &s, 100).unwrap(), None);
    }

    #[test]
    fn step_clock_behind_timer_is_noop() {
        let s = schedule(50, 100);
        assert_eq!(Halving.step(U256::from(64u64), &s, 10).unwrap(), None);
    }

    #[test]
    fn step_advances_by_whole_periods() {
        let s = schedule(50, 100);
        let step = Halving.step(U256::from(64u64), &s, 275).unwrap().unwrap();
        assert_eq!(step.periods, 3);
        assert_eq!(step.last_update_block, 250);
        assert_eq!(step.new_rate, U256::from(8u64));
    }

    #[test]
    fn step_rejects_zero_period() {
        let s = DecaySchedule {
            percent_bp: 100,
            period_blocks: 0,
            last_update_block: 0,
        };
        assert_eq!(
            Halving.step(U256::one(), &s, 10),
            Err(DecayError::ZeroPeriod)
        );
    }
}
