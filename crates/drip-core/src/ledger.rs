//! In-memory ledger and manual clock.
//!
//! [`MemoryLedger`] is a complete, serializable [`Ledger`] used by tests and
//! the command-line harness. [`ManualClock`] is a [`BlockClock`] whose height
//! is moved explicitly; clones share the same height.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::address::AccountId;
use crate::amount::{serde_decimal, serde_decimal_map};
use crate::error::LedgerError;
use crate::traits::{BlockClock, Ledger};

/// Balances, total supply, and the set of accounts allowed to mint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    #[serde(with = "serde_decimal_map")]
    balances: BTreeMap<AccountId, U256>,
    #[serde(with = "serde_decimal")]
    total_supply: U256,
    minters: BTreeSet<AccountId>,
}

impl MemoryLedger {
    /// Create an empty ledger with no authorized minters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger that authorizes `minter`.
    pub fn with_minter(minter: AccountId) -> Self {
        let mut ledger = Self::new();
        ledger.add_minter(minter);
        ledger
    }

    /// Authorize `account` to mint.
    pub fn add_minter(&mut self, account: AccountId) {
        self.minters.insert(account);
    }

    /// Revoke `account`'s mint permission. Returns whether it was authorized.
    pub fn remove_minter(&mut self, account: &AccountId) -> bool {
        self.minters.remove(account)
    }

    /// Accounts with a non-zero balance, in account order.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &U256)> {
        self.balances.iter().filter(|(_, b)| !b.is_zero())
    }
}

impl Ledger for MemoryLedger {
    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn balance_of(&self, account: &AccountId) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn is_minter(&self, account: &AccountId) -> bool {
        self.minters.contains(account)
    }

    fn mint(&mut self, minter: &AccountId, to: &AccountId, amount: U256) -> Result<(), LedgerError> {
        if !self.is_minter(minter) {
            return Err(LedgerError::Unauthorized { minter: *minter });
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        // A balance never exceeds total supply, so this add cannot overflow.
        let balance = self.balance_of(to) + amount;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }
}

/// A block clock moved by hand.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    height: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock starting at `height`.
    pub fn at(height: u64) -> Self {
        Self {
            height: Arc::new(AtomicU64::new(height)),
        }
    }

    /// Move forward `blocks` blocks, saturating at `u64::MAX`. Returns the new height.
    pub fn advance(&self, blocks: u64) -> u64 {
        let mut current = self.height.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(blocks);
            match self.height.compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Jump to `height`. Moving backwards is allowed; callers use it to test
    /// that the minter tolerates a clock behind its markers.
    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl BlockClock for ManualClock {
    fn current_block(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(b: u8) -> AccountId {
        AccountId::repeat_byte(b)
    }

    // ------------------------------------------------------------------
    // MemoryLedger
    // ------------------------------------------------------------------

    #[test]
    fn mint_credits_balance_and_supply() {
        let minter = acct(0xee);
        let mut l = MemoryLedger::with_minter(minter);
        l.mint(&minter, &acct(1), U256::from(100u64)).unwrap();
        l.mint(&minter, &acct(1), U256::from(5u64)).unwrap();
        l.mint(&minter, &acct(2), U256::from(7u64)).unwrap();
        assert_eq!(l.balance_of(&acct(1)), U256::from(105u64));
        assert_eq!(l.balance_of(&acct(2)), U256::from(7u64));
        assert_eq!(l.total_supply(), U256::from(112u64));
    }

    #[test]
    fn mint_requires_authorization() {
        let mut l = MemoryLedger::new();
        let err = l.mint(&acct(9), &acct(1), U256::one()).unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized { minter: acct(9) });
        assert!(l.total_supply().is_zero());
    }

    #[test]
    fn revoked_minter_cannot_mint() {
        let minter = acct(0xee);
        let mut l = MemoryLedger::with_minter(minter);
        assert!(l.remove_minter(&minter));
        assert!(!l.remove_minter(&minter));
        assert!(l.mint(&minter, &acct(1), U256::one()).is_err());
    }

    #[test]
    fn mint_rejects_supply_overflow() {
        let minter = acct(0xee);
        let mut l = MemoryLedger::with_minter(minter);
        l.mint(&minter, &acct(1), U256::MAX).unwrap();
        assert_eq!(
            l.mint(&minter, &acct(2), U256::one()),
            Err(LedgerError::SupplyOverflow)
        );
        assert_eq!(l.total_supply(), U256::MAX);
        assert!(l.balance_of(&acct(2)).is_zero());
    }

    #[test]
    fn holders_skip_zero_balances() {
        let minter = acct(0xee);
        let mut l = MemoryLedger::with_minter(minter);
        l.mint(&minter, &acct(1), U256::zero()).unwrap();
        l.mint(&minter, &acct(2), U256::from(3u64)).unwrap();
        let holders: Vec<_> = l.holders().map(|(a, _)| *a).collect();
        assert_eq!(holders, vec![acct(2)]);
    }

    #[test]
    fn ledger_serde_roundtrip() {
        let minter = acct(0xee);
        let mut l = MemoryLedger::with_minter(minter);
        l.mint(&minter, &acct(1), U256::exp10(30)).unwrap();
        let json = serde_json::to_string(&l).unwrap();
        assert!(json.contains("\"1000000000000000000000000000000\""));
        let back: MemoryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, l);
    }

    // ------------------------------------------------------------------
    // ManualClock
    // ------------------------------------------------------------------

    #[test]
    fn clock_advance_and_set() {
        let clock = ManualClock::at(10);
        assert_eq!(clock.advance(5), 15);
        assert_eq!(clock.current_block(), 15);
        clock.set(3);
        assert_eq!(clock.current_block(), 3);
    }

    #[test]
    fn clock_clones_share_height() {
        let a = ManualClock::at(0);
        let b = a.clone();
        a.advance(42);
        assert_eq!(b.current_block(), 42);
    }

    #[test]
    fn clock_advance_saturates() {
        let clock = ManualClock::at(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
    }
}
