//! Shared test helpers for E2E and adversarial tests.

use drip_core::address::AccountId;
use drip_core::ledger::{ManualClock, MemoryLedger};
use drip_minter::{Minter, MinterParams};
use primitive_types::U256;

pub type TestMinter = Minter<MemoryLedger, ManualClock>;

pub const ADMIN: AccountId = AccountId([0xad; 20]);
pub const MINTER: AccountId = AccountId([0xee; 20]);

/// Account id from a seed byte.
pub fn acct(seed: u8) -> AccountId {
    AccountId::repeat_byte(seed)
}

pub fn u(v: u64) -> U256 {
    U256::from(v)
}

/// A minter authorized on a fresh ledger, its clock at `start_block`.
pub fn minter_at(start_block: u64, supply_cap: Option<U256>) -> (TestMinter, ManualClock) {
    let clock = ManualClock::at(start_block);
    let minter = Minter::new(
        MemoryLedger::with_minter(MINTER),
        clock.clone(),
        MinterParams {
            admin: ADMIN,
            minter_account: MINTER,
            start_block,
            supply_cap,
        },
    )
    .expect("valid params");
    (minter, clock)
}

/// Sum of every ledger balance.
pub fn sum_of_balances(minter: &TestMinter) -> U256 {
    minter
        .ledger()
        .holders()
        .fold(U256::zero(), |acc, (_, b)| acc + *b)
}
