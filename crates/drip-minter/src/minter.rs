//! The minting engine.
//!
//! [`Minter`] owns the pool registry and the mint markers. Its public
//! operations fall into four groups:
//! - **Registry** (admin): [`add_pool`](Minter::add_pool),
//!   [`update_pool`](Minter::update_pool), [`remove_pool`](Minter::remove_pool)
//! - **Minting** (anyone): [`mint`](Minter::mint)
//! - **Decay** (anyone): [`update_emissions`](Minter::update_emissions),
//!   [`update_all_emissions`](Minter::update_all_emissions)
//! - **Configuration** (admin): [`update_supply_cap`](Minter::update_supply_cap),
//!   [`update_admin`](Minter::update_admin)
//!
//! Every operation samples the clock once, validates and stages its result,
//! and only then mutates state. A failed call leaves the engine untouched.

use drip_core::address::AccountId;
use drip_core::error::{LedgerError, MinterError};
use drip_core::traits::{BlockClock, DecayCalculator, Ledger};
use drip_core::types::{
    DecayParams, DecaySchedule, EmissionUpdate, MintReceipt, Payout, Pool, PoolId,
};
use drip_decay::PeriodicDecay;
use primitive_types::U256;
use tracing::{debug, info, warn};

use crate::access::AccessControl;
use crate::registry::PoolRegistry;
use crate::snapshot::MinterSnapshot;

/// Construction parameters for a [`Minter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinterParams {
    /// Initial admin.
    pub admin: AccountId,
    /// Account the engine mints as; must be authorized on the ledger.
    pub minter_account: AccountId,
    /// No block up to and including this one is ever paid for.
    pub start_block: u64,
    /// Optional ceiling on the ledger's total supply.
    pub supply_cap: Option<U256>,
}

/// Block-synchronized emission engine.
pub struct Minter<L, C> {
    access: AccessControl,
    registry: PoolRegistry,
    minter_account: AccountId,
    start_block: u64,
    last_mint_block: u64,
    supply_cap: Option<U256>,
    total_minted: U256,
    decay: PeriodicDecay,
    ledger: L,
    clock: C,
}

fn ensure_nonzero(account: &AccountId) -> Result<(), MinterError> {
    if account.is_zero() {
        return Err(MinterError::ZeroAddress);
    }
    Ok(())
}

impl<L: Ledger, C: BlockClock> Minter<L, C> {
    /// Create an engine with an empty registry.
    ///
    /// `last_mint_block` starts at `params.start_block`.
    ///
    /// # Errors
    ///
    /// [`MinterError::ZeroAddress`] if the admin or minter account is zero.
    pub fn new(ledger: L, clock: C, params: MinterParams) -> Result<Self, MinterError> {
        let access = AccessControl::new(params.admin)?;
        ensure_nonzero(&params.minter_account)?;
        info!(
            admin = %params.admin,
            minter = %params.minter_account,
            start_block = params.start_block,
            cap = ?params.supply_cap.map(|c| c.to_string()),
            "minter created"
        );
        Ok(Self {
            access,
            registry: PoolRegistry::new(),
            minter_account: params.minter_account,
            start_block: params.start_block,
            last_mint_block: params.start_block,
            supply_cap: params.supply_cap,
            total_minted: U256::zero(),
            decay: PeriodicDecay::new(),
            ledger,
            clock,
        })
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// # Errors
    ///
    /// [`MinterError::InvalidSnapshot`] if the snapshot breaks a registry
    /// invariant or has `last_mint_block < start_block`;
    /// [`MinterError::ZeroAddress`] for a zero admin or minter account.
    pub fn restore(snapshot: MinterSnapshot, ledger: L, clock: C) -> Result<Self, MinterError> {
        let access = AccessControl::new(snapshot.admin)?;
        ensure_nonzero(&snapshot.minter_account)?;
        if snapshot.last_mint_block < snapshot.start_block {
            return Err(MinterError::InvalidSnapshot(format!(
                "last mint block {} before start block {}",
                snapshot.last_mint_block, snapshot.start_block
            )));
        }
        let registry = PoolRegistry::from_parts(snapshot.pools, snapshot.next_pool_id)?;
        debug!(
            pools = registry.len(),
            last_mint_block = snapshot.last_mint_block,
            "minter restored"
        );
        Ok(Self {
            access,
            registry,
            minter_account: snapshot.minter_account,
            start_block: snapshot.start_block,
            last_mint_block: snapshot.last_mint_block,
            supply_cap: snapshot.supply_cap,
            total_minted: snapshot.total_minted,
            decay: PeriodicDecay::new(),
            ledger,
            clock,
        })
    }

    /// Capture the engine's state (not the ledger or clock).
    pub fn snapshot(&self) -> MinterSnapshot {
        MinterSnapshot {
            admin: self.access.admin(),
            minter_account: self.minter_account,
            start_block: self.start_block,
            last_mint_block: self.last_mint_block,
            supply_cap: self.supply_cap,
            total_minted: self.total_minted,
            next_pool_id: self.registry.next_id(),
            pools: self.registry.as_slice().to_vec(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn admin(&self) -> AccountId {
        self.access.admin()
    }

    pub fn minter_account(&self) -> AccountId {
        self.minter_account
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    /// Block of the last successful mint (the start block before any mint).
    pub fn last_mint_block(&self) -> u64 {
        self.last_mint_block
    }

    pub fn supply_cap(&self) -> Option<U256> {
        self.supply_cap
    }

    /// Lifetime total minted through this engine.
    pub fn total_minted(&self) -> U256 {
        self.total_minted
    }

    /// Supply still mintable under the cap; `None` when uncapped.
    pub fn remaining_supply(&self) -> Option<U256> {
        self.supply_cap.map(|cap| self.ledger.remaining_under(cap))
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct access to the ledger collaborator, e.g. to grant mint rights.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consume the engine, returning its collaborators.
    pub fn into_parts(self) -> (L, C) {
        (self.ledger, self.clock)
    }

    // ------------------------------------------------------------------
    // Pool registry
    // ------------------------------------------------------------------

    /// Number of live pools.
    pub fn pool_length(&self) -> usize {
        self.registry.len()
    }

    /// Pool at `index`. Indices change when a pool is removed.
    pub fn get_pool(&self, index: usize) -> Result<&Pool, MinterError> {
        self.registry.get(index)
    }

    /// All pools in index order.
    pub fn pools(&self) -> &[Pool] {
        self.registry.as_slice()
    }

    /// Pool by stable id.
    pub fn pool_by_id(&self, id: PoolId) -> Option<&Pool> {
        self.registry.by_id(id)
    }

    /// Current index of a pool id.
    pub fn index_of(&self, id: PoolId) -> Option<usize> {
        self.registry.index_of(id)
    }

    /// Append a pool. Its decay timer, if any, starts at the current block.
    ///
    /// # Errors
    ///
    /// - [`MinterError::NotAuthorized`] if `caller` is not the admin
    /// - [`MinterError::ZeroAddress`] for a zero receiver
    /// - [`MinterError::InvalidDecayPercent`] / [`MinterError::InvalidDecayPeriod`]
    pub fn add_pool(
        &mut self,
        caller: &AccountId,
        receiver: AccountId,
        amount_per_block: U256,
        decay: Option<DecayParams>,
    ) -> Result<PoolId, MinterError> {
        self.access.ensure_admin(caller)?;
        ensure_nonzero(&receiver)?;
        let current = self.clock.current_block();
        let schedule = decay
            .map(|params| DecaySchedule::new(params, current))
            .transpose()?;

        let id = self.registry.push(receiver, amount_per_block, schedule);
        info!(
            %id,
            index = self.registry.len() - 1,
            %receiver,
            amount_per_block = %amount_per_block,
            decay = ?decay,
            "pool added"
        );
        Ok(id)
    }

    /// Replace the fields of the pool at `index`.
    ///
    /// A pool that already decays keeps its timer; a newly added schedule
    /// starts at the current block; `None` removes decay.
    ///
    /// # Errors
    ///
    /// As [`add_pool`](Self::add_pool), plus [`MinterError::IndexInvalid`].
    pub fn update_pool(
        &mut self,
        caller: &AccountId,
        index: usize,
        receiver: AccountId,
        amount_per_block: U256,
        decay: Option<DecayParams>,
    ) -> Result<(), MinterError> {
        self.access.ensure_admin(caller)?;
        ensure_nonzero(&receiver)?;
        let current = self.clock.current_block();
        let existing = self.registry.get(index)?.decay;
        let schedule = match (decay, existing) {
            (Some(params), Some(running)) => Some(DecaySchedule::new(params, running.last_update_block)?),
            (Some(params), None) => Some(DecaySchedule::new(params, current)?),
            (None, _) => None,
        };

        let pool = self.registry.get_mut(index)?;
        pool.receiver = receiver;
        pool.amount_per_block = amount_per_block;
        pool.decay = schedule;
        info!(
            id = %pool.id,
            index,
            %receiver,
            amount_per_block = %amount_per_block,
            decay = ?decay,
            "pool updated"
        );
        Ok(())
    }

    /// Remove the pool at `index`; the last pool moves into `index`.
    ///
    /// Returns the removed pool.
    pub fn remove_pool(&mut self, caller: &AccountId, index: usize) -> Result<Pool, MinterError> {
        self.access.ensure_admin(caller)?;
        let removed = self.registry.swap_remove(index)?;
        let moved = self.registry.as_slice().get(index).map(|p| p.id);
        info!(id = %removed.id, index, moved = ?moved, "pool removed");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Minting
    // ------------------------------------------------------------------

    fn blocks_since_mint(&self, current: u64) -> Option<u64> {
        current
            .checked_sub(self.last_mint_block)
            .filter(|delta| *delta > 0)
    }

    /// Compute every payout for `delta` blocks ending at `current`.
    fn plan_mint(&self, current: u64, delta: u64) -> Result<MintReceipt, MinterError> {
        let mut remaining = match self.supply_cap {
            Some(cap) => {
                let remaining = self.ledger.remaining_under(cap);
                if remaining.is_zero() {
                    return Err(MinterError::CapReached { cap });
                }
                Some(remaining)
            }
            None => None,
        };

        let blocks = U256::from(delta);
        let mut payouts = Vec::with_capacity(self.registry.len());
        let mut total = U256::zero();
        let mut clamped = false;

        for (index, pool) in self.registry.iter().enumerate() {
            let owed = pool
                .amount_per_block
                .checked_mul(blocks)
                .ok_or(MinterError::ArithmeticOverflow)?;
            let amount = match remaining.as_mut() {
                Some(left) => {
                    let amount = owed.min(*left);
                    clamped |= amount < owed;
                    *left -= amount;
                    amount
                }
                None => owed,
            };
            total = total
                .checked_add(amount)
                .ok_or(MinterError::ArithmeticOverflow)?;
            payouts.push(Payout {
                index,
                pool_id: pool.id,
                receiver: pool.receiver,
                amount,
            });
        }

        Ok(MintReceipt {
            from_block: self.last_mint_block,
            to_block: current,
            payouts,
            total,
            clamped,
        })
    }

    /// Pay every pool for the blocks elapsed since the last mint.
    ///
    /// A call in the same block as the previous mint (or before the start
    /// block) returns an empty receipt and changes nothing. Under a cap,
    /// pools are paid in index order until the remaining supply runs out;
    /// later pools receive zero and the call still succeeds.
    ///
    /// # Errors
    ///
    /// - [`MinterError::CapReached`] if nothing is mintable under the cap at entry
    /// - [`MinterError::ArithmeticOverflow`] if `rate * blocks` or a sum exceeds 256 bits
    /// - [`MinterError::Ledger`] if the engine is not an authorized minter
    pub fn mint(&mut self) -> Result<MintReceipt, MinterError> {
        let current = self.clock.current_block();
        let Some(delta) = self.blocks_since_mint(current) else {
            debug!(current, last_mint_block = self.last_mint_block, "mint: no elapsed blocks");
            return Ok(MintReceipt::empty(self.last_mint_block));
        };

        let receipt = self.plan_mint(current, delta).inspect_err(|e| {
            warn!(current, error = %e, "mint rejected");
        })?;

        if !self.ledger.is_minter(&self.minter_account) {
            return Err(LedgerError::Unauthorized {
                minter: self.minter_account,
            }
            .into());
        }
        let total_minted = self
            .total_minted
            .checked_add(receipt.total)
            .ok_or(MinterError::ArithmeticOverflow)?;
        self.ledger
            .total_supply()
            .checked_add(receipt.total)
            .ok_or(MinterError::ArithmeticOverflow)?;

        for payout in receipt.payouts.iter().filter(|p| !p.amount.is_zero()) {
            self.ledger
                .mint(&self.minter_account, &payout.receiver, payout.amount)?;
            debug!(
                pool = %payout.pool_id,
                receiver = %payout.receiver,
                amount = %payout.amount,
                "payout"
            );
        }

        self.last_mint_block = current;
        self.total_minted = total_minted;

        if receipt.clamped {
            warn!(cap = ?self.supply_cap.map(|c| c.to_string()), "mint clamped by supply cap");
        }
        info!(
            from = receipt.from_block,
            to = receipt.to_block,
            pools = receipt.payouts.len(),
            total = %receipt.total,
            "minted"
        );
        Ok(receipt)
    }

    /// Total a mint at the current block would pay, after clamping.
    ///
    /// Zero when no blocks elapsed or the cap is exhausted.
    pub fn pending_emission(&self) -> Result<U256, MinterError> {
        let current = self.clock.current_block();
        let Some(delta) = self.blocks_since_mint(current) else {
            return Ok(U256::zero());
        };
        match self.plan_mint(current, delta) {
            Ok(receipt) => Ok(receipt.total),
            Err(MinterError::CapReached { .. }) => Ok(U256::zero()),
            Err(e) => Err(e),
        }
    }

    /// Set, replace, or (with `None`) remove the supply cap.
    ///
    /// Has no effect on supply already minted.
    pub fn update_supply_cap(&mut self, caller: &AccountId, new_cap: Option<U256>) -> Result<(), MinterError> {
        self.access.ensure_admin(caller)?;
        let old = std::mem::replace(&mut self.supply_cap, new_cap);
        info!(
            old = ?old.map(|c| c.to_string()),
            new = ?new_cap.map(|c| c.to_string()),
            "supply cap updated"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Emission decay
    // ------------------------------------------------------------------

    fn emission_update(&self, index: usize, pool: &Pool, current: u64) -> Result<Option<EmissionUpdate>, MinterError> {
        let Some(schedule) = pool.decay else {
            return Ok(None);
        };
        let Some(step) = self.decay.step(pool.amount_per_block, &schedule, current)? else {
            return Ok(None);
        };
        Ok(Some(EmissionUpdate {
            index,
            pool_id: pool.id,
            old_rate: pool.amount_per_block,
            new_rate: step.new_rate,
            periods: step.periods,
            last_update_block: step.last_update_block,
        }))
    }

    fn apply_emission_update(&mut self, update: &EmissionUpdate) -> Result<(), MinterError> {
        let pool = self.registry.get_mut(update.index)?;
        pool.amount_per_block = update.new_rate;
        if let Some(schedule) = pool.decay.as_mut() {
            schedule.last_update_block = update.last_update_block;
        }
        info!(
            pool = %update.pool_id,
            index = update.index,
            periods = update.periods,
            old_rate = %update.old_rate,
            new_rate = %update.new_rate,
            "emission decayed"
        );
        Ok(())
    }

    /// Apply every completed decay period to the pool at `index`.
    ///
    /// Permissionless. Returns `None` if the pool has no schedule or its
    /// current period has not finished.
    pub fn update_emissions(&mut self, index: usize) -> Result<Option<EmissionUpdate>, MinterError> {
        let current = self.clock.current_block();
        let pool = self.registry.get(index)?;
        let Some(update) = self.emission_update(index, pool, current)? else {
            debug!(index, current, "emission update: not due");
            return Ok(None);
        };
        self.apply_emission_update(&update)?;
        Ok(Some(update))
    }

    /// Apply [`update_emissions`](Self::update_emissions) to every pool.
    ///
    /// All updates are computed before any is applied, so an error leaves
    /// every pool unchanged. Returns the pools that changed, in index order.
    pub fn update_all_emissions(&mut self) -> Result<Vec<EmissionUpdate>, MinterError> {
        let current = self.clock.current_block();
        let mut updates = Vec::new();
        for (index, pool) in self.registry.iter().enumerate() {
            if let Some(update) = self.emission_update(index, pool, current)? {
                updates.push(update);
            }
        }
        for update in &updates {
            self.apply_emission_update(update)?;
        }
        debug!(current, updated = updates.len(), "emission update: all pools");
        Ok(updates)
    }

    // ------------------------------------------------------------------
    // Access control
    // ------------------------------------------------------------------

    /// Hand the admin role to `new_admin` in one step.
    pub fn update_admin(&mut self, caller: &AccountId, new_admin: AccountId) -> Result<(), MinterError> {
        let previous = self.access.transfer(caller, new_admin)?;
        info!(%previous, %new_admin, "admin updated");
        Ok(())
    }
}
