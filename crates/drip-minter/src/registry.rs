//! Pool registry: a dense pool array with an id → index remap.
//!
//! Pools live in a `Vec` addressed by index `0..len`. Removal swaps the last
//! pool into the freed slot and truncates, so indices are only valid until
//! the next removal. Each pool also carries a [`PoolId`] that never changes;
//! the remap keeps `index_of(id)` correct across removals.
//!
//! The registry performs no authorization. [`Minter`](crate::Minter) guards
//! every mutation.

use std::collections::HashMap;

use drip_core::address::AccountId;
use drip_core::error::MinterError;
use drip_core::types::{DecaySchedule, Pool, PoolId};
use primitive_types::U256;

/// Ordered, contiguous list of emission pools.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    positions: HashMap<PoolId, usize>,
    next_id: u64,
}

impl PoolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted pools.
    ///
    /// # Errors
    ///
    /// [`MinterError::InvalidSnapshot`] if ids repeat or are not below
    /// `next_id`, a receiver is the zero account, or a decay schedule is
    /// invalid.
    pub fn from_parts(pools: Vec<Pool>, next_id: u64) -> Result<Self, MinterError> {
        let mut positions = HashMap::with_capacity(pools.len());
        for (index, pool) in pools.iter().enumerate() {
            if pool.id.0 >= next_id {
                return Err(MinterError::InvalidSnapshot(format!(
                    "{} not below next id {next_id}",
                    pool.id
                )));
            }
            if pool.receiver.is_zero() {
                return Err(MinterError::InvalidSnapshot(format!(
                    "{} has the zero receiver",
                    pool.id
                )));
            }
            if let Some(decay) = &pool.decay {
                decay.params().validate().map_err(|e| {
                    MinterError::InvalidSnapshot(format!("{}: {e}", pool.id))
                })?;
            }
            if positions.insert(pool.id, index).is_some() {
                return Err(MinterError::InvalidSnapshot(format!("duplicate {}", pool.id)));
            }
        }
        Ok(Self {
            pools,
            positions,
            next_id,
        })
    }

    /// Number of live pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Id the next added pool will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Pools in index order.
    pub fn as_slice(&self) -> &[Pool] {
        &self.pools
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pool> {
        self.pools.iter()
    }

    fn check_index(&self, index: usize) -> Result<(), MinterError> {
        if index >= self.pools.len() {
            return Err(MinterError::IndexInvalid {
                index,
                len: self.pools.len(),
            });
        }
        Ok(())
    }

    /// Pool at `index`.
    pub fn get(&self, index: usize) -> Result<&Pool, MinterError> {
        self.check_index(index)?;
        Ok(&self.pools[index])
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut Pool, MinterError> {
        self.check_index(index)?;
        Ok(&mut self.pools[index])
    }

    /// Current index of the pool with `id`.
    pub fn index_of(&self, id: PoolId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Pool with `id`, wherever it currently sits.
    pub fn by_id(&self, id: PoolId) -> Option<&Pool> {
        self.index_of(id).map(|index| &self.pools[index])
    }

    /// Append a pool at index `len()`. Returns its id.
    pub fn push(
        &mut self,
        receiver: AccountId,
        amount_per_block: U256,
        decay: Option<DecaySchedule>,
    ) -> PoolId {
        let id = PoolId(self.next_id);
        self.next_id += 1;
        self.positions.insert(id, self.pools.len());
        self.pools.push(Pool {
            id,
            receiver,
            amount_per_block,
            decay,
        });
        id
    }

    /// Remove the pool at `index` by moving the last pool into its slot.
    pub fn swap_remove(&mut self, index: usize) -> Result<Pool, MinterError> {
        self.check_index(index)?;
        let removed = self.pools.swap_remove(index);
        self.positions.remove(&removed.id);
        if let Some(moved) = self.pools.get(index) {
            self.positions.insert(moved.id, index);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::types::DecayParams;
    use proptest::prelude::*;

    fn acct(b: u8) -> AccountId {
        AccountId::repeat_byte(b)
    }

    fn registry_with(n: u8) -> PoolRegistry {
        let mut r = PoolRegistry::new();
        for i in 0..n {
            r.push(acct(i + 1), U256::from(i as u64 * 10), None);
        }
        r
    }

    fn assert_remap_consistent(r: &PoolRegistry) {
        assert_eq!(r.positions.len(), r.len());
        for (index, pool) in r.iter().enumerate() {
            assert_eq!(r.index_of(pool.id), Some(index));
        }
    }

    // ------------------------------------------------------------------
    // push / get
    // ------------------------------------------------------------------

    #[test]
    fn push_appends_with_fresh_ids() {
        let r = registry_with(3);
        assert_eq!(r.len(), 3);
        assert_eq!(r.next_id(), 3);
        for (i, pool) in r.iter().enumerate() {
            assert_eq!(pool.id, PoolId(i as u64));
            assert_eq!(pool.receiver, acct(i as u8 + 1));
        }
        assert_remap_consistent(&r);
    }

    #[test]
    fn get_out_of_range() {
        let r = registry_with(2);
        assert_eq!(r.get(2), Err(MinterError::IndexInvalid { index: 2, len: 2 }));
        assert!(PoolRegistry::new().get(0).is_err());
    }

    // ------------------------------------------------------------------
    // swap_remove
    // ------------------------------------------------------------------

    #[test]
    fn remove_moves_last_into_slot() {
        let mut r = registry_with(4);
        let last = r.get(3).unwrap().clone();
        let removed = r.swap_remove(1).unwrap();
        assert_eq!(removed.id, PoolId(1));
        assert_eq!(r.len(), 3);
        assert_eq!(r.get(1).unwrap(), &last);
        assert_eq!(r.get(0).unwrap().id, PoolId(0));
        assert_eq!(r.get(2).unwrap().id, PoolId(2));
        assert_eq!(r.get(3), Err(MinterError::IndexInvalid { index: 3, len: 3 }));
        assert_remap_consistent(&r);
    }

    #[test]
    fn remove_last_index_just_truncates() {
        let mut r = registry_with(3);
        r.swap_remove(2).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.index_of(PoolId(2)), None);
        assert_remap_consistent(&r);
    }

    #[test]
    fn remove_from_empty_fails() {
        let mut r = PoolRegistry::new();
        assert_eq!(r.swap_remove(0), Err(MinterError::IndexInvalid { index: 0, len: 0 }));
    }

    #[test]
    fn ids_not_reused_after_removal() {
        let mut r = registry_with(2);
        r.swap_remove(1).unwrap();
        let id = r.push(acct(9), U256::one(), None);
        assert_eq!(id, PoolId(2));
    }

    #[test]
    fn by_id_follows_moves() {
        let mut r = registry_with(5);
        r.swap_remove(0).unwrap();
        let moved = r.by_id(PoolId(4)).unwrap();
        assert_eq!(moved.receiver, acct(5));
        assert_eq!(r.index_of(PoolId(4)), Some(0));
        assert!(r.by_id(PoolId(0)).is_none());
    }

    // ------------------------------------------------------------------
    // from_parts
    // ------------------------------------------------------------------

    #[test]
    fn from_parts_rebuilds_remap() {
        let mut r = registry_with(4);
        r.swap_remove(0).unwrap();
        let rebuilt = PoolRegistry::from_parts(r.as_slice().to_vec(), r.next_id()).unwrap();
        assert_eq!(rebuilt.as_slice(), r.as_slice());
        assert_remap_consistent(&rebuilt);
    }

    #[test]
    fn from_parts_rejects_duplicate_ids() {
        let r = registry_with(2);
        let mut pools = r.as_slice().to_vec();
        pools[1].id = pools[0].id;
        assert!(matches!(
            PoolRegistry::from_parts(pools, 5),
            Err(MinterError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn from_parts_rejects_id_at_or_above_next() {
        let r = registry_with(2);
        assert!(PoolRegistry::from_parts(r.as_slice().to_vec(), 1).is_err());
    }

    #[test]
    fn from_parts_rejects_zero_receiver_and_bad_decay() {
        let r = registry_with(1);
        let mut pools = r.as_slice().to_vec();
        pools[0].receiver = AccountId::ZERO;
        assert!(PoolRegistry::from_parts(pools, 1).is_err());

        let mut pools = r.as_slice().to_vec();
        pools[0].decay = Some(DecaySchedule {
            percent_bp: 20_000,
            period_blocks: 5,
            last_update_block: 0,
        });
        assert!(PoolRegistry::from_parts(pools, 1).is_err());

        let mut pools = r.as_slice().to_vec();
        pools[0].decay = Some(DecaySchedule::new(DecayParams::new(100, 5), 0).unwrap());
        assert!(PoolRegistry::from_parts(pools, 1).is_ok());
    }

    proptest! {
        #[test]
        fn remap_stays_bijective(
            initial in 1u8..20,
            removals in proptest::collection::vec(0usize..32, 0..20),
        ) {
            let mut r = registry_with(initial);
            for idx in removals {
                let len = r.len();
                let res = r.swap_remove(idx);
                if idx < len {
                    prop_assert!(res.is_ok());
                    prop_assert_eq!(r.len(), len - 1);
                } else {
                    prop_assert!(res.is_err());
                    prop_assert_eq!(r.len(), len);
                }
                prop_assert_eq!(r.positions.len(), r.len());
                for (index, pool) in r.iter().enumerate() {
                    prop_assert_eq!(r.index_of(pool.id), Some(index));
                }
            }
        }
    }
}
