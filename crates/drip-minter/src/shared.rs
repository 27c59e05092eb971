//! Thread-safe minter handle.
//!
//! [`SharedMinter`] serializes every call through one `parking_lot::Mutex`,
//! so concurrent `mint` calls in the same block pay out exactly once.

use std::sync::Arc;

use drip_core::error::MinterError;
use drip_core::traits::{BlockClock, Ledger};
use drip_core::types::{EmissionUpdate, MintReceipt};
use parking_lot::Mutex;

use crate::minter::Minter;
use crate::snapshot::MinterSnapshot;

/// Cloneable, mutex-guarded [`Minter`].
pub struct SharedMinter<L, C> {
    inner: Arc<Mutex<Minter<L, C>>>,
}

impl<L, C> Clone for SharedMinter<L, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Ledger, C: BlockClock> SharedMinter<L, C> {
    pub fn new(minter: Minter<L, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(minter)),
        }
    }

    pub fn mint(&self) -> Result<MintReceipt, MinterError> {
        self.inner.lock().mint()
    }

    pub fn update_emissions(&self, index: usize) -> Result<Option<EmissionUpdate>, MinterError> {
        self.inner.lock().update_emissions(index)
    }

    pub fn update_all_emissions(&self) -> Result<Vec<EmissionUpdate>, MinterError> {
        self.inner.lock().update_all_emissions()
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Minter<L, C>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn snapshot(&self) -> MinterSnapshot {
        self.inner.lock().snapshot()
    }
}
