//! Single-admin access control.
//!
//! Every mutating registry or configuration operation starts with
//! [`AccessControl::ensure_admin`]. There is no role hierarchy and no
//! two-step handoff.

use drip_core::address::AccountId;
use drip_core::error::MinterError;

/// Holder of the admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessControl {
    admin: AccountId,
}

impl AccessControl {
    /// # Errors
    ///
    /// [`MinterError::ZeroAddress`] if `admin` is the zero account.
    pub fn new(admin: AccountId) -> Result<Self, MinterError> {
        if admin.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        Ok(Self { admin })
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// Fail with [`MinterError::NotAuthorized`] unless `caller` is the admin.
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<(), MinterError> {
        if *caller != self.admin {
            return Err(MinterError::NotAuthorized { caller: *caller });
        }
        Ok(())
    }

    /// Replace the admin. Returns the previous admin.
    pub fn transfer(&mut self, caller: &AccountId, new_admin: AccountId) -> Result<AccountId, MinterError> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.admin, new_admin))
    }
}
