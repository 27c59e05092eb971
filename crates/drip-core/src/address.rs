//! Account identifiers.
//!
//! An [`AccountId`] is a 20-byte identifier rendered as `0x`-prefixed hex
//! (`0x` followed by 40 hex digits). Parsing accepts either case; rendering
//! is always lowercase.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::ACCOUNT_ID_LEN;
use crate::error::AccountError;

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub [u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The null account. Never valid as an admin or pool receiver.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ID_LEN]);

    /// Create an account id from raw bytes.
    pub fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// An account id with every byte set to `byte`.
    ///
    /// # Examples
    ///
    /// ```
    /// use drip_core::address::AccountId;
    /// let a = AccountId::repeat_byte(0x11);
    /// assert_eq!(a.to_string(), format!("0x{}", "11".repeat(20)));
    /// ```
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; ACCOUNT_ID_LEN])
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Check if this is the null account.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ACCOUNT_ID_LEN]
    }

    /// Encode as `0x`-prefixed lowercase hex.
    pub fn encode(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Decode from `0x`-prefixed hex.
    pub fn decode(s: &str) -> Result<Self, AccountError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AccountError::MissingPrefix)?;
        if digits.len() != ACCOUNT_ID_LEN * 2 {
            return Err(AccountError::InvalidLength(digits.len()));
        }
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| AccountError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.encode())
    }
}

impl From<[u8; ACCOUNT_ID_LEN]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for AccountId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
