//! Token amount parsing, formatting, and serde helpers.
//!
//! Amounts are 256-bit unsigned integers in token base units. They are
//! always written as decimal strings so JSON and TOML readers never
//! truncate them to a float or a 64-bit integer.

use primitive_types::U256;

use crate::constants::TOKEN_DECIMALS;
use crate::error::AmountError;

/// Largest power of ten representable in 256 bits.
const MAX_EXP10: u32 = 77;

/// Parse a decimal amount in base units.
///
/// Accepts plain digits, `_` separators, and an optional integer exponent
/// (`3e27`). Rejects signs, fractions, and values above `U256::MAX`.
///
/// # Examples
///
/// ```
/// use drip_core::amount::parse_amount;
/// use drip_core::U256;
/// assert_eq!(parse_amount("1_000").unwrap(), U256::from(1000u64));
/// assert_eq!(parse_amount("3e27").unwrap(), U256::from(3u64) * U256::exp10(27));
/// ```
pub fn parse_amount(s: &str) -> Result<U256, AmountError> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let (mantissa, exponent) = match cleaned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (cleaned.as_str(), None),
    };

    let mantissa = parse_digits(mantissa)?;
    let Some(exponent) = exponent else {
        return Ok(mantissa);
    };

    let exp: u32 = match parse_digits(exponent)? {
        e if e > U256::from(MAX_EXP10) => {
            return if mantissa.is_zero() {
                Ok(U256::zero())
            } else {
                Err(AmountError::Overflow)
            };
        }
        e => e.as_u32(),
    };
    mantissa
        .checked_mul(U256::exp10(exp as usize))
        .ok_or(AmountError::Overflow)
}

fn parse_digits(s: &str) -> Result<U256, AmountError> {
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }
    U256::from_dec_str(s).map_err(|_| AmountError::Overflow)
}

/// Render an amount in whole tokens with up to [`TOKEN_DECIMALS`] fractional
/// digits, trailing zeros trimmed.
///
/// # Examples
///
/// ```
/// use drip_core::amount::format_tokens;
/// use drip_core::constants::COIN;
/// use drip_core::U256;
/// assert_eq!(format_tokens(COIN * U256::from(3u64)), "3");
/// assert_eq!(format_tokens(COIN / U256::from(4u64)), "0.25");
/// ```
pub fn format_tokens(amount: U256) -> String {
    let unit = U256::exp10(TOKEN_DECIMALS as usize);
    let whole = amount / unit;
    let frac = amount % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Serde adapter writing a `U256` as a decimal string.
pub mod serde_decimal {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_amount(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<U256>` as an optional decimal string.
pub mod serde_decimal_opt {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<U256>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_amount(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Serde adapter for account → amount maps.
pub mod serde_decimal_map {
    use std::collections::BTreeMap;

    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::address::AccountId;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<AccountId, U256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let rendered: BTreeMap<&AccountId, String> =
            map.iter().map(|(k, v)| (k, v.to_string())).collect();
        rendered.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<AccountId, U256>, D::Error> {
        BTreeMap::<AccountId, String>::deserialize(deserializer)?
            .into_iter()
            .map(|(k, v)| {
                super::parse_amount(&v)
                    .map(|amount| (k, amount))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
