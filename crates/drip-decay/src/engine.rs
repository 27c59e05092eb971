//! Decay engine implementing the [`DecayCalculator`] trait.
//!
//! Applies a fixed basis-point reduction once per elapsed period, flooring
//! after every period. All arithmetic is checked 256-bit integer math.

use drip_core::constants::BPS_PRECISION;
use drip_core::error::DecayError;
use drip_core::traits::DecayCalculator;
use primitive_types::U256;
use tracing::trace;

/// Fraction of the rate kept per period, in basis points.
///
/// # Examples
///
/// ```
/// use drip_decay::retention_bp;
/// assert_eq!(retention_bp(100).unwrap(), 9_900);
/// assert!(retention_bp(10_001).is_err());
/// ```
pub fn retention_bp(percent_bp: u32) -> Result<u32, DecayError> {
    BPS_PRECISION
        .checked_sub(percent_bp)
        .ok_or(DecayError::InvalidPercent(percent_bp))
}

/// One period: `rate * retention / 10_000`, floored.
fn decay_once(rate: U256, retention: u32) -> Result<U256, DecayError> {
    Ok(rate
        .checked_mul(U256::from(retention))
        .ok_or(DecayError::ArithmeticOverflow)?
        / U256::from(BPS_PRECISION))
}

/// The production decay calculator.
///
/// Every period strictly lowers a non-zero rate (for `percent_bp > 0`), so
/// the loop ends once the rate reaches zero even when the period count is
/// huge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodicDecay;

impl PeriodicDecay {
    /// Create a new PeriodicDecay.
    pub fn new() -> Self {
        Self
    }
}

impl DecayCalculator for PeriodicDecay {
    fn decayed_rate(&self, rate: U256, percent_bp: u32, periods: u64) -> Result<U256, DecayError> {
        let retention = retention_bp(percent_bp)?;
        if periods == 0 || rate.is_zero() || retention == BPS_PRECISION {
            return Ok(rate);
        }
        if retention == 0 {
            return Ok(U256::zero());
        }

        let mut rate = rate;
        for applied in 1..=periods {
            rate = decay_once(rate, retention)?;
            if rate.is_zero() {
                trace!(applied, periods, "emission rate decayed to zero");
                break;
            }
        }
        Ok(rate)
    }
}
