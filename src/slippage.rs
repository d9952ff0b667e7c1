//! Slippage-bound derivation for swap and liquidity transactions.
//!
//! Reserves keep moving between quote time and execution time; the bounds
//! computed here are what makes that race survivable. Amounts the user
//! receives or deposits are bounded below, the amount the user pays on an
//! exact-out swap is bounded above.

use num_bigint::BigUint;

use crate::constants::{
    DEFAULT_SLIPPAGE, HUNDRED, MIN_SLIPPAGE, SAFE_MODE_MAX_SLIPPAGE, UNRESTRICTED_MAX_SLIPPAGE,
};
use crate::math::ceil_div;

/// A validated slippage tolerance in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlippageBound {
    percent: u32,
}

impl SlippageBound {
    /// Validate a raw user-supplied tolerance.
    ///
    /// Missing, non-numeric or non-positive input resets to the default;
    /// anything above the active ceiling clamps to that ceiling. Safe mode
    /// lowers the ceiling.
    pub fn resolve(raw: Option<&str>, safe_mode: bool) -> Self {
        let ceiling = if safe_mode {
            SAFE_MODE_MAX_SLIPPAGE
        } else {
            UNRESTRICTED_MAX_SLIPPAGE
        };
        let parsed = raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);
        let percent = if parsed <= 0 {
            DEFAULT_SLIPPAGE
        } else {
            (parsed.min(ceiling as i64) as u32).max(MIN_SLIPPAGE)
        };
        Self { percent }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Lower bound for an amount the user receives, removes or deposits:
    /// `floor(amount * (100 - s) / 100)`.
    pub fn min_acceptable(&self, amount: &BigUint) -> BigUint {
        amount * (100 - self.percent) / &*HUNDRED
    }

    /// Upper bound for an amount the user pays when the counter-amount is
    /// fixed: `ceil(amount * (100 + s) / 100)`.
    pub fn max_acceptable(&self, amount: &BigUint) -> BigUint {
        ceil_div(&(amount * (100 + self.percent)), &HUNDRED)
    }
}
