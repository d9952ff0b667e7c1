//! Constant-product pool arithmetic.
//!
//! Everything here is exact integer arithmetic on `BigUint`. A multiply
//! always happens before the divide it feeds, so no precision is lost to an
//! early truncation, and subtraction only occurs behind a guard that rules
//! out underflow.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::amm::LiquiditySnapshot;
use crate::constants::{FEE_DENOMINATOR, FEE_NUMERATOR};
use crate::error::AmmError;

/// Ceiling division: `(a + b - 1) / b`. The divisor must be non-zero.
pub(crate) fn ceil_div(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    (numerator + denominator - BigUint::one()) / denominator
}

/// Output amount for an exact-in swap against already-oriented reserves.
///
/// Two fee stages are applied: the router formula with the 996/1000 fee on
/// the input, then a flat 996/1000 haircut on the resulting quote. The
/// chain applies both stages when it quotes, so they are kept separate here
/// and must not be collapsed into one factor.
pub fn quote_amount_out(
    amount_in: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
) -> Result<BigUint, AmmError> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientReserves);
    }

    let amount_in_with_fee = amount_in * &*FEE_NUMERATOR;
    let numerator = &amount_in_with_fee * reserve_out;
    let denominator = reserve_in * &*FEE_DENOMINATOR + &amount_in_with_fee;
    let routed = numerator / denominator;

    Ok(routed * &*FEE_NUMERATOR / &*FEE_DENOMINATOR)
}

/// Input amount required for an exact-out swap against already-oriented
/// reserves.
///
/// The flat haircut stage is inverted first: the requested output is
/// grossed back up to the largest router-stage quote the haircut maps onto
/// it, and that target feeds the inverse router formula rounded up by one
/// unit. Both roundings lean toward a larger input so the pool is never
/// underpaid.
pub fn quote_amount_in(
    amount_out: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
) -> Result<BigUint, AmmError> {
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(AmmError::InsufficientReserves);
    }

    let target = ((amount_out + 1u32) * &*FEE_DENOMINATOR - 1u32) / &*FEE_NUMERATOR;
    if &target >= reserve_out {
        return Err(AmmError::InsufficientReserves);
    }

    let numerator = reserve_in * &target * &*FEE_DENOMINATOR;
    let denominator = (reserve_out - &target) * &*FEE_NUMERATOR;
    Ok(numerator / denominator + BigUint::one())
}

/// Counter-amount owed for a deposit at the current reserve ratio.
pub fn quote_counter_amount(
    amount: &BigUint,
    reserve_from: &BigUint,
    reserve_to: &BigUint,
) -> Result<BigUint, AmmError> {
    if reserve_from.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    Ok(amount * reserve_to / reserve_from)
}

/// LP supply to price a withdrawal against, after protocol-fee dilution.
///
/// When fee tracking is active (`k_last` non-zero) and the pool has grown
/// since the last fee mint (`rootK > rootKLast`), the protocol's fee share
/// is conceptually minted first and dilutes every withdrawer:
/// `feeLiquidity = totalSupply * (rootK - rootKLast) / (rootK * 5 + rootKLast)`.
/// An exact tie between the two roots mints nothing.
pub fn effective_total_supply(
    total_supply: &BigUint,
    k_last: &BigUint,
    reserve0: &BigUint,
    reserve1: &BigUint,
) -> BigUint {
    if k_last.is_zero() {
        return total_supply.clone();
    }

    let root_k = (reserve0 * reserve1).sqrt();
    let root_k_last = k_last.sqrt();
    if root_k > root_k_last {
        let fee_liquidity =
            total_supply * (&root_k - &root_k_last) / (&root_k * 5u32 + &root_k_last);
        total_supply + fee_liquidity
    } else {
        total_supply.clone()
    }
}

/// Token amounts released when burning `liquidity` LP tokens, in sorted
/// (token0, token1) order.
///
/// Shares are priced against the pool's actual token balances rather than
/// its tracked reserves; the two differ when a transfer landed without a
/// sync, and the surplus belongs to LP holders.
pub fn amounts_on_remove(
    liquidity: &BigUint,
    snapshot: &LiquiditySnapshot,
) -> Result<(BigUint, BigUint), AmmError> {
    let effective_supply = effective_total_supply(
        &snapshot.total_supply,
        &snapshot.k_last,
        &snapshot.reserve0,
        &snapshot.reserve1,
    );
    if effective_supply.is_zero() {
        return Err(AmmError::DivisionByZero);
    }

    let amount0 = liquidity * &snapshot.balance0 / &effective_supply;
    let amount1 = liquidity * &snapshot.balance1 / &effective_supply;
    Ok((amount0, amount1))
}
