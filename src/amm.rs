use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use num_bigint::BigUint;
use rust_decimal::Decimal;

use crate::error::AmmError;
use crate::utils::{IntegerEncoding, parse_big_integer};

/// An EVM-style token address, normalized to lowercase.
///
/// The derived ordering on the normalized form is the case-insensitive
/// lexicographic order that decides which token a pool stores as token0.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAddress(String);

impl TokenAddress {
    pub fn new(raw: &str) -> Result<Self, AmmError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"));
        match digits {
            Some(h) if h.len() == 40 && h.bytes().all(|b| b.is_ascii_hexdigit()) => {
                Ok(Self(format!("0x{}", h.to_ascii_lowercase())))
            }
            _ => Err(AmmError::InvalidFormat(format!("not a token address: {raw}"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20-byte form, used when encoding call data.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        hex::decode_to_slice(&self.0[2..], &mut out).expect("address is validated hex");
        out
    }

    /// Canonical pool ordering: the smaller address is token0.
    pub fn sort(a: Self, b: Self) -> (Self, Self) {
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reserves bound to a sorted token pair.
///
/// `reserve0` always belongs to token0, the smaller address. The
/// constructor takes tokens and reserves in caller order and performs the
/// sort and the reserve swap in one motion, so a mismatched pairing cannot
/// be introduced afterwards.
#[derive(Debug, Clone)]
pub struct ReservePair {
    token0: TokenAddress,
    token1: TokenAddress,
    reserve0: BigUint,
    reserve1: BigUint,
}

impl ReservePair {
    pub fn new(
        token_a: TokenAddress,
        reserve_a: BigUint,
        token_b: TokenAddress,
        reserve_b: BigUint,
    ) -> Self {
        if token_a <= token_b {
            Self {
                token0: token_a,
                token1: token_b,
                reserve0: reserve_a,
                reserve1: reserve_b,
            }
        } else {
            Self {
                token0: token_b,
                token1: token_a,
                reserve0: reserve_b,
                reserve1: reserve_a,
            }
        }
    }

    pub fn token0(&self) -> &TokenAddress {
        &self.token0
    }

    pub fn token1(&self) -> &TokenAddress {
        &self.token1
    }

    pub fn reserve0(&self) -> &BigUint {
        &self.reserve0
    }

    pub fn reserve1(&self) -> &BigUint {
        &self.reserve1
    }

    pub fn contains(&self, token: &TokenAddress) -> bool {
        token == &self.token0 || token == &self.token1
    }

    /// Reserves oriented for a swap out of `token_in`, as
    /// `(reserve_in, reserve_out)`.
    pub fn oriented(&self, token_in: &TokenAddress) -> Result<(&BigUint, &BigUint), AmmError> {
        if token_in == &self.token0 {
            Ok((&self.reserve0, &self.reserve1))
        } else if token_in == &self.token1 {
            Ok((&self.reserve1, &self.reserve0))
        } else {
            Err(AmmError::InvalidFormat(format!(
                "token {token_in} is not part of this pair"
            )))
        }
    }
}

/// One remove-liquidity pricing snapshot, in sorted (token0, token1) order.
///
/// Reserves change every block, so a snapshot is read fresh before each
/// quote and never reused across operations. Balances may exceed reserves
/// when a transfer landed without a sync.
#[derive(Debug, Clone)]
pub struct LiquiditySnapshot {
    pub total_supply: BigUint,
    pub k_last: BigUint,
    pub reserve0: BigUint,
    pub reserve1: BigUint,
    pub balance0: BigUint,
    pub balance1: BigUint,
}

/// Over-the-wire pool state, before parsing.
///
/// Every quantity arrives as an opaque string in caller (`a`, `b`) token
/// order; `encoding` declares how all of them are encoded.
#[derive(Debug, Clone)]
pub struct RawPoolState {
    pub token_a: String,
    pub token_b: String,
    pub reserve_a: String,
    pub reserve_b: String,
    pub balance_a: String,
    pub balance_b: String,
    pub total_supply: String,
    pub k_last: String,
    pub encoding: IntegerEncoding,
}

impl RawPoolState {
    /// Parse and sort into a [`PoolSnapshot`].
    pub fn parse(&self) -> Result<PoolSnapshot, AmmError> {
        let token_a = TokenAddress::new(&self.token_a)?;
        let token_b = TokenAddress::new(&self.token_b)?;
        if token_a == token_b {
            return Err(AmmError::InvalidFormat(format!(
                "pool tokens must differ: {token_a}"
            )));
        }

        let reserve_a = parse_big_integer(&self.reserve_a, self.encoding)?;
        let reserve_b = parse_big_integer(&self.reserve_b, self.encoding)?;
        let balance_a = parse_big_integer(&self.balance_a, self.encoding)?;
        let balance_b = parse_big_integer(&self.balance_b, self.encoding)?;
        let total_supply = parse_big_integer(&self.total_supply, self.encoding)?;
        let k_last = parse_big_integer(&self.k_last, self.encoding)?;

        let a_is_token0 = token_a <= token_b;
        let pair = ReservePair::new(token_a, reserve_a, token_b, reserve_b);
        let (balance0, balance1) = if a_is_token0 {
            (balance_a, balance_b)
        } else {
            (balance_b, balance_a)
        };

        Ok(PoolSnapshot {
            pair,
            balance0,
            balance1,
            total_supply,
            k_last,
        })
    }
}

/// Parsed pool state for one quoting operation.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub(crate) pair: ReservePair,
    pub(crate) balance0: BigUint,
    pub(crate) balance1: BigUint,
    pub(crate) total_supply: BigUint,
    pub(crate) k_last: BigUint,
}

impl PoolSnapshot {
    pub fn pair(&self) -> &ReservePair {
        &self.pair
    }

    pub fn liquidity_snapshot(&self) -> LiquiditySnapshot {
        LiquiditySnapshot {
            total_supply: self.total_supply.clone(),
            k_last: self.k_last.clone(),
            reserve0: self.pair.reserve0.clone(),
            reserve1: self.pair.reserve1.clone(),
            balance0: self.balance0.clone(),
            balance1: self.balance1.clone(),
        }
    }
}

/// Swap mode (exact in/out)
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum SwapMode {
    ExactIn,
    ExactOut,
}

/// Quote result
#[derive(Debug, Clone)]
pub struct Quote {
    pub in_amount: BigUint,
    pub out_amount: BigUint,
    pub fee_amount: BigUint,
    pub fee_pct: Decimal,
}

/// One wallet session, passed explicitly into every operation that encodes
/// a transaction. There is no ambient global session.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: TokenAddress,
    pub chain_id: u64,
}

/// Discrete wallet/chain change events delivered by the host application.
///
/// The core reacts by dropping its cached pool snapshot; it never calls
/// back into the host.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    AccountChanged(TokenAddress),
    ChainChanged(u64),
}

/// Reads raw pool state for a sorted token pair from the chain.
#[async_trait]
pub trait PoolStateSource: Send + Sync {
    async fn fetch_pool_state(
        &self,
        token0: &TokenAddress,
        token1: &TokenAddress,
    ) -> Result<RawPoolState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_normalize_and_order_case_insensitively() {
        let upper = TokenAddress::new("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
        let lower = TokenAddress::new("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert_eq!(upper, lower);

        let b = TokenAddress::new("0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB").unwrap();
        let (token0, token1) = TokenAddress::sort(b.clone(), upper.clone());
        assert_eq!(token0, upper);
        assert_eq!(token1, b);
    }

    #[test]
    fn reserve_pair_swaps_reserves_with_the_tokens() {
        let a = TokenAddress::new("0x00000000000000000000000000000000000000bb").unwrap();
        let b = TokenAddress::new("0x00000000000000000000000000000000000000aa").unwrap();
        // caller order (a=bb, b=aa) is reversed by the sort
        let pair = ReservePair::new(a.clone(), BigUint::from(7u32), b.clone(), BigUint::from(9u32));
        assert_eq!(pair.token0(), &b);
        assert_eq!(pair.reserve0(), &BigUint::from(9u32));
        assert_eq!(pair.reserve1(), &BigUint::from(7u32));

        let (reserve_in, reserve_out) = pair.oriented(&a).unwrap();
        assert_eq!(reserve_in, &BigUint::from(7u32));
        assert_eq!(reserve_out, &BigUint::from(9u32));
    }
}
