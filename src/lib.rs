//! # Meridian DEX SDK
//!
//! A client-side SDK for Meridian AMM pools. It mirrors the on-chain
//! constant-product math bit for bit, derives slippage-protected
//! transaction parameters, and drives a submitted transaction to a
//! terminal outcome. The SDK never talks to a chain itself: state reads,
//! transaction submission and receipt lookups are capabilities the host
//! application provides through three small traits.
//!
//! ## 🚀 Quick Start
//!
//! ### Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! meridian-sdk = "0.2"
//! ```
//!
//! ### Basic Setup
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use meridian_sdk::{MeridianSDK, TokenAddress};
//!
//! // Collaborators implement PoolStateSource, TransactionSubmitter and
//! // ReceiptSource against your provider of choice.
//! let router = TokenAddress::new("0x7a250d5630b4cf539739df2c5dacb4c659f2488d")?;
//! let mut sdk = MeridianSDK::new(state_source, submitter, receipts, router);
//! ```
//!
//! ## 📖 Usage Patterns
//!
//! ### Quoting and swapping
//!
//! ```rust,ignore
//! use meridian_sdk::{Session, SlippageBound, SwapMode, ConfirmConfig, CancelToken};
//!
//! let usdc = TokenAddress::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")?;
//! let weth = TokenAddress::new("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")?;
//!
//! // Amounts enter as decimal strings and scale by the token's decimals.
//! let amount_in = meridian_sdk::scale_to_integer("1.5", 18)?;
//!
//! let quote = sdk.quote(&weth, &usdc, &amount_in).await?;
//! println!("expected out: {}", meridian_sdk::format_integer(&quote.out_amount, 6));
//!
//! // Slippage input is validated and clamped; safe mode lowers the ceiling.
//! let slippage = SlippageBound::resolve(Some("5"), true);
//!
//! let swap = sdk.swap_call(
//!     &session,
//!     &weth,
//!     &usdc,
//!     &quote,
//!     SwapMode::ExactIn,
//!     slippage,
//!     deadline,
//! )?;
//!
//! // Submit and poll until the outcome is known (or the retry budget runs
//! // out, which reports Unresolved rather than failing).
//! let cancel = CancelToken::new();
//! let outcome = sdk.execute(&swap.call, ConfirmConfig::default(), &cancel).await?;
//! println!("outcome: {:?}", outcome);
//! ```
//!
//! ### Liquidity
//!
//! ```rust,ignore
//! // Counter-amount for a deposit at the current reserve ratio.
//! let amount_b = sdk.deposit_counter_amount(&weth, &amount_a)?;
//!
//! // Both deposit amounts are bounded below - the contract may take less
//! // than desired, never less than the minimum.
//! let add = sdk.add_liquidity_call(&session, &weth, &usdc, &amount_a, &amount_b, slippage, deadline)?;
//!
//! // Withdrawals are priced against a fresh snapshot, including
//! // protocol-fee dilution, before the floors are derived.
//! let remove = sdk.remove_liquidity_call(&session, &weth, &usdc, &liquidity, slippage, deadline)?;
//! ```
//!
//! ## ⚠️ Reserve ordering
//!
//! Pools store reserves in sorted token order: the lexicographically
//! smaller address (compared case-insensitively) is token0. Mixing that
//! order up produces silently wrong quotes, so the SDK sorts on entry:
//! [`ReservePair`] pins each reserve to its token at construction and
//! every public operation accepts tokens in caller order.
//!
//! ## 🔧 Error handling
//!
//! Format and arithmetic errors ([`AmmError`]) are terminal for the call
//! that raised them and are never retried. Submission rejections surface
//! immediately. Only receipt polling retries, and when its budget runs out
//! the result is the distinct [`TransactionOutcome::Unresolved`]. The
//! hash is always carried so the user can check a block explorer.
//!
//! ## 📄 License
//!
//! MIT License - see LICENSE file for details.

mod amm; // Private module - users should use re-exported types
mod constants;
mod decimal;
mod error;
mod lifecycle;
mod math;
mod sdk;
mod slippage;
mod utils;

pub use sdk::{BoundedLiquidityCall, BoundedSwap, MeridianSDK, SwapBound};

// Re-export commonly used AMM types for easier access
pub use amm::{
    LiquiditySnapshot, PoolSnapshot, PoolStateSource, Quote, RawPoolState, ReservePair, Session,
    SessionEvent, SwapMode, TokenAddress,
};

pub use decimal::{format_integer, scale_to_integer};
pub use error::AmmError;
pub use lifecycle::{
    CancelToken, ConfirmConfig, LifecycleState, PreparedCall, Receipt, ReceiptSource,
    TransactionLifecycle, TransactionOutcome, TransactionSubmitter, TxHash,
};
pub use math::{
    amounts_on_remove, effective_total_supply, quote_amount_in, quote_amount_out,
    quote_counter_amount,
};
pub use slippage::SlippageBound;
pub use utils::{IntegerEncoding, needs_approval, parse_big_integer, to_hex_prefixed};

pub use constants::{
    CONFIRM_INITIAL_DELAY_MS, CONFIRM_MAX_RETRIES, CONFIRM_POLL_INTERVAL_MS, DEFAULT_SLIPPAGE,
    MIN_SLIPPAGE, SAFE_MODE_MAX_SLIPPAGE, SWAP_FEE_DENOMINATOR, SWAP_FEE_NUMERATOR,
    UNRESTRICTED_MAX_SLIPPAGE, swap_fee_percent,
};
