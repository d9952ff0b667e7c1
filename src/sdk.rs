use std::sync::Arc;

use anyhow::{Context, Result, bail};
use num_bigint::BigUint;

use crate::amm::{
    PoolSnapshot, PoolStateSource, Quote, Session, SessionEvent, SwapMode, TokenAddress,
};
use crate::constants::{
    FEE_DENOMINATOR, FEE_NUMERATOR, SELECTOR_ADD_LIQUIDITY, SELECTOR_REMOVE_LIQUIDITY,
    SELECTOR_SWAP_EXACT_TOKENS_FOR_TOKENS, SELECTOR_SWAP_TOKENS_FOR_EXACT_TOKENS,
    swap_fee_percent,
};
use crate::error::AmmError;
use crate::lifecycle::{
    CancelToken, ConfirmConfig, PreparedCall, ReceiptSource, TransactionLifecycle,
    TransactionOutcome, TransactionSubmitter,
};
use crate::math;
use crate::slippage::SlippageBound;
use crate::utils::{abi_word_bytes20, abi_word_uint};

/// A swap call plus the slippage bound baked into its calldata.
#[derive(Debug, Clone)]
pub struct BoundedSwap {
    pub call: PreparedCall,
    pub bound: SwapBound,
}

/// The protective bound of a swap: a floor on what the user receives for
/// exact-in, a cap on what the user pays for exact-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapBound {
    MinimumOut(BigUint),
    MaximumIn(BigUint),
}

/// A liquidity call plus its amounts in the caller's token order.
///
/// For add-liquidity `amount_a`/`amount_b` are the desired deposits, for
/// remove-liquidity the expected withdrawals; the minimums are the floors
/// encoded into the call. Deposits and withdrawals are both bounded below,
/// never above.
#[derive(Debug, Clone)]
pub struct BoundedLiquidityCall {
    pub call: PreparedCall,
    pub amount_a: BigUint,
    pub min_amount_a: BigUint,
    pub amount_b: BigUint,
    pub min_amount_b: BigUint,
}

pub struct MeridianSDK {
    state_source: Arc<dyn PoolStateSource>,
    submitter: Arc<dyn TransactionSubmitter>,
    receipts: Arc<dyn ReceiptSource>,
    router: TokenAddress,
    pool: Option<PoolSnapshot>,
}

impl MeridianSDK {
    /// Create a new Meridian SDK instance.
    ///
    /// # Arguments
    /// * `state_source` - Collaborator that reads raw pool state
    /// * `submitter` - Collaborator that submits encoded transactions
    /// * `receipts` - Collaborator that looks up transaction receipts
    /// * `router` - Address the encoded calls are sent to
    pub fn new(
        state_source: Arc<dyn PoolStateSource>,
        submitter: Arc<dyn TransactionSubmitter>,
        receipts: Arc<dyn ReceiptSource>,
        router: TokenAddress,
    ) -> Self {
        Self {
            state_source,
            submitter,
            receipts,
            router,
            pool: None,
        }
    }

    /// Load pool state for a token pair.
    ///
    /// # Arguments
    /// * `token_a` - The first token address, in any order
    /// * `token_b` - The second token address, in any order
    ///
    /// # Returns
    /// Returns the sorted `(token0, token1)` pair the pool is keyed by.
    pub async fn load_pool(
        &mut self,
        token_a: &TokenAddress,
        token_b: &TokenAddress,
    ) -> Result<(TokenAddress, TokenAddress)> {
        let (token0, token1) = TokenAddress::sort(token_a.clone(), token_b.clone());

        let raw = self
            .state_source
            .fetch_pool_state(&token0, &token1)
            .await
            .context("failed to fetch pool state")?;
        let snapshot = raw.parse()?;

        if snapshot.pair().token0() != &token0 || snapshot.pair().token1() != &token1 {
            bail!("fetched pool state does not describe pair {token0}/{token1}");
        }

        self.pool = Some(snapshot);
        Ok((token0, token1))
    }

    /// Re-fetch state for the loaded pool.
    ///
    /// Reserves change every block; every quoting operation refreshes so it
    /// prices against a snapshot no older than the operation itself.
    pub async fn refresh_pool(&mut self) -> Result<()> {
        let (token0, token1) = match &self.pool {
            Some(pool) => (
                pool.pair().token0().clone(),
                pool.pair().token1().clone(),
            ),
            None => bail!("no pool loaded"),
        };
        self.load_pool(&token0, &token1).await?;
        Ok(())
    }

    /// Get a quote for an exact-in swap.
    ///
    /// # Arguments
    /// * `token_in` - The input token address
    /// * `token_out` - The output token address
    /// * `amount_in` - The amount of input tokens, in smallest units
    ///
    /// # Returns
    /// Returns a `Quote` with the expected output amount after both fee
    /// stages.
    pub async fn quote(
        &mut self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
        amount_in: &BigUint,
    ) -> Result<Quote> {
        let pool = self.ensure_pool(token_in, token_out).await?;
        let (reserve_in, reserve_out) = pool.pair().oriented(token_in)?;

        let out_amount = math::quote_amount_out(amount_in, reserve_in, reserve_out)?;
        let fee_amount = amount_in - amount_in * &*FEE_NUMERATOR / &*FEE_DENOMINATOR;

        Ok(Quote {
            in_amount: amount_in.clone(),
            out_amount,
            fee_amount,
            fee_pct: swap_fee_percent(),
        })
    }

    /// Get a quote for an exact-out swap.
    ///
    /// # Arguments
    /// * `token_in` - The input token address
    /// * `token_out` - The output token address
    /// * `amount_out` - The desired amount of output tokens, in smallest units
    ///
    /// # Returns
    /// Returns a `Quote` whose `in_amount` is sufficient to buy
    /// `amount_out`; rounding always leans toward a larger input.
    pub async fn quote_exact_out(
        &mut self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
        amount_out: &BigUint,
    ) -> Result<Quote> {
        let pool = self.ensure_pool(token_in, token_out).await?;
        let (reserve_in, reserve_out) = pool.pair().oriented(token_in)?;

        let in_amount = math::quote_amount_in(amount_out, reserve_in, reserve_out)?;
        let fee_amount = &in_amount - &in_amount * &*FEE_NUMERATOR / &*FEE_DENOMINATOR;

        Ok(Quote {
            in_amount,
            out_amount: amount_out.clone(),
            fee_amount,
            fee_pct: swap_fee_percent(),
        })
    }

    /// Build a slippage-bounded swap call from a quote.
    ///
    /// # Arguments
    /// * `session` - The wallet session receiving the swap output
    /// * `token_in` / `token_out` - The pair being traded, caller order
    /// * `quote` - A quote produced against the currently loaded pool
    /// * `mode` - Exact-in bounds the output below, exact-out caps the input
    /// * `slippage` - Validated slippage tolerance
    /// * `deadline` - Unix timestamp after which the router rejects the call
    pub fn swap_call(
        &self,
        session: &Session,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
        quote: &Quote,
        mode: SwapMode,
        slippage: SlippageBound,
        deadline: u64,
    ) -> Result<BoundedSwap> {
        let pool = self.pool.as_ref().context("no pool loaded")?;
        self.check_pair(pool, token_in, token_out)?;

        let (data, bound) = match mode {
            SwapMode::ExactIn => {
                let min_out = slippage.min_acceptable(&quote.out_amount);
                let data = encode_swap(
                    SELECTOR_SWAP_EXACT_TOKENS_FOR_TOKENS,
                    &quote.in_amount,
                    &min_out,
                    [token_in, token_out],
                    &session.account,
                    deadline,
                )?;
                (data, SwapBound::MinimumOut(min_out))
            }
            SwapMode::ExactOut => {
                let max_in = slippage.max_acceptable(&quote.in_amount);
                let data = encode_swap(
                    SELECTOR_SWAP_TOKENS_FOR_EXACT_TOKENS,
                    &quote.out_amount,
                    &max_in,
                    [token_in, token_out],
                    &session.account,
                    deadline,
                )?;
                (data, SwapBound::MaximumIn(max_in))
            }
        };

        Ok(BoundedSwap {
            call: PreparedCall {
                to: self.router.clone(),
                data,
                value: None,
            },
            bound,
        })
    }

    /// Counter-amount required for a deposit of `amount` of `token` at the
    /// loaded pool's reserve ratio.
    pub fn deposit_counter_amount(
        &self,
        token: &TokenAddress,
        amount: &BigUint,
    ) -> Result<BigUint> {
        let pool = self.pool.as_ref().context("no pool loaded")?;
        let (reserve_from, reserve_to) = pool.pair().oriented(token)?;
        Ok(math::quote_counter_amount(amount, reserve_from, reserve_to)?)
    }

    /// Build an add-liquidity call.
    ///
    /// Both desired amounts are bounded below; the contract may take less
    /// than desired but never less than the minimum.
    ///
    /// # Arguments
    /// * `session` - The wallet session receiving the LP tokens
    /// * `token_a` / `token_b` - The pair, caller order
    /// * `amount_a_desired` / `amount_b_desired` - Deposits, caller order
    /// * `slippage` - Validated slippage tolerance
    /// * `deadline` - Unix timestamp after which the router rejects the call
    pub fn add_liquidity_call(
        &self,
        session: &Session,
        token_a: &TokenAddress,
        token_b: &TokenAddress,
        amount_a_desired: &BigUint,
        amount_b_desired: &BigUint,
        slippage: SlippageBound,
        deadline: u64,
    ) -> Result<BoundedLiquidityCall> {
        let pool = self.pool.as_ref().context("no pool loaded")?;
        self.check_pair(pool, token_a, token_b)?;

        let min_amount_a = slippage.min_acceptable(amount_a_desired);
        let min_amount_b = slippage.min_acceptable(amount_b_desired);

        let mut data = SELECTOR_ADD_LIQUIDITY.to_vec();
        data.extend_from_slice(&abi_word_bytes20(&token_a.to_bytes()));
        data.extend_from_slice(&abi_word_bytes20(&token_b.to_bytes()));
        data.extend_from_slice(&abi_word_uint(amount_a_desired)?);
        data.extend_from_slice(&abi_word_uint(amount_b_desired)?);
        data.extend_from_slice(&abi_word_uint(&min_amount_a)?);
        data.extend_from_slice(&abi_word_uint(&min_amount_b)?);
        data.extend_from_slice(&abi_word_bytes20(&session.account.to_bytes()));
        data.extend_from_slice(&abi_word_uint(&BigUint::from(deadline))?);

        Ok(BoundedLiquidityCall {
            call: PreparedCall {
                to: self.router.clone(),
                data,
                value: None,
            },
            amount_a: amount_a_desired.clone(),
            min_amount_a,
            amount_b: amount_b_desired.clone(),
            min_amount_b,
        })
    }

    /// Build a remove-liquidity call for burning `liquidity` LP tokens.
    ///
    /// The expected withdrawal is priced against a fresh snapshot,
    /// including protocol-fee dilution, then attributed back to the
    /// caller's token order before the lower bounds are derived.
    ///
    /// # Arguments
    /// * `session` - The wallet session receiving the withdrawn tokens
    /// * `token_a` / `token_b` - The pair, caller order
    /// * `liquidity` - LP token amount to burn
    /// * `slippage` - Validated slippage tolerance
    /// * `deadline` - Unix timestamp after which the router rejects the call
    pub fn remove_liquidity_call(
        &self,
        session: &Session,
        token_a: &TokenAddress,
        token_b: &TokenAddress,
        liquidity: &BigUint,
        slippage: SlippageBound,
        deadline: u64,
    ) -> Result<BoundedLiquidityCall> {
        let pool = self.pool.as_ref().context("no pool loaded")?;
        self.check_pair(pool, token_a, token_b)?;

        let snapshot = pool.liquidity_snapshot();
        let (amount0, amount1) = math::amounts_on_remove(liquidity, &snapshot)?;

        // internal math runs in sorted order; hand the amounts back in the
        // caller's order
        let (amount_a, amount_b) = if token_a == pool.pair().token0() {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };

        let min_amount_a = slippage.min_acceptable(&amount_a);
        let min_amount_b = slippage.min_acceptable(&amount_b);

        let mut data = SELECTOR_REMOVE_LIQUIDITY.to_vec();
        data.extend_from_slice(&abi_word_bytes20(&token_a.to_bytes()));
        data.extend_from_slice(&abi_word_bytes20(&token_b.to_bytes()));
        data.extend_from_slice(&abi_word_uint(liquidity)?);
        data.extend_from_slice(&abi_word_uint(&min_amount_a)?);
        data.extend_from_slice(&abi_word_uint(&min_amount_b)?);
        data.extend_from_slice(&abi_word_bytes20(&session.account.to_bytes()));
        data.extend_from_slice(&abi_word_uint(&BigUint::from(deadline))?);

        Ok(BoundedLiquidityCall {
            call: PreparedCall {
                to: self.router.clone(),
                data,
                value: None,
            },
            amount_a,
            min_amount_a,
            amount_b,
            min_amount_b,
        })
    }

    /// Submit a prepared call and poll for its outcome.
    ///
    /// # Returns
    /// Returns the terminal `TransactionOutcome`; a submission-level
    /// rejection surfaces as an error instead, with no transaction hash.
    pub async fn execute(
        &self,
        call: &PreparedCall,
        config: ConfirmConfig,
        cancel: &CancelToken,
    ) -> Result<TransactionOutcome> {
        let mut lifecycle =
            TransactionLifecycle::new(self.submitter.clone(), self.receipts.clone());
        Ok(lifecycle.execute(call, config, cancel).await?)
    }

    /// React to a wallet/chain change delivered by the host application.
    ///
    /// The cached pool snapshot is dropped so the next operation reloads
    /// fresh state; nothing is re-entered or re-fetched here.
    pub fn on_session_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::AccountChanged(account) => {
                log::debug!("account changed to {account}; dropping cached pool state");
            }
            SessionEvent::ChainChanged(chain_id) => {
                log::debug!("chain changed to {chain_id}; dropping cached pool state");
            }
        }
        self.pool = None;
    }

    async fn ensure_pool(
        &mut self,
        token_a: &TokenAddress,
        token_b: &TokenAddress,
    ) -> Result<&PoolSnapshot> {
        let (token0, token1) = TokenAddress::sort(token_a.clone(), token_b.clone());
        let cached = self
            .pool
            .as_ref()
            .is_some_and(|p| p.pair().token0() == &token0 && p.pair().token1() == &token1);

        if cached {
            self.refresh_pool().await?;
        } else {
            self.load_pool(token_a, token_b).await?;
        }
        self.pool.as_ref().context("pool state missing after load")
    }

    fn check_pair(
        &self,
        pool: &PoolSnapshot,
        token_a: &TokenAddress,
        token_b: &TokenAddress,
    ) -> Result<()> {
        if token_a == token_b || !pool.pair().contains(token_a) || !pool.pair().contains(token_b) {
            bail!("tokens {token_a}/{token_b} do not match the loaded pool");
        }
        Ok(())
    }
}

/// Calldata for the two swap router entry points: two amount words, the
/// path tail offset, recipient and deadline, then the two-hop path.
fn encode_swap(
    selector: [u8; 4],
    amount_first: &BigUint,
    amount_second: &BigUint,
    path: [&TokenAddress; 2],
    recipient: &TokenAddress,
    deadline: u64,
) -> Result<Vec<u8>, AmmError> {
    let mut data = selector.to_vec();
    data.extend_from_slice(&abi_word_uint(amount_first)?);
    data.extend_from_slice(&abi_word_uint(amount_second)?);
    // offset of the dynamic path array: five head words
    data.extend_from_slice(&abi_word_uint(&BigUint::from(160u32))?);
    data.extend_from_slice(&abi_word_bytes20(&recipient.to_bytes()));
    data.extend_from_slice(&abi_word_uint(&BigUint::from(deadline))?);
    data.extend_from_slice(&abi_word_uint(&BigUint::from(path.len()))?);
    for token in path {
        data.extend_from_slice(&abi_word_bytes20(&token.to_bytes()));
    }
    Ok(data)
}
