//! Transaction submission and receipt polling.
//!
//! Submission and receipt lookup are capabilities provided by the host
//! wallet/provider; this module owns only the state machine around them:
//! `Prepared -> Submitted -> {Confirmed, Failed, Unresolved}`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use num_bigint::BigUint;
use tokio::time::{Duration, sleep};

use crate::amm::TokenAddress;
use crate::constants::{CONFIRM_INITIAL_DELAY_MS, CONFIRM_MAX_RETRIES, CONFIRM_POLL_INTERVAL_MS};
use crate::error::AmmError;
use crate::utils::to_hex_prefixed;

/// Transaction identifier returned by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-chain inclusion record for a submitted transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// On-chain execution status flag: `true` means the call succeeded.
    pub status: bool,
    pub block_number: Option<u64>,
}

/// An encoded contract call ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedCall {
    pub to: TokenAddress,
    pub data: Vec<u8>,
    /// Native-currency value to attach, when the call carries one.
    pub value: Option<BigUint>,
}

impl PreparedCall {
    /// Calldata in `0x`-prefixed hexadecimal.
    pub fn data_hex(&self) -> String {
        to_hex_prefixed(&self.data)
    }

    /// Native value in hexadecimal, when present.
    pub fn value_hex(&self) -> Option<String> {
        self.value.as_ref().map(|v| format!("0x{v:x}"))
    }
}

/// Submits an encoded call through the host wallet/provider.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, call: &PreparedCall) -> Result<TxHash>;
}

/// Looks up the receipt for a submitted transaction; `Ok(None)` while the
/// transaction is still pending or unknown to the node.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>>;
}

/// Polling schedule for [`TransactionLifecycle::confirm`].
#[derive(Debug, Clone, Copy)]
pub struct ConfirmConfig {
    pub initial_delay: Duration,
    pub poll_interval: Duration,
    pub max_retries: u32,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(CONFIRM_INITIAL_DELAY_MS),
            poll_interval: Duration::from_millis(CONFIRM_POLL_INTERVAL_MS),
            max_retries: CONFIRM_MAX_RETRIES,
        }
    }
}

/// Cooperative cancellation flag, checked before each wait step.
///
/// Cancelling stops further polling; it cannot affect state already issued
/// on chain.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal result of one transaction lifecycle.
///
/// Every variant carries the transaction hash so the user can verify the
/// transaction independently on a block explorer. `Unresolved` means the
/// retry budget ran out before a receipt appeared, a reported condition
/// rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed { tx_hash: TxHash },
    Failed { tx_hash: TxHash },
    Unresolved { tx_hash: TxHash },
}

impl TransactionOutcome {
    pub fn tx_hash(&self) -> &TxHash {
        match self {
            Self::Confirmed { tx_hash } | Self::Failed { tx_hash } | Self::Unresolved { tx_hash } => {
                tx_hash
            }
        }
    }
}

/// Lifecycle states for one in-flight transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Prepared,
    Submitted,
    Terminal,
}

/// Drives one transaction from submission to a terminal outcome.
///
/// One instance owns the state machine for one in-flight transaction, and
/// its polling loop is strictly sequential, so overlapping receipt lookups
/// for the same hash cannot happen.
pub struct TransactionLifecycle {
    submitter: Arc<dyn TransactionSubmitter>,
    receipts: Arc<dyn ReceiptSource>,
    state: LifecycleState,
}

impl TransactionLifecycle {
    pub fn new(submitter: Arc<dyn TransactionSubmitter>, receipts: Arc<dyn ReceiptSource>) -> Self {
        Self {
            submitter,
            receipts,
            state: LifecycleState::Prepared,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Submit a prepared call.
    ///
    /// A collaborator rejection is terminal: it is surfaced immediately as
    /// [`AmmError::SubmissionFailed`] and never retried, and no transaction
    /// hash exists in that case.
    pub async fn submit(&mut self, call: &PreparedCall) -> Result<TxHash, AmmError> {
        match self.submitter.submit(call).await {
            Ok(tx_hash) => {
                log::debug!("transaction submitted: {tx_hash}");
                self.state = LifecycleState::Submitted;
                Ok(tx_hash)
            }
            Err(e) => {
                self.state = LifecycleState::Terminal;
                Err(AmmError::SubmissionFailed(e.to_string()))
            }
        }
    }

    /// Poll for the receipt under a bounded retry schedule.
    ///
    /// Waits `initial_delay` before the first lookup, then makes one
    /// attempt plus `max_retries` further attempts spaced `poll_interval`
    /// apart. A missing receipt and a provider error both consume one
    /// attempt. When the budget runs out the outcome is `Unresolved`;
    /// otherwise the receipt's status flag decides `Confirmed` vs `Failed`.
    pub async fn confirm(
        &mut self,
        tx_hash: TxHash,
        config: ConfirmConfig,
        cancel: &CancelToken,
    ) -> TransactionOutcome {
        let attempts = config.max_retries + 1;

        if cancel.is_cancelled() {
            self.state = LifecycleState::Terminal;
            return TransactionOutcome::Unresolved { tx_hash };
        }
        sleep(config.initial_delay).await;

        for attempt in 1..=attempts {
            match self.receipts.receipt(&tx_hash).await {
                Ok(Some(receipt)) => {
                    self.state = LifecycleState::Terminal;
                    return if receipt.status {
                        TransactionOutcome::Confirmed { tx_hash }
                    } else {
                        TransactionOutcome::Failed { tx_hash }
                    };
                }
                Ok(None) => {
                    log::debug!("no receipt yet for {tx_hash} (attempt {attempt}/{attempts})");
                }
                Err(e) => {
                    log::warn!("receipt lookup failed for {tx_hash} (attempt {attempt}/{attempts}): {e}");
                }
            }

            if attempt < attempts {
                if cancel.is_cancelled() {
                    break;
                }
                sleep(config.poll_interval).await;
            }
        }

        self.state = LifecycleState::Terminal;
        TransactionOutcome::Unresolved { tx_hash }
    }

    /// Submit then confirm in one motion.
    pub async fn execute(
        &mut self,
        call: &PreparedCall,
        config: ConfirmConfig,
        cancel: &CancelToken,
    ) -> Result<TransactionOutcome, AmmError> {
        let tx_hash = self.submit(call).await?;
        Ok(self.confirm(tx_hash, config, cancel).await)
    }
}
