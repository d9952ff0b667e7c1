use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use meridian_sdk::{PreparedCall, Receipt, ReceiptSource, TransactionSubmitter, TxHash};

/// Accepts every submission with a fixed hash and counts them.
#[derive(Default)]
pub struct RecordingSubmitter {
    pub submissions: AtomicU32,
}

#[async_trait]
impl TransactionSubmitter for RecordingSubmitter {
    async fn submit(&self, _call: &PreparedCall) -> Result<TxHash> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(TxHash("0x00aa00bb00cc00dd".to_string()))
    }
}

/// Never finds a receipt; counts lookups.
#[derive(Default)]
pub struct PendingReceipts {
    pub polls: AtomicU32,
}

#[async_trait]
impl ReceiptSource for PendingReceipts {
    async fn receipt(&self, _tx_hash: &TxHash) -> Result<Option<Receipt>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}
