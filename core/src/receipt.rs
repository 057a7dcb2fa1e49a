use serde::{Deserialize, Serialize};

/// Result of executing a single transaction. Receipts are write-once from the
/// executor's point of view and are only ever compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub accepted: bool,
    #[serde(with = "serde_bytes")]
    pub return_data: Vec<u8>,
}

impl TxReceipt {
    pub fn new(accepted: bool, return_data: Vec<u8>) -> Self {
        Self { accepted, return_data }
    }
}
