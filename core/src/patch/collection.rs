use std::collections::HashMap;

use crate::contract::{Address, Contract, GroupId};
use crate::receipt::TxReceipt;
use crate::tx::{OutputIndex, TransactionId, UtxoRecord};

/// Coin store: the surviving UTXO record of every transaction touched by a patch.
pub type CoinCollection = HashMap<TransactionId, UtxoRecord>;

/// Per-transaction spending evidence: which transaction consumed each output index.
pub type SpentOutputs = HashMap<OutputIndex, TransactionId>;

/// Spent-output index across all transactions in a patch.
pub type SpentOutputCollection = HashMap<TransactionId, SpentOutputs>;

pub type ContractCollection = HashMap<Address, Contract>;

pub type ReceiptCollection = HashMap<TransactionId, TxReceipt>;

/// Monotonic per-group counters ordering sibling patches within a witness group.
pub type GroupLevels = HashMap<GroupId, u64>;

pub trait SpentOutputCollectionExtensions {
    /// Total number of spent outputs across all transactions.
    fn total_spent(&self) -> usize;

    /// Whether the evidence recorded for `transaction_id` is identical on
    /// both sides: same spent indices, same spending transaction at every
    /// index. Two absent sub-maps are equal.
    fn entries_equal(&self, other: &Self, transaction_id: &TransactionId) -> bool;
}

impl SpentOutputCollectionExtensions for SpentOutputCollection {
    fn total_spent(&self) -> usize {
        self.values().map(|outputs| outputs.len()).sum()
    }

    fn entries_equal(&self, other: &Self, transaction_id: &TransactionId) -> bool {
        self.get(transaction_id) == other.get(transaction_id)
    }
}
