use super::collection::CoinCollection;
use super::Patch;
use crate::tx::{TransactionId, UtxoRecord};

/// Read-only view of a UTXO source a patch can be cross-checked against:
/// either a snapshot of the durable baseline or another in-memory patch
/// layer.
pub trait StableUtxoView {
    fn utxo(&self, transaction_id: &TransactionId) -> Option<&UtxoRecord>;
}

impl StableUtxoView for Patch {
    fn utxo(&self, transaction_id: &TransactionId) -> Option<&UtxoRecord> {
        self.get_utxo(transaction_id)
    }
}

impl StableUtxoView for CoinCollection {
    fn utxo(&self, transaction_id: &TransactionId) -> Option<&UtxoRecord> {
        self.get(transaction_id)
    }
}
