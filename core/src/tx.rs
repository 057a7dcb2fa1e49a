use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::errors::{PatchError, PatchResult};

/// Identifies a transaction, and thereby its UTXO record.
pub type TransactionId = patchdb_hashes::Hash;

/// Index of an output within its transaction.
pub type OutputIndex = u32;

/// Size of the underlying script vector of a lock script, optimized for the common p2pk script size (34).
pub const SCRIPT_VECTOR_SIZE: usize = 36;

pub type ScriptVec = SmallVec<[u8; SCRIPT_VECTOR_SIZE]>;

/// The script that must be satisfied to spend an output. Opaque to the patch
/// layer, which only ever clones and compares it; interpretation belongs to
/// script execution.
#[derive(Default, Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct LockScript(ScriptVec);

impl LockScript {
    pub fn new(script: ScriptVec) -> Self {
        Self(script)
    }

    pub fn from_vec(script: Vec<u8>) -> Self {
        Self(ScriptVec::from_vec(script))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// The value carried by a single transaction output together with the script
/// locking it. Compared by equality only; the patch layer never interprets
/// the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coins {
    pub amount: u64,
    pub lock_script: LockScript,
}

impl Coins {
    pub fn new(amount: u64, lock_script: LockScript) -> Self {
        Self { amount, lock_script }
    }
}

/// Per-transaction UTXO record: the sparse set of output indices still live,
/// each carrying its coins. A record with no live outputs is a valid value,
/// representing a fully-spent transaction still tracked for conflict
/// detection until purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoRecord {
    transaction_id: TransactionId,
    outputs: HashMap<OutputIndex, Coins>,
}

impl UtxoRecord {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self { transaction_id, outputs: HashMap::new() }
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// The live output indices. Iteration order is unspecified.
    pub fn indexes(&self) -> impl Iterator<Item = OutputIndex> + '_ {
        self.outputs.keys().copied()
    }

    pub fn contains(&self, index: OutputIndex) -> bool {
        self.outputs.contains_key(&index)
    }

    pub fn coins_at(&self, index: OutputIndex) -> Option<&Coins> {
        self.outputs.get(&index)
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_fully_spent(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Inserts a newly created output. The index must not be live already.
    pub fn add(&mut self, index: OutputIndex, coins: Coins) -> PatchResult<()> {
        if self.outputs.contains_key(&index) {
            return Err(PatchError::InvalidIndex(self.transaction_id, index));
        }
        self.outputs.insert(index, coins);
        Ok(())
    }

    /// Removes a live output, returning its coins. Spending an index that is
    /// not live signals a double-spend within the owning patch.
    pub fn spend(&mut self, index: OutputIndex) -> PatchResult<Coins> {
        self.outputs.remove(&index).ok_or(PatchError::InvalidIndex(self.transaction_id, index))
    }

    /// The record containing exactly the indices live in both `self` and
    /// `other`, with coins taken from `self`. This is the survivor rule of a
    /// patch merge: an index live on one side only was spent by the other
    /// side within the merge window.
    pub fn intersection(&self, other: &UtxoRecord) -> UtxoRecord {
        Self {
            transaction_id: self.transaction_id,
            outputs: self.outputs.iter().filter(|(index, _)| other.contains(**index)).map(|(k, v)| (*k, v.clone())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn coins(amount: u64) -> Coins {
        Coins::new(amount, LockScript::from_vec(vec![0x51]))
    }

    #[test]
    fn test_record_serde_json() {
        let mut record = UtxoRecord::new(TransactionId::from_u64(3));
        record.add(0, coins(100)).unwrap();
        record.add(7, coins(50)).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(record, serde_json::from_str::<UtxoRecord>(&json).unwrap());
    }

    #[test]
    fn test_record_add_and_spend() {
        let id = TransactionId::from_u64(1);
        let mut record = UtxoRecord::new(id);
        record.add(0, coins(100)).unwrap();
        record.add(2, coins(50)).unwrap();
        assert_eq!(record.indexes().sorted().collect_vec(), vec![0, 2]);
        assert_eq!(record.coins_at(0), Some(&coins(100)));
        assert_eq!(record.coins_at(1), None);

        // Occupied index cannot be created again
        assert_eq!(record.add(0, coins(1)), Err(PatchError::InvalidIndex(id, 0)));

        assert_eq!(record.spend(0).unwrap(), coins(100));
        assert_eq!(record.spend(0), Err(PatchError::InvalidIndex(id, 0)));
        assert!(!record.is_fully_spent());
        record.spend(2).unwrap();
        assert!(record.is_fully_spent());
        assert_eq!(record.output_count(), 0);
    }

    #[test]
    fn test_record_intersection() {
        let id = TransactionId::from_u64(7);
        let mut left = UtxoRecord::new(id);
        let mut right = UtxoRecord::new(id);
        for index in [0, 1, 2] {
            left.add(index, coins(10 + index as u64)).unwrap();
        }
        for index in [1, 2, 3] {
            right.add(index, coins(10 + index as u64)).unwrap();
        }
        let shared = left.intersection(&right);
        assert_eq!(shared.transaction_id(), id);
        assert_eq!(shared.indexes().sorted().collect_vec(), vec![1, 2]);
        assert_eq!(shared.coins_at(1), Some(&coins(11)));

        let disjoint = UtxoRecord::new(id).intersection(&left);
        assert!(disjoint.is_fully_spent());
    }
}
