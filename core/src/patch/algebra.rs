//! The three multi-patch algorithms. `merge` is a pure function of its two
//! inputs; `purge` mutates `self` against a now-stable reference layer;
//! `validate_against_stable` is a read-only cross-check of spending evidence
//! against the durable baseline.

use log::{debug, trace};

use super::stable_view::StableUtxoView;
use super::Patch;
use crate::errors::{PatchError, PatchResult};

impl Patch {
    /// Combines two sibling patches into a fresh one.
    ///
    /// The result carries the per-group maximum of both sides' levels and no
    /// bound group id; a later `set_group_id` bumps from the unioned maximum.
    /// Per transaction, the surviving live indices are the intersection of
    /// the two sides (an index live on one side only was spent by the other
    /// within this merge window) while spending evidence is unioned. Contract
    /// state within a witness group resolves to the side with the greater
    /// group level; receipts must agree wherever both sides carry one.
    pub fn merge(&self, other: &Patch) -> PatchResult<Patch> {
        let mut merged = Patch::new();

        // Group levels: per-group maximum over both sides. Duplicated keys
        // are folded by the max.
        for (&group, &level) in self.levels.iter().chain(other.levels.iter()) {
            let entry = merged.levels.entry(group).or_insert(0);
            *entry = (*entry).max(level);
        }

        // Coin store, per transaction hash in the union of key sets.
        for (transaction_id, record) in self.coins.iter() {
            let merged_record = match other.coins.get(transaction_id) {
                Some(other_record) => record.intersection(other_record),
                None => record.clone(),
            };
            merged.coins.insert(*transaction_id, merged_record);
        }
        for (transaction_id, record) in other.coins.iter() {
            if !self.coins.contains_key(transaction_id) {
                merged.coins.insert(*transaction_id, record.clone());
            }
        }

        // Spent-output evidence: union, with both sides required to agree on
        // the spender wherever their evidence overlaps.
        for (transaction_id, left) in self.spent.iter() {
            let mut combined = left.clone();
            if let Some(right) = other.spent.get(transaction_id) {
                for (&index, &spender) in right.iter() {
                    if let Some(existing) = combined.insert(index, spender) {
                        if existing != spender {
                            return Err(PatchError::DoubleSpend(*transaction_id, index));
                        }
                    }
                }
            }
            merged.spent.insert(*transaction_id, combined);
        }
        for (transaction_id, right) in other.spent.iter() {
            if !self.spent.contains_key(transaction_id) {
                merged.spent.insert(*transaction_id, right.clone());
            }
        }

        // Contract states. Within a witness group the higher level wins, with
        // ties resolving to self; across groups there is no ordering and the
        // merge is rejected.
        for (address, contract) in self.contracts.iter() {
            let winner = match other.contracts.get(address) {
                Some(other_contract) => {
                    if contract.group_id() != other_contract.group_id() {
                        return Err(PatchError::ContractGroupMismatch(address.clone()));
                    }
                    let group = contract.group_id();
                    if other.level_of(group) > self.level_of(group) {
                        other_contract
                    } else {
                        contract
                    }
                }
                None => contract,
            };
            merged.contracts.insert(address.clone(), winner.clone());
        }
        for (address, contract) in other.contracts.iter() {
            if !self.contracts.contains_key(address) {
                merged.contracts.insert(address.clone(), contract.clone());
            }
        }

        // Receipts coalesce when one side is absent and must be structurally
        // equal when both are present.
        for (transaction_id, receipt) in self.receipts.iter() {
            if let Some(other_receipt) = other.receipts.get(transaction_id) {
                if receipt != other_receipt {
                    return Err(PatchError::ReceiptCollision(*transaction_id));
                }
            }
            merged.receipts.insert(*transaction_id, receipt.clone());
        }
        for (transaction_id, receipt) in other.receipts.iter() {
            if !self.receipts.contains_key(transaction_id) {
                merged.receipts.insert(*transaction_id, receipt.clone());
            }
        }

        trace!(
            "merged patches: {} coin records, {} spent outputs, {} contracts, {} receipts",
            merged.coins.len(),
            merged.complexity(),
            merged.contracts.len(),
            merged.receipts.len()
        );
        Ok(merged)
    }

    /// Removes from `self` every entity that is identical in the now-stable
    /// layer `stable`, bounding the memory of derived patches once a block is
    /// applied to durable storage. Entries that diverged from stable are kept
    /// untouched since they still describe a delta.
    pub fn purge(&mut self, stable: &Patch) {
        use super::collection::SpentOutputCollectionExtensions;

        let mut purged_records = 0usize;
        for (transaction_id, stable_record) in stable.coins.iter() {
            let Some(record) = self.coins.get(transaction_id) else { continue };
            if record == stable_record && self.spent.entries_equal(&stable.spent, transaction_id) {
                self.coins.remove(transaction_id);
                self.spent.remove(transaction_id);
                purged_records += 1;
            }
        }

        let mut purged_contracts = 0usize;
        for (address, stable_contract) in stable.contracts.iter() {
            if self.contracts.get(address).is_some_and(|contract| contract.data_buffer() == stable_contract.data_buffer()) {
                self.contracts.remove(address);
                purged_contracts += 1;
            }
        }

        // Receipts are write-once, so a shared hash implies an equal receipt
        for transaction_id in stable.receipts.keys() {
            self.receipts.remove(transaction_id);
        }

        debug!("purged {} coin records and {} contracts against stable layer", purged_records, purged_contracts);
    }

    /// Asserts that every output this patch spends was still live in the
    /// stable baseline. Transactions the baseline does not know yet are still
    /// pending in an ancestor patch and are skipped; they get validated once
    /// that ancestor stabilizes. Read-only on both sides.
    pub fn validate_against_stable<V: StableUtxoView>(&self, stable: &V) -> PatchResult<()> {
        for transaction_id in self.coins.keys() {
            let Some(baseline) = stable.utxo(transaction_id) else { continue };
            let Some(spent) = self.spent.get(transaction_id) else { continue };
            for &index in spent.keys() {
                if !baseline.contains(index) {
                    return Err(PatchError::StaleSpend(*transaction_id, index));
                }
            }
        }
        Ok(())
    }
}
