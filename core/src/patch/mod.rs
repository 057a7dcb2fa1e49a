//! The patch: an in-memory, mergeable delta describing the effect of
//! executing one or more blocks against a stable baseline, without mutating
//! that baseline. A patch is a plain value owned by exactly one executor
//! context at a time; it can be shipped between tasks and never assumes
//! shared-mutable access. The pairwise algebra (merge, purge,
//! validate-against-stable) lives in this module's `algebra` half.

mod algebra;
pub mod collection;
pub mod stable_view;

use crate::contract::{Address, Contract, GroupId};
use crate::errors::{PatchError, PatchResult};
use crate::receipt::TxReceipt;
use crate::tx::{Coins, OutputIndex, TransactionId, UtxoRecord};
use self::collection::{
    CoinCollection, ContractCollection, GroupLevels, ReceiptCollection, SpentOutputCollection, SpentOutputCollectionExtensions,
    SpentOutputs,
};

pub use self::stable_view::StableUtxoView;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    /// The witness group this patch executes under, bound at most once.
    /// Merged patches start unbound while still carrying unioned levels.
    group_id: Option<GroupId>,
    levels: GroupLevels,
    coins: CoinCollection,
    spent: SpentOutputCollection,
    contracts: ContractCollection,
    receipts: ReceiptCollection,
}

impl Patch {
    pub fn new() -> Self {
        Default::default()
    }

    /// An empty patch already bound to `group_id`, at level 1.
    pub fn with_group(group_id: GroupId) -> Self {
        Self { group_id: Some(group_id), levels: GroupLevels::from([(group_id, 1)]), ..Default::default() }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    /// Binds the patch to a witness group, bumping that group's level from
    /// its existing value (inherited through merges) or from zero.
    pub fn set_group_id(&mut self, group_id: GroupId) -> PatchResult<()> {
        if let Some(bound) = self.group_id {
            return Err(PatchError::AlreadyBound(bound));
        }
        *self.levels.entry(group_id).or_insert(0) += 1;
        self.group_id = Some(group_id);
        Ok(())
    }

    /// The level of `group`, defaulting to the currently bound group. Groups
    /// this patch has never seen report level 0.
    pub fn get_level(&self, group: Option<GroupId>) -> PatchResult<u64> {
        let group = match group {
            Some(group) => group,
            None => self.group_id.ok_or(PatchError::GroupNotSet)?,
        };
        Ok(self.level_of(group))
    }

    fn level_of(&self, group: GroupId) -> u64 {
        self.levels.get(&group).copied().unwrap_or(0)
    }

    /// Consumes output `index` of the transaction `snapshot` describes.
    ///
    /// `snapshot` is the UTXO as it appears before this spend, from a
    /// preceding patch layer or from the stable baseline; if the patch
    /// already tracks a local copy, the local copy is mutated and the
    /// snapshot is ignored. Spending an index that is no longer live fails
    /// with `InvalidIndex`, signalling a double-spend within this patch. On
    /// failure the patch is left untouched.
    pub fn spend_coins(&mut self, snapshot: &UtxoRecord, index: OutputIndex, spending_id: TransactionId) -> PatchResult<()> {
        let transaction_id = snapshot.transaction_id();
        match self.coins.get_mut(&transaction_id) {
            Some(record) => {
                record.spend(index)?;
            }
            None => {
                let mut record = snapshot.clone();
                record.spend(index)?;
                self.coins.insert(transaction_id, record);
            }
        }
        self.spent.entry(transaction_id).or_default().insert(index, spending_id);
        Ok(())
    }

    /// Records a newly created output under `transaction_id`.
    pub fn create_coins(&mut self, transaction_id: TransactionId, index: OutputIndex, coins: Coins) -> PatchResult<()> {
        self.coins.entry(transaction_id).or_insert_with(|| UtxoRecord::new(transaction_id)).add(index, coins)
    }

    pub fn get_utxo(&self, transaction_id: &TransactionId) -> Option<&UtxoRecord> {
        self.coins.get(transaction_id)
    }

    pub fn get_coins(&self) -> impl Iterator<Item = (&TransactionId, &UtxoRecord)> {
        self.coins.iter()
    }

    /// Installs a cloned UTXO record, overwriting any tracked copy. Used when
    /// loading a patch from block data.
    pub fn set_utxo(&mut self, record: &UtxoRecord) {
        self.coins.insert(record.transaction_id(), record.clone());
    }

    pub fn get_spent_outputs(&self, transaction_id: &TransactionId) -> Option<&SpentOutputs> {
        self.spent.get(transaction_id)
    }

    /// The transaction that consumed output `index` of `transaction_id`
    /// within this patch, if any.
    pub fn spender_of(&self, transaction_id: &TransactionId, index: OutputIndex) -> Option<&TransactionId> {
        self.spent.get(transaction_id)?.get(&index)
    }

    pub fn set_contract(&mut self, contract: Contract) {
        self.contracts.insert(contract.address().clone(), contract);
    }

    pub fn get_contract(&self, address: &Address) -> Option<&Contract> {
        self.contracts.get(address)
    }

    pub fn get_contracts(&self) -> impl Iterator<Item = (&Address, &Contract)> {
        self.contracts.iter()
    }

    pub fn set_receipt(&mut self, transaction_id: TransactionId, receipt: TxReceipt) {
        self.receipts.insert(transaction_id, receipt);
    }

    pub fn get_receipt(&self, transaction_id: &TransactionId) -> Option<&TxReceipt> {
        self.receipts.get(transaction_id)
    }

    pub fn get_receipts(&self) -> impl Iterator<Item = (&TransactionId, &TxReceipt)> {
        self.receipts.iter()
    }

    /// Total count of spent outputs across all transactions. Used by block
    /// selection as a secondary tie-breaker among otherwise-equivalent
    /// candidate patches.
    pub fn complexity(&self) -> usize {
        self.spent.total_spent()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty() && self.spent.is_empty() && self.contracts.is_empty() && self.receipts.is_empty()
    }
}
