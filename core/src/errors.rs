use crate::contract::{Address, GroupId};
use crate::tx::{OutputIndex, TransactionId};
use patchdb_hashes::HashError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address is not a valid lowercase hex string")]
    InvalidHex,
}

/// Errors surfaced by patch operations. None of these are recovered
/// internally; [`DoubleSpend`](PatchError::DoubleSpend),
/// [`StaleSpend`](PatchError::StaleSpend) and
/// [`ReceiptCollision`](PatchError::ReceiptCollision) are consensus-relevant
/// and must cause the caller to reject the offending block, the rest indicate
/// caller bugs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("bad transaction hash: {0}")]
    BadHash(#[from] HashError),

    #[error("bad contract address: {0}")]
    BadAddress(#[from] AddressError),

    #[error("invalid output index {1} for transaction {0}")]
    InvalidIndex(TransactionId, OutputIndex),

    #[error("patch is already bound to witness group {0}")]
    AlreadyBound(GroupId),

    #[error("no witness group is bound to this patch")]
    GroupNotSet,

    #[error("output {1} of transaction {0} is spent by two different transactions")]
    DoubleSpend(TransactionId, OutputIndex),

    #[error("contract at address {0} belongs to different witness groups on the two merge sides")]
    ContractGroupMismatch(Address),

    #[error("conflicting receipts recorded for transaction {0}")]
    ReceiptCollision(TransactionId),

    #[error("output {1} of transaction {0} is not live in the stable baseline")]
    StaleSpend(TransactionId, OutputIndex),

    #[error("contract payload for address {0} is malformed")]
    MalformedContract(Address),
}

pub type PatchResult<T> = std::result::Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // Untyped host input funnels into the canonical key types with `?`
    fn parse_id(raw: &str) -> PatchResult<TransactionId> {
        Ok(TransactionId::from_str(raw)?)
    }

    fn parse_address(raw: &str) -> PatchResult<Address> {
        Ok(raw.parse::<Address>()?)
    }

    #[test]
    fn test_boundary_conversions() {
        assert!(parse_id(&"ab".repeat(32)).is_ok());
        assert_eq!(parse_id("beef"), Err(PatchError::BadHash(HashError::InvalidLength(2))));
        assert_eq!(parse_address(""), Err(PatchError::BadAddress(AddressError::Empty)));
        assert!(parse_address("beef").is_ok());
    }
}
