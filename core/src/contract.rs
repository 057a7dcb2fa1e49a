use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::{self, FromStr};

use crate::errors::{AddressError, PatchError, PatchResult};

/// Tag identifying a witness group, an orthogonal execution axis by which
/// contracts are partitioned.
pub type GroupId = u32;

/// Opaque byte-string address under which a contract is stored. Raw bytes and
/// lowercase hex both normalize into `Address` at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(#[serde(with = "serde_bytes")] Vec<u8>);

impl Address {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Address {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Address {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut hex = vec![0u8; self.0.len() * 2];
        faster_hex::hex_encode(&self.0, &mut hex).expect("The output is exactly twice the size of the input");
        f.write_str(str::from_utf8(&hex).expect("hex is always valid UTF-8"))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.is_empty() {
            return Err(AddressError::Empty);
        }
        if hex_str.len() % 2 != 0 {
            return Err(AddressError::InvalidHex);
        }
        let mut bytes = vec![0u8; hex_str.len() / 2];
        faster_hex::hex_decode(hex_str.as_bytes(), &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

/// The encoded form of a contract. The stored address is deliberately not
/// part of the payload; decoding re-binds the payload to the address the
/// caller looked it up under.
#[derive(BorshSerialize, BorshDeserialize)]
struct ContractPayload {
    group_id: GroupId,
    data_buffer: Vec<u8>,
}

/// Speculative contract state: the stored address, the witness group the
/// contract is partitioned into, and the opaque state payload mutated by
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    address: Address,
    group_id: GroupId,
    #[serde(with = "serde_bytes")]
    data_buffer: Vec<u8>,
}

impl Contract {
    pub fn new(address: Address, group_id: GroupId, data_buffer: Vec<u8>) -> Self {
        Self { address, group_id, data_buffer }
    }

    pub fn decode(bytes: &[u8], address: Address) -> PatchResult<Self> {
        let ContractPayload { group_id, data_buffer } =
            ContractPayload::try_from_slice(bytes).map_err(|_| PatchError::MalformedContract(address.clone()))?;
        Ok(Self { address, group_id, data_buffer })
    }

    pub fn encode(&self) -> Vec<u8> {
        ContractPayload { group_id: self.group_id, data_buffer: self.data_buffer.clone() }
            .try_to_vec()
            .expect("a plain payload always serializes")
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn data_buffer(&self) -> &[u8] {
        &self.data_buffer
    }

    /// Replaces the state payload with the outcome of a state transition.
    pub fn update_data(&mut self, new_data: Vec<u8>) {
        self.data_buffer = new_data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let address = Address::from(vec![0xab, 0x01, 0xff]);
        assert_eq!(address.to_string(), "ab01ff");
        assert_eq!("ab01ff".parse::<Address>().unwrap(), address);

        assert_eq!("".parse::<Address>(), Err(AddressError::Empty));
        assert_eq!("abc".parse::<Address>(), Err(AddressError::InvalidHex));
        assert_eq!("zz".parse::<Address>(), Err(AddressError::InvalidHex));
    }

    #[test]
    fn test_contract_encode_decode() {
        let address = Address::from(&b"contract-1"[..]);
        let mut contract = Contract::new(address.clone(), 7, vec![1, 2, 3]);
        contract.update_data(vec![4, 5]);

        let decoded = Contract::decode(&contract.encode(), address.clone()).unwrap();
        assert_eq!(decoded, contract);
        assert_eq!(decoded.group_id(), 7);
        assert_eq!(decoded.data_buffer(), &[4, 5]);

        // Re-decoding against a different address re-binds the same payload
        let other = Address::from(&b"contract-2"[..]);
        let rebound = Contract::decode(&contract.encode(), other.clone()).unwrap();
        assert_eq!(rebound.address(), &other);
        assert_eq!(rebound.data_buffer(), contract.data_buffer());

        assert_eq!(Contract::decode(&[0xff], address.clone()), Err(PatchError::MalformedContract(address)));
    }
}
