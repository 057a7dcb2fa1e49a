use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::{self, FromStr};
use thiserror::Error;

pub const HASH_SIZE: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("hash has length {0} but {HASH_SIZE} bytes are expected")]
    InvalidLength(usize),

    #[error("hash is not a valid lowercase hex string")]
    InvalidHex,
}

/// A 32-byte identifier. This is the canonical key form for transactions and
/// blocks: raw byte material and lowercase hex both normalize into `Hash` at
/// the boundary, so no map in the system ever branches on key representation.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Default, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    pub const fn as_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }

    /// Panics if the slice is not exactly [`HASH_SIZE`] bytes. To be used only
    /// for material already known to be well-formed; fallible callers go
    /// through `TryFrom`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(<[u8; HASH_SIZE]>::try_from(bytes).expect("Slice must have the length of Hash"))
    }

    pub fn from_u64(word: u64) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        bytes[0..std::mem::size_of::<u64>()].copy_from_slice(&word.to_le_bytes());
        Hash(bytes)
    }

    /// To be used for test purposes only
    pub fn new_unique() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let c = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::from_u64(c)
    }
}

impl TryFrom<&[u8]> for Hash {
    type Error = HashError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; HASH_SIZE]>::try_from(bytes).map(Hash).map_err(|_| HashError::InvalidLength(bytes.len()))
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut hex = [0u8; HASH_SIZE * 2];
        faster_hex::hex_encode(&self.0, &mut hex).expect("The output is exactly twice the size of the input");
        f.write_str(str::from_utf8(&hex).expect("hex is always valid UTF-8"))
    }
}

impl FromStr for Hash {
    type Err = HashError;

    fn from_str(hash_str: &str) -> Result<Self, Self::Err> {
        if hash_str.len() != HASH_SIZE * 2 {
            return Err(HashError::InvalidLength(hash_str.len() / 2));
        }
        let mut bytes = [0u8; HASH_SIZE];
        faster_hex::hex_decode(hash_str.as_bytes(), &mut bytes).map_err(|_| HashError::InvalidHex)?;
        Ok(Hash(bytes))
    }
}

impl From<u64> for Hash {
    fn from(word: u64) -> Self {
        Self::from_u64(word)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_hash_basics() {
        let hash_str = "8e40af02265360d59f4ecf9ae9ebf8f00a3118408f5a9cdcbcc9c0f93642f3af";
        let hash = Hash::from_str(hash_str).unwrap();
        assert_eq!(hash_str, hash.to_string());
        let hash2 = Hash::from_str(hash_str).unwrap();
        assert_eq!(hash, hash2);

        let hash3 = Hash::from_str("8e40af02265360d59f4ecf9ae9ebf8f00a3118408f5a9cdcbcc9c0f93642f3ab").unwrap();
        assert_ne!(hash2, hash3);

        let short_str = "8e40af02265360d59f4ecf9ae9ebf8f00a3118408f5a9cdcbcc9c0f93642f3";
        assert_eq!(Hash::from_str(short_str), Err(HashError::InvalidLength(31)));
        assert_eq!(Hash::from_str(&"zz".repeat(32)), Err(HashError::InvalidHex));
    }

    #[test]
    fn test_from_slice() {
        let bytes = [7u8; 32];
        assert_eq!(Hash::from_slice(&bytes), Hash::from_bytes(bytes));
        assert_eq!(Hash::try_from(&bytes[..]).unwrap(), Hash::from_bytes(bytes));
        assert_eq!(Hash::try_from(&bytes[..30]), Err(HashError::InvalidLength(30)));
    }

    #[test]
    fn test_serde_human_readable() {
        let hash = Hash::from_u64(0xc0fe);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(hash, serde_json::from_str::<Hash>(&json).unwrap());
    }
}
