//! Key history: the immutable version chain behind every ledger key.

use billchain_types::Timestamp;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

/// One committed version of a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    /// Identifier of the transaction that committed this version.
    pub tx_id: String,
    /// Commit time.
    pub timestamp: Timestamp,
    /// Always false; the ledger never deletes.
    pub is_delete: bool,
    /// Raw value written in this version.
    pub value: Vec<u8>,
}

/// Derive a transaction id from the global commit sequence, key and value.
///
/// Blake2b-256 over `seq_be ++ len_be(key) ++ key ++ value`, hex encoded.
pub fn derive_tx_id(sequence: u64, key: &str, value: &[u8]) -> String {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(sequence.to_be_bytes());
    hasher.update((key.len() as u64).to_be_bytes());
    hasher.update(key.as_bytes());
    hasher.update(value);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_id_is_deterministic_and_sequence_sensitive() {
        let a = derive_tx_id(1, "bill:B1", b"{}");
        assert_eq!(a, derive_tx_id(1, "bill:B1", b"{}"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, derive_tx_id(2, "bill:B1", b"{}"));
    }

    #[test]
    fn tx_id_separates_key_from_value() {
        assert_ne!(derive_tx_id(1, "ab", b"c"), derive_tx_id(1, "a", b"bc"));
    }
}
