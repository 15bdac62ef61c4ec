//! Abstract ledger store traits for billchain.
//!
//! The ledger is an ordered, versioned key-value store: every committed write
//! appends a new immutable version for its key and nothing is ever deleted.
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`LedgerStore`]; the rest of the codebase depends only on the trait.

pub mod composite;
pub mod error;
pub mod history;
pub mod meta;
pub mod selector;

pub use composite::{composite_key, is_composite_key, split_composite_key};
pub use error::StoreError;
pub use history::{derive_tx_id, KeyModification};
pub use meta::MetaStore;
pub use selector::Selector;

/// A key and the raw value currently stored under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Versioned key-value ledger.
///
/// Each call is a single atomic request. Concurrent `put`s on one key are
/// ordered by the backend and the last committed write wins; there is no
/// read-modify-write conflict check at this layer.
pub trait LedgerStore: Send + Sync {
    /// Current value of `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrite `key` with `value`, committing a new history version.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Key-ordered entries with `start <= key < end`.
    ///
    /// An empty bound is open on that side. Composite keys are never returned.
    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError>;

    /// Key-ordered entries whose JSON value satisfies `selector`.
    fn rich_query(&self, selector: &Selector) -> Result<Vec<KeyValue>, StoreError>;

    /// Every version ever committed for `key`, oldest first.
    fn history_of(&self, key: &str) -> Result<Vec<KeyModification>, StoreError>;

    /// Whether `key` currently holds a value.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.get(key).map(|v| v.is_some())
    }

    /// All entries whose key starts with `prefix`.
    fn prefix_scan(&self, prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
        match prefix_end(prefix) {
            Some(end) => self.range_scan(prefix, &end),
            None => self.range_scan(prefix, ""),
        }
    }
}

/// Validation shared by every backend before a write reaches storage.
pub fn validate_put(key: &str, value: &[u8]) -> Result<(), StoreError> {
    validate_key(key)?;
    if value.is_empty() {
        return Err(StoreError::InvalidValue(key.to_string()));
    }
    Ok(())
}

/// Longest key, in bytes, that every backend can index.
///
/// LMDB caps keys at 511 bytes and its history index frames each key with a
/// 4-byte length and an 8-byte sequence.
pub const MAX_KEY_LEN: usize = 511 - 12;

/// Keys must be non-empty and at most [`MAX_KEY_LEN`] bytes.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".into()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey(format!(
            "key is {} bytes, limit is {MAX_KEY_LEN}",
            key.len()
        )));
    }
    Ok(())
}

/// Whether `key` falls inside a `range_scan(start, end)` window.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    !is_composite_key(key) && key >= start && (end.is_empty() || key < end)
}

/// Smallest string greater than every string starting with `prefix`.
///
/// `None` when no such bound exists (empty prefix or all chars at `char::MAX`).
pub fn prefix_end(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = char::from_u32(last as u32 + 1).or_else(|| {
            // Skip the surrogate gap.
            (last as u32 == 0xD7FF).then_some('\u{E000}')
        }) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_end_bumps_last_char() {
        assert_eq!(prefix_end("bill:").as_deref(), Some("bill;"));
        assert_eq!(prefix_end(""), None);
    }

    #[test]
    fn in_range_bounds_and_composites() {
        assert!(in_range("bill:B1", "bill:", "bill;"));
        assert!(!in_range("user:alice", "bill:", "bill;"));
        assert!(in_range("user:alice", "", ""));
        assert!(!in_range("\u{0}searchkey\u{0}", "", ""));
    }

    #[test]
    fn put_validation() {
        assert!(matches!(validate_put("", b"x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(validate_put("k", b""), Err(StoreError::InvalidValue(_))));
        assert!(validate_put("k", b"x").is_ok());
        assert!(validate_key(&"k".repeat(MAX_KEY_LEN)).is_ok());
        assert!(matches!(
            validate_key(&"k".repeat(MAX_KEY_LEN + 1)),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
