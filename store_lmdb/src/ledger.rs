//! LMDB implementation of LedgerStore.
//!
//! Three databases share one environment:
//! - `state`: key bytes -> current value bytes
//! - `history`: `u32_be(len(key)) ++ key ++ u64_be(sequence)` -> bincode [`KeyModification`]
//! - `meta`: schema version and the global commit sequence
//!
//! Every `put` is one write transaction, so the state update, the history
//! append and the sequence bump commit together or not at all.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use billchain_store::{
    derive_tx_id, in_range, validate_key, validate_put, KeyModification, KeyValue, LedgerStore,
    Selector, StoreError,
};
use billchain_types::Timestamp;

use crate::meta::{read_commit_sequence, write_commit_sequence};
use crate::LmdbError;

pub struct LmdbLedgerStore {
    pub(crate) env: Arc<Env>,
    pub(crate) state_db: Database<Bytes, Bytes>,
    pub(crate) history_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// Length-prefixed key so that one key's versions never interleave with
/// another key that shares its prefix.
fn history_prefix(key: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(4 + key.len() + 8);
    prefix.extend_from_slice(&(key.len() as u32).to_be_bytes());
    prefix.extend_from_slice(key.as_bytes());
    prefix
}

fn history_key(key: &str, sequence: u64) -> Vec<u8> {
    let mut full = history_prefix(key);
    full.extend_from_slice(&sequence.to_be_bytes());
    full
}

fn decode_key(raw: &[u8]) -> Result<String, LmdbError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| LmdbError::Corruption(format!("non-utf8 ledger key: {e}")))
}

impl LmdbLedgerStore {
    /// Commit sequence of the most recent write (0 on a fresh ledger).
    pub fn commit_sequence(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(read_commit_sequence(&self.meta_db, &rtxn)?)
    }
}

impl LedgerStore for LmdbLedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .state_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(<[u8]>::to_vec))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_put(key, value)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let sequence = read_commit_sequence(&self.meta_db, &wtxn)? + 1;
        let modification = KeyModification {
            tx_id: derive_tx_id(sequence, key, value),
            timestamp: Timestamp::now(),
            is_delete: false,
            value: value.to_vec(),
        };
        let encoded = bincode::serialize(&modification).map_err(LmdbError::from)?;

        self.state_db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        self.history_db
            .put(&mut wtxn, &history_key(key, sequence), &encoded)
            .map_err(LmdbError::from)?;
        write_commit_sequence(&self.meta_db, &mut wtxn, sequence)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(key, sequence, tx_id = %modification.tx_id, "ledger commit");
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start.as_bytes())
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.as_bytes())
        };
        let bounds = (lower, upper);
        let iter = self
            .state_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (raw_key, val) = result.map_err(LmdbError::from)?;
            let key = decode_key(raw_key)?;
            if in_range(&key, start, end) {
                results.push(KeyValue::new(key, val));
            }
        }
        Ok(results)
    }

    fn rich_query(&self, selector: &Selector) -> Result<Vec<KeyValue>, StoreError> {
        selector.validate()?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.state_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (raw_key, val) = result.map_err(LmdbError::from)?;
            if selector.matches_bytes(val) {
                results.push(KeyValue::new(decode_key(raw_key)?, val));
            }
        }
        Ok(results)
    }

    fn history_of(&self, key: &str) -> Result<Vec<KeyModification>, StoreError> {
        validate_key(key)?;
        let lower = history_key(key, 0);
        let upper = history_key(key, u64::MAX);

        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Included(upper.as_slice()),
        );
        let iter = self
            .history_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut versions = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let modification: KeyModification =
                bincode::deserialize(val).map_err(LmdbError::from)?;
            versions.push(modification);
        }
        Ok(versions)
    }
}
