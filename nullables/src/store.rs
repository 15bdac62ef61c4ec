//! Nullable store: thread-safe in-memory versioned ledger for testing.

use billchain_store::{
    derive_tx_id, in_range, validate_key, validate_put, KeyModification, KeyValue, LedgerStore,
    Selector, StoreError,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::NullClock;

#[derive(Default)]
struct Ledger {
    state: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<KeyModification>>,
    sequence: u64,
}

/// An in-memory ledger store for testing.
///
/// Commits are serialised by a single mutex, so concurrent `put`s on one key
/// resolve as last-committed-wins and the history records both in commit
/// order.
pub struct NullLedgerStore {
    ledger: Mutex<Ledger>,
    clock: NullClock,
    unavailable: AtomicBool,
}

impl NullLedgerStore {
    pub fn new() -> Self {
        Self::with_clock(NullClock::default())
    }

    /// Use a specific clock for history timestamps.
    pub fn with_clock(clock: NullClock) -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn clock(&self) -> &NullClock {
        &self.clock
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Total successful commits across all keys.
    pub fn commit_count(&self) -> u64 {
        self.ledger.lock().map(|l| l.sequence).unwrap_or(0)
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null ledger switched off".into()));
        }
        self.ledger
            .lock()
            .map_err(|_| StoreError::Backend("null ledger mutex poisoned".into()))
    }
}

impl Default for NullLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for NullLedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        Ok(self.ledger()?.state.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_put(key, value)?;
        let mut ledger = self.ledger()?;
        ledger.sequence += 1;
        let sequence = ledger.sequence;
        let modification = KeyModification {
            tx_id: derive_tx_id(sequence, key, value),
            timestamp: self.clock.now(),
            is_delete: false,
            value: value.to_vec(),
        };
        ledger.state.insert(key.to_string(), value.to_vec());
        ledger
            .history
            .entry(key.to_string())
            .or_default()
            .push(modification);
        tracing::debug!(key, sequence, "null ledger commit");
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError> {
        Ok(self
            .ledger()?
            .state
            .range(start.to_string()..)
            .take_while(|(k, _)| end.is_empty() || k.as_str() < end)
            .filter(|(k, _)| in_range(k, start, end))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect())
    }

    fn rich_query(&self, selector: &Selector) -> Result<Vec<KeyValue>, StoreError> {
        selector.validate()?;
        Ok(self
            .ledger()?
            .state
            .iter()
            .filter(|(_, v)| selector.matches_bytes(v))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect())
    }

    fn history_of(&self, key: &str) -> Result<Vec<KeyModification>, StoreError> {
        validate_key(key)?;
        Ok(self
            .ledger()?
            .history
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billchain_store::composite_key;
    use std::sync::Barrier;

    #[test]
    fn test_put_get() {
        let store = NullLedgerStore::new();
        store.put("bill:B1", b"{\"State\":\"made\"}").unwrap();
        assert_eq!(
            store.get("bill:B1").unwrap().as_deref(),
            Some(&b"{\"State\":\"made\"}"[..])
        );
        assert!(store.exists("bill:B1").unwrap());
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = NullLedgerStore::new();
        assert_eq!(store.get("bill:nope").unwrap(), None);
        assert!(store.history_of("bill:nope").unwrap().is_empty());
    }

    #[test]
    fn test_history_counts_every_put_in_order() {
        let store = NullLedgerStore::new();
        let versions: [&[u8]; 3] = [b"v1", b"v2", b"v3"];
        for (i, v) in versions.iter().enumerate() {
            store.clock().set(100 + i as u64);
            store.put("k", v).unwrap();
        }
        let history = store.history_of("k").unwrap();
        let values: Vec<&[u8]> = history.iter().map(|m| m.value.as_slice()).collect();
        assert_eq!(values, versions.to_vec());
        assert_eq!(history[0].timestamp.as_secs(), 100);
        assert_eq!(history[2].timestamp.as_secs(), 102);
        assert!(history.iter().all(|m| !m.is_delete));
        assert_ne!(history[0].tx_id, history[1].tx_id);
    }

    #[test]
    fn test_range_scan_is_ordered_and_bounded() {
        let store = NullLedgerStore::new();
        store.put("bill:b", b"2").unwrap();
        store.put("user:alice", b"3").unwrap();
        store.put("bill:a", b"1").unwrap();
        let composite = composite_key("searchkey", &["acmid", "Public"]).unwrap();
        store.put(&composite, b"4").unwrap();

        let bills = store.prefix_scan("bill:").unwrap();
        let keys: Vec<&str> = bills.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["bill:a", "bill:b"]);

        let everything = store.range_scan("", "").unwrap();
        assert_eq!(everything.len(), 3);
        assert!(everything.iter().all(|kv| kv.key != composite));
    }

    #[test]
    fn test_rich_query_filters_on_json_fields() {
        let store = NullLedgerStore::new();
        store
            .put("bill:a", br#"{"State":"made","PayBillID":"x"}"#)
            .unwrap();
        store
            .put("bill:b", br#"{"State":"public","PayBillID":"x"}"#)
            .unwrap();
        store.put("raw", b"not json").unwrap();
        let hits = store
            .rich_query(&Selector::new().field_eq("State", "made"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "bill:a");
        assert!(store.rich_query(&Selector::new()).is_err());
    }

    #[test]
    fn test_rejects_empty_key_and_value() {
        let store = NullLedgerStore::new();
        assert!(matches!(store.put("", b"x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.put("k", b""), Err(StoreError::InvalidValue(_))));
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_unavailable_surfaces_on_every_call() {
        let store = NullLedgerStore::new();
        store.put("k", b"v").unwrap();
        store.set_unavailable(true);
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.put("k", b"w"), Err(StoreError::Unavailable(_))));
        store.set_unavailable(false);
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn test_concurrent_puts_last_commit_wins() {
        let store = NullLedgerStore::new();
        let barrier = Barrier::new(2);
        let writers: [&[u8]; 2] = [b"from-a", b"from-b"];
        std::thread::scope(|s| {
            for value in writers {
                let store = &store;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    store.put("bill:race", value).unwrap();
                });
            }
        });

        let history = store.history_of("bill:race").unwrap();
        assert_eq!(history.len(), 2);
        let current = store.get("bill:race").unwrap().unwrap();
        assert_eq!(current, history[1].value);
        assert_ne!(history[0].value, history[1].value);
    }
}
