//! Credential registry seeded at initialisation and read-only afterwards.

use billchain_store::LedgerStore;
use billchain_types::SignInfo;

use crate::keys::{decode, encode, user_key, USER_PREFIX};
use crate::ContractError;

/// All registry entries in key order.
pub fn scan_registry<S: LedgerStore + ?Sized>(store: &S) -> Result<Vec<SignInfo>, ContractError> {
    store
        .prefix_scan(USER_PREFIX)?
        .iter()
        .map(|kv| decode(&kv.key, &kv.value))
        .collect()
}

/// The registry entry whose username and password both match, if any.
pub fn authenticate<S: LedgerStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<Option<SignInfo>, ContractError> {
    let entry = scan_registry(store)?
        .into_iter()
        .find(|entry| entry.matches_credentials(username, password));
    tracing::debug!(username, authenticated = entry.is_some(), "registry login");
    Ok(entry)
}

pub(crate) fn register<S: LedgerStore + ?Sized>(
    store: &S,
    entry: &SignInfo,
) -> Result<(), ContractError> {
    store.put(&user_key(&entry.username)?, &encode(entry)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billchain_nullables::NullLedgerStore;

    fn seeded() -> NullLedgerStore {
        let store = NullLedgerStore::new();
        register(&store, &SignInfo::new("bob", "pw-b", "B Co", "bcmid")).unwrap();
        register(&store, &SignInfo::new("alice", "pw-a", "A Co", "acmid")).unwrap();
        store.put("bill:alice", br#"{"not":"a user"}"#).unwrap();
        store
    }

    #[test]
    fn scan_is_key_ordered_and_namespaced() {
        let users: Vec<String> = scan_registry(&seeded())
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(users, vec!["alice", "bob"]);
    }

    #[test]
    fn authenticate_requires_both_credentials() {
        let store = seeded();
        let entry = authenticate(&store, "alice", "pw-a").unwrap().unwrap();
        assert_eq!(entry.company_id, "acmid");
        assert!(authenticate(&store, "alice", "pw-b").unwrap().is_none());
        assert!(authenticate(&store, "carol", "pw-a").unwrap().is_none());
    }
}
