//! Ledger key layout and record encoding.
//!
//! Bills and registry entries share one store under disjoint prefixes so a
//! bill id can never shadow a username.

use serde::de::DeserializeOwned;
use serde::Serialize;

use billchain_store::LedgerStore;
use billchain_types::{Bill, BillError, BillId};

use crate::ContractError;

pub const BILL_PREFIX: &str = "bill:";
pub const USER_PREFIX: &str = "user:";

/// Ledger key of a bill. Blank ids are rejected before any store access.
pub fn bill_key(id: &BillId) -> Result<String, ContractError> {
    if id.as_str().trim().is_empty() {
        return Err(BillError::EmptyBillId.into());
    }
    Ok(format!("{BILL_PREFIX}{id}"))
}

pub fn user_key(username: &str) -> Result<String, ContractError> {
    if username.is_empty() {
        return Err(ContractError::MalformedArgument(
            "username must not be empty".into(),
        ));
    }
    Ok(format!("{USER_PREFIX}{username}"))
}

pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(record).map_err(|e| ContractError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, ContractError> {
    serde_json::from_slice(bytes).map_err(|e| ContractError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn read_bill<S: LedgerStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<Bill>, ContractError> {
    store
        .get(key)?
        .map(|bytes| decode(key, &bytes))
        .transpose()
}

pub(crate) fn write_bill<S: LedgerStore + ?Sized>(
    store: &S,
    key: &str,
    bill: &Bill,
) -> Result<(), ContractError> {
    store.put(key, &encode(bill)?)?;
    Ok(())
}
