//! Read-only bill queries: point reads, scans, predicate search and
//! history replay.

use serde::Serialize;

use billchain_store::{composite_key, KeyValue, LedgerStore, Selector};
use billchain_types::{Bill, BillId, BillState, Timestamp};

use crate::keys::{bill_key, decode, read_bill, BILL_PREFIX};
use crate::ContractError;

/// Supported field-equality searches over bill records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BillPredicate {
    State(BillState),
    StateAndPayer(BillState, String),
    StateAndAcceptor(BillState, String),
    StateAndHolder(BillState, String),
    StateAndEndorsee(BillState, String),
}

impl BillPredicate {
    pub fn state(&self) -> BillState {
        match self {
            BillPredicate::State(s)
            | BillPredicate::StateAndPayer(s, _)
            | BillPredicate::StateAndAcceptor(s, _)
            | BillPredicate::StateAndHolder(s, _)
            | BillPredicate::StateAndEndorsee(s, _) => *s,
        }
    }

    /// Second conjunct as `(field, value)`, if any.
    fn party_field(&self) -> Option<(&'static str, &str)> {
        match self {
            BillPredicate::State(_) => None,
            BillPredicate::StateAndPayer(_, id) => Some(("PayBillID", id)),
            BillPredicate::StateAndAcceptor(_, id) => Some(("AcceptBillID", id)),
            BillPredicate::StateAndHolder(_, id) => Some(("HoldBillID", id)),
            BillPredicate::StateAndEndorsee(_, id) => Some(("EndorsedID", id)),
        }
    }

    pub fn selector(&self) -> Selector {
        let selector = Selector::new().field_eq("State", self.state().as_str());
        match self.party_field() {
            Some((field, value)) => selector.field_eq(field, value),
            None => selector,
        }
    }

    pub fn matches(&self, bill: &Bill) -> bool {
        if bill.state != self.state() {
            return false;
        }
        match self {
            BillPredicate::State(_) => true,
            BillPredicate::StateAndPayer(_, id) => &bill.pay_id == id,
            BillPredicate::StateAndAcceptor(_, id) => &bill.accept_id == id,
            BillPredicate::StateAndHolder(_, id) => &bill.hold_id == id,
            BillPredicate::StateAndEndorsee(_, id) => &bill.endorsed_id == id,
        }
    }
}

/// Phase label used by the owner/phase history queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerPhase {
    Public,
    Made,
}

impl OwnerPhase {
    pub fn label(&self) -> &'static str {
        match self {
            OwnerPhase::Public => "Public",
            OwnerPhase::Made => "Made",
        }
    }
}

/// One committed version of a bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BillVersion {
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub is_delete: bool,
    pub bill: Bill,
}

#[derive(Clone, Debug)]
pub struct BillQueries {
    legacy_owner_phase_queries: bool,
}

impl Default for BillQueries {
    fn default() -> Self {
        Self {
            legacy_owner_phase_queries: true,
        }
    }
}

impl BillQueries {
    pub fn new(legacy_owner_phase_queries: bool) -> Self {
        Self {
            legacy_owner_phase_queries,
        }
    }

    pub fn legacy_owner_phase_queries(&self) -> bool {
        self.legacy_owner_phase_queries
    }

    /// Current record of `id`.
    pub fn get_bill<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &BillId,
    ) -> Result<Bill, ContractError> {
        let key = bill_key(id)?;
        read_bill(store, &key)?.ok_or_else(|| ContractError::NotFound(id.to_string()))
    }

    /// Every bill in ledger key order.
    pub fn scan_all<S: LedgerStore + ?Sized>(&self, store: &S) -> Result<Vec<Bill>, ContractError> {
        decode_all(store.prefix_scan(BILL_PREFIX)?)
    }

    /// Bills satisfying every conjunct of `predicate`, in key order.
    pub fn find<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        predicate: &BillPredicate,
    ) -> Result<Vec<Bill>, ContractError> {
        let hits = store
            .rich_query(&predicate.selector())?
            .into_iter()
            .filter(|kv| kv.key.starts_with(BILL_PREFIX))
            .collect();
        Ok(decode_all(hits)?
            .into_iter()
            .filter(|bill| predicate.matches(bill))
            .collect())
    }

    pub fn wait_discount_bills<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<Bill>, ContractError> {
        self.find(store, &BillPredicate::State(BillState::DcWaitSigned))
    }

    /// Bills awaiting acceptance by `payer`. The id is matched lower-cased.
    pub fn wait_pay_bills<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        payer: &str,
    ) -> Result<Vec<Bill>, ContractError> {
        self.find(
            store,
            &BillPredicate::StateAndPayer(BillState::Made, payer.to_lowercase()),
        )
    }

    pub fn pay_bills<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        payer: &str,
    ) -> Result<Vec<Bill>, ContractError> {
        self.find(
            store,
            &BillPredicate::StateAndPayer(BillState::Public, payer.to_string()),
        )
    }

    pub fn accept_bills<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        acceptor: &str,
    ) -> Result<Vec<Bill>, ContractError> {
        self.find(
            store,
            &BillPredicate::StateAndAcceptor(BillState::Public, acceptor.to_string()),
        )
    }

    pub fn hold_bills<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        holder: &str,
    ) -> Result<Vec<Bill>, ContractError> {
        self.find(
            store,
            &BillPredicate::StateAndHolder(BillState::Public, holder.to_string()),
        )
    }

    pub fn wait_endorse_bills<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        endorsee: &str,
    ) -> Result<Vec<Bill>, ContractError> {
        self.find(
            store,
            &BillPredicate::StateAndEndorsee(BillState::EnWaitSign, endorsee.to_string()),
        )
    }

    /// Every committed version of `id`, oldest first. Empty if never written.
    pub fn history_of<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &BillId,
    ) -> Result<Vec<Bill>, ContractError> {
        Ok(self
            .history_entries(store, id)?
            .into_iter()
            .map(|version| version.bill)
            .collect())
    }

    /// [`history_of`](Self::history_of) with transaction metadata.
    pub fn history_entries<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &BillId,
    ) -> Result<Vec<BillVersion>, ContractError> {
        let key = bill_key(id)?;
        replay(store, &key)
    }

    /// History of the `searchkey` composite key built from `(user, phase)`.
    ///
    /// This replays the composite key's own version chain, not the user's
    /// bills. Nothing writes that key, so the result is normally empty.
    pub fn legacy_owner_phase_history<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        user: &str,
        phase: OwnerPhase,
    ) -> Result<Vec<Bill>, ContractError> {
        if !self.legacy_owner_phase_queries {
            return Err(ContractError::Unsupported(format!(
                "owner/phase history query ({})",
                phase.label()
            )));
        }
        let key = composite_key("searchkey", &[user, phase.label()])?;
        Ok(replay(store, &key)?
            .into_iter()
            .map(|version| version.bill)
            .collect())
    }
}

fn decode_all(entries: Vec<KeyValue>) -> Result<Vec<Bill>, ContractError> {
    entries
        .iter()
        .map(|kv| decode(&kv.key, &kv.value))
        .collect()
}

fn replay<S: LedgerStore + ?Sized>(store: &S, key: &str) -> Result<Vec<BillVersion>, ContractError> {
    store
        .history_of(key)?
        .into_iter()
        .map(|m| -> Result<BillVersion, ContractError> {
            Ok(BillVersion {
                bill: decode(key, &m.value)?,
                tx_id: m.tx_id,
                timestamp: m.timestamp,
                is_delete: m.is_delete,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use billchain_nullables::NullLedgerStore;
    use billchain_types::{BillMessage, Party};

    use crate::args::BillArgs;
    use crate::keys::write_bill;

    fn bill(id: &str, state: BillState, payer: &str) -> Bill {
        BillArgs {
            id: BillId::parse(id).unwrap(),
            money: "100".into(),
            bill_type: "A".into(),
            issue_date: "2021-01-01".into(),
            due_date: "2022-01-01".into(),
            issuer: Party::new("bank", "Bank"),
            payer: Party::new(payer, "Payer"),
            acceptor: Party::new("acmid", "A Co"),
            holder: Party::new("acmid", "A Co"),
        }
        .to_bill(state, BillMessage::None)
    }

    fn seed(store: &NullLedgerStore, bills: &[Bill]) {
        for b in bills {
            write_bill(store, &bill_key(&b.id).unwrap(), b).unwrap();
        }
    }

    #[test]
    fn get_bill_not_found_is_distinct() {
        let store = NullLedgerStore::new();
        let err = BillQueries::default()
            .get_bill(&store, &BillId::parse("X1").unwrap())
            .unwrap_err();
        assert!(matches!(err, ContractError::NotFound(_)));
        assert_eq!(err.to_string(), "X1 does not exist");
    }

    #[test]
    fn scan_all_skips_registry_namespace() {
        let store = NullLedgerStore::new();
        seed(&store, &[bill("B2", BillState::Made, "x"), bill("B1", BillState::Public, "x")]);
        store.put("user:alice", br#"{"Username":"alice"}"#).unwrap();
        let ids: Vec<String> = BillQueries::default()
            .scan_all(&store)
            .unwrap()
            .into_iter()
            .map(|b| b.id.to_string())
            .collect();
        assert_eq!(ids, vec!["B1", "B2"]);
    }

    #[test]
    fn find_returns_only_matching_subset() {
        let store = NullLedgerStore::new();
        seed(
            &store,
            &[
                bill("B1", BillState::Made, "acmid"),
                bill("B2", BillState::Public, "acmid"),
                bill("B3", BillState::DcWaitSigned, "acmid"),
            ],
        );
        let queries = BillQueries::default();
        let hits = queries.wait_discount_bills(&store).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "B3");

        assert_eq!(queries.pay_bills(&store, "acmid").unwrap().len(), 1);
        assert!(queries.pay_bills(&store, "bcmid").unwrap().is_empty());
        assert_eq!(queries.accept_bills(&store, "acmid").unwrap()[0].id.as_str(), "B2");
        assert_eq!(queries.hold_bills(&store, "acmid").unwrap().len(), 1);
    }

    #[test]
    fn wait_pay_lowercases_payer() {
        let store = NullLedgerStore::new();
        seed(&store, &[bill("B1", BillState::Made, "acmid")]);
        let queries = BillQueries::default();
        assert_eq!(queries.wait_pay_bills(&store, "ACMID").unwrap().len(), 1);

        seed(&store, &[bill("B2", BillState::Made, "BCMID")]);
        assert!(queries.wait_pay_bills(&store, "BCMID").unwrap().is_empty());
    }

    #[test]
    fn wait_endorse_matches_endorsee() {
        let store = NullLedgerStore::new();
        let mut pending = bill("B1", BillState::EnWaitSign, "x");
        pending.set_endorsee(Party::new("ccmid", "C Co"));
        seed(&store, &[pending, bill("B2", BillState::EnWaitSign, "x")]);
        let hits = BillQueries::default()
            .wait_endorse_bills(&store, "ccmid")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "B1");
    }

    #[test]
    fn predicate_selector_mirrors_matches() {
        let predicate = BillPredicate::StateAndHolder(BillState::Public, "acmid".into());
        assert_eq!(
            predicate.selector().to_query_string(),
            r#"{"selector":{"HoldBillID":"acmid","State":"public"}}"#
        );
        assert!(predicate.matches(&bill("B1", BillState::Public, "x")));
        assert!(!predicate.matches(&bill("B1", BillState::Made, "x")));
    }

    #[test]
    fn history_entries_carry_transaction_ids() {
        let store = NullLedgerStore::new();
        let mut b = bill("B1", BillState::Made, "x");
        seed(&store, &[b.clone()]);
        b.state = BillState::Public;
        seed(&store, &[b]);

        let entries = BillQueries::default()
            .history_entries(&store, &BillId::parse("B1").unwrap())
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].bill.state, BillState::Made);
        assert_eq!(entries[1].bill.state, BillState::Public);
        assert_ne!(entries[0].tx_id, entries[1].tx_id);
        assert!(BillQueries::default()
            .history_of(&store, &BillId::parse("B9").unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn legacy_owner_phase_history_reads_composite_key() {
        let store = NullLedgerStore::new();
        seed(&store, &[bill("B1", BillState::Public, "acmid")]);
        let queries = BillQueries::default();
        // The user's bills are not returned.
        assert!(queries
            .legacy_owner_phase_history(&store, "acmid", OwnerPhase::Public)
            .unwrap()
            .is_empty());

        let key = composite_key("searchkey", &["acmid", "Made"]).unwrap();
        write_bill(&store, &key, &bill("ghost", BillState::Made, "acmid")).unwrap();
        let replayed = queries
            .legacy_owner_phase_history(&store, "acmid", OwnerPhase::Made)
            .unwrap();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].id.as_str(), "ghost");
    }

    #[test]
    fn legacy_owner_phase_history_can_be_disabled() {
        let store = NullLedgerStore::new();
        let result = BillQueries::new(false).legacy_owner_phase_history(
            &store,
            "acmid",
            OwnerPhase::Public,
        );
        assert!(matches!(result.unwrap_err(), ContractError::Unsupported(_)));
    }
}
