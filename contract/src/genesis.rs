//! Seed data written by `initLedger`: three public bills issued by the bank
//! and the four registry users.

use billchain_store::LedgerStore;
use billchain_types::{Bill, BillId, BillMessage, BillState, Party, SignInfo};
use tracing::info;

use crate::args::BillArgs;
use crate::keys::{bill_key, write_bill};
use crate::registry::register;
use crate::ContractError;

pub const GENESIS_PASSWORD: &str = "123456";

struct SeedBill {
    id: &'static str,
    money: &'static str,
    bill_type: &'static str,
    issue_date: &'static str,
    payer: (&'static str, &'static str),
    holder: (&'static str, &'static str),
}

const DUE_DATE: &str = "2022-01-20";
const ISSUER: (&str, &str) = ("bank", "银行");

const SEED_BILLS: [SeedBill; 3] = [
    SeedBill {
        id: "POA10000998",
        money: "2000",
        bill_type: "A",
        issue_date: "2021-01-20",
        payer: ("ccmid", "C公司"),
        holder: ("acmid", "A公司"),
    },
    SeedBill {
        id: "POB10000998",
        money: "3000",
        bill_type: "B",
        issue_date: "2021-02-10",
        payer: ("acmid", "A公司"),
        holder: ("bcmid", "B公司"),
    },
    SeedBill {
        id: "POC10000998",
        money: "40000",
        bill_type: "C",
        issue_date: "2020-08-23",
        // Seeded as recorded; does not match any registry company id.
        payer: ("bmcid", "B公司"),
        holder: ("ccmid", "C公司"),
    },
];

const SEED_USERS: [(&str, &str, &str); 4] = [
    ("admin", "管理员", "bank"),
    ("alice", "A公司", "acmid"),
    ("bob", "B公司", "bcmid"),
    ("carle", "C公司", "ccmid"),
];

/// The seed bills, in `public` state with the holder as beneficiary.
pub fn genesis_bills() -> Result<Vec<Bill>, ContractError> {
    SEED_BILLS
        .iter()
        .map(|seed| -> Result<Bill, ContractError> {
            let holder = Party::new(seed.holder.0, seed.holder.1);
            let args = BillArgs {
                id: BillId::parse(seed.id)?,
                money: seed.money.into(),
                bill_type: seed.bill_type.into(),
                issue_date: seed.issue_date.into(),
                due_date: DUE_DATE.into(),
                issuer: Party::new(ISSUER.0, ISSUER.1),
                payer: Party::new(seed.payer.0, seed.payer.1),
                acceptor: holder.clone(),
                holder,
            };
            Ok(args.to_bill(BillState::Public, BillMessage::None))
        })
        .collect()
}

pub fn genesis_users() -> Vec<SignInfo> {
    SEED_USERS
        .iter()
        .map(|(username, company_name, company_id)| {
            SignInfo::new(*username, GENESIS_PASSWORD, *company_name, *company_id)
        })
        .collect()
}

/// Write every seed bill and registry entry. Re-running overwrites them.
pub fn init_ledger<S: LedgerStore + ?Sized>(store: &S) -> Result<(), ContractError> {
    let bills = genesis_bills()?;
    for bill in &bills {
        write_bill(store, &bill_key(&bill.id)?, bill)?;
    }
    let users = genesis_users();
    for user in &users {
        register(store, user)?;
    }
    info!(bills = bills.len(), users = users.len(), "initialised ledger");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::BillQueries;
    use crate::registry::{authenticate, scan_registry};
    use billchain_nullables::NullLedgerStore;

    #[test]
    fn init_ledger_seeds_bills_and_users() {
        let store = NullLedgerStore::new();
        init_ledger(&store).unwrap();

        let bills = BillQueries::default().scan_all(&store).unwrap();
        let ids: Vec<&str> = bills.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["POA10000998", "POB10000998", "POC10000998"]);
        assert!(bills.iter().all(|b| b.state == BillState::Public));
        assert!(bills.iter().all(|b| b.pub_id == "bank"));
        assert_eq!(bills[1].money, "3000");
        assert_eq!(bills[1].hold_id, "bcmid");

        assert_eq!(scan_registry(&store).unwrap().len(), 4);
        let bob = authenticate(&store, "bob", "123456").unwrap().unwrap();
        assert_eq!(bob.company_id, "bcmid");
    }

    #[test]
    fn init_ledger_twice_appends_history() {
        let store = NullLedgerStore::new();
        init_ledger(&store).unwrap();
        init_ledger(&store).unwrap();
        assert_eq!(store.history_of("bill:POA10000998").unwrap().len(), 2);
        assert_eq!(store.commit_count(), 14);
    }
}
