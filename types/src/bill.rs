//! The bill record as persisted on the ledger.
//!
//! The JSON field names below are the storage format. Every committed
//! version of a bill stays retrievable through key history, so these names
//! and their string value types must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BillError, BillMessage, BillState, Party};

/// Immutable primary key of a bill.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(String);

impl BillId {
    /// Validate and wrap a raw bill identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, BillError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(BillError::EmptyBillId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BillId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A negotiable instrument and its four counterparty roles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "BillInfoID")]
    pub id: BillId,
    #[serde(rename = "BillInfoMoney")]
    pub money: String,
    #[serde(rename = "BillInfoType")]
    pub bill_type: String,
    #[serde(rename = "BillInfoIssueDate")]
    pub issue_date: String,
    #[serde(rename = "BillInfoDueDate")]
    pub due_date: String,

    /// Issuer.
    #[serde(rename = "PubBillID")]
    pub pub_id: String,
    #[serde(rename = "PubBillName")]
    pub pub_name: String,
    /// Payer (acceptor of payment).
    #[serde(rename = "PayBillID")]
    pub pay_id: String,
    #[serde(rename = "PayBillName")]
    pub pay_name: String,
    /// Beneficiary.
    #[serde(rename = "AcceptBillID")]
    pub accept_id: String,
    #[serde(rename = "AcceptBillName")]
    pub accept_name: String,
    /// Current holder; the authoritative owner of economic rights.
    #[serde(rename = "HoldBillID")]
    pub hold_id: String,
    #[serde(rename = "HoldBillName")]
    pub hold_name: String,

    /// Endorsee of a pending endorsement proposal; empty otherwise.
    #[serde(rename = "EndorsedID")]
    pub endorsed_id: String,
    #[serde(rename = "EndorsedName")]
    pub endorsed_name: String,

    #[serde(rename = "Message")]
    pub message: BillMessage,
    #[serde(rename = "State")]
    pub state: BillState,
}

impl Bill {
    /// The voided form of a bill: only the id, message and state survive.
    pub fn voided(id: BillId) -> Self {
        Self {
            id,
            money: String::new(),
            bill_type: String::new(),
            issue_date: String::new(),
            due_date: String::new(),
            pub_id: String::new(),
            pub_name: String::new(),
            pay_id: String::new(),
            pay_name: String::new(),
            accept_id: String::new(),
            accept_name: String::new(),
            hold_id: String::new(),
            hold_name: String::new(),
            endorsed_id: String::new(),
            endorsed_name: String::new(),
            message: BillMessage::WaitPayFail,
            state: BillState::BillFail,
        }
    }

    pub fn issuer(&self) -> Party {
        Party::new(&self.pub_id, &self.pub_name)
    }

    pub fn payer(&self) -> Party {
        Party::new(&self.pay_id, &self.pay_name)
    }

    pub fn acceptor(&self) -> Party {
        Party::new(&self.accept_id, &self.accept_name)
    }

    pub fn holder(&self) -> Party {
        Party::new(&self.hold_id, &self.hold_name)
    }

    pub fn endorsee(&self) -> Party {
        Party::new(&self.endorsed_id, &self.endorsed_name)
    }

    pub fn set_payer(&mut self, party: Party) {
        self.pay_id = party.id;
        self.pay_name = party.name;
    }

    pub fn set_acceptor(&mut self, party: Party) {
        self.accept_id = party.id;
        self.accept_name = party.name;
    }

    pub fn set_holder(&mut self, party: Party) {
        self.hold_id = party.id;
        self.hold_name = party.name;
    }

    pub fn set_endorsee(&mut self, party: Party) {
        self.endorsed_id = party.id;
        self.endorsed_name = party.name;
    }

    pub fn clear_endorsee(&mut self) {
        self.set_endorsee(Party::empty());
    }

    /// Whether an endorsement proposal is recorded on this bill.
    pub fn has_pending_endorsement(&self) -> bool {
        !self.endorsee().is_empty()
    }
}
