//! Lifecycle state and last-operation outcome enums for bills.
//!
//! Both enums are persisted as the exact lowercase strings the ledger has
//! always stored, so every historical version stays decodable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::BillError;

/// The lifecycle phase of a bill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BillState {
    /// Issued, waiting for the payer to accept.
    Made,
    /// Accepted and circulating; no operation pending.
    Public,
    /// An endorsement proposal is waiting for the endorsee.
    EnWaitSign,
    /// A discount proposal is waiting for counterparty sign-off.
    DcWaitSigned,
    /// Waiting for payment at maturity.
    WaitPay,
    /// Payment refused; the bill is void.
    BillFail,
}

impl BillState {
    pub const ALL: [BillState; 6] = [
        Self::Made,
        Self::Public,
        Self::EnWaitSign,
        Self::DcWaitSigned,
        Self::WaitPay,
        Self::BillFail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Made => "made",
            Self::Public => "public",
            Self::EnWaitSign => "enwaitsign",
            Self::DcWaitSigned => "dcwaitsigned",
            Self::WaitPay => "waitpay",
            Self::BillFail => "billfail",
        }
    }

    /// Whether no further lifecycle transition may leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::BillFail)
    }
}

impl FromStr for BillState {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| BillError::UnknownState(s.to_string()))
    }
}

impl TryFrom<String> for BillState {
    type Error = BillError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BillState> for String {
    fn from(state: BillState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for BillState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome tag of the last operation applied to a bill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BillMessage {
    /// No outcome recorded (stored as the empty string).
    #[default]
    None,
    EndorseSuccess,
    EndorseFail,
    DiscountSuccess,
    DiscountFail,
    WaitPaySuccess,
    WaitPayFail,
}

impl BillMessage {
    pub const ALL: [BillMessage; 7] = [
        Self::None,
        Self::EndorseSuccess,
        Self::EndorseFail,
        Self::DiscountSuccess,
        Self::DiscountFail,
        Self::WaitPaySuccess,
        Self::WaitPayFail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::EndorseSuccess => "endorsesuccess",
            Self::EndorseFail => "endorsefail",
            Self::DiscountSuccess => "discountsuccess",
            Self::DiscountFail => "discountfail",
            Self::WaitPaySuccess => "waitpaysuccess",
            Self::WaitPayFail => "waitpayfail",
        }
    }
}

impl FromStr for BillMessage {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|message| message.as_str() == s)
            .ok_or_else(|| BillError::UnknownMessage(s.to_string()))
    }
}

impl TryFrom<String> for BillMessage {
    type Error = BillError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BillMessage> for String {
    fn from(message: BillMessage) -> Self {
        message.as_str().to_string()
    }
}

impl fmt::Display for BillMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
