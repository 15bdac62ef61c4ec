//! Typed operation arguments.
//!
//! Every lifecycle operation takes the full field set of the bill, since the
//! ledger only supports whole-record overwrites. The positional decoders
//! accept the argument order used on the wire; the JSON forms use the
//! ledger's own field names (`BillInfoID`, `PayBillID`, ...).

use serde::{Deserialize, Serialize};

use billchain_types::{Bill, BillError, BillId, BillMessage, BillState, Party};

use crate::ContractError;

/// Instrument facts and the four role pairs of a bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "json::BillArgsJson", into = "json::BillArgsJson")]
pub struct BillArgs {
    pub id: BillId,
    pub money: String,
    pub bill_type: String,
    pub issue_date: String,
    pub due_date: String,
    pub issuer: Party,
    pub payer: Party,
    pub acceptor: Party,
    pub holder: Party,
}

impl BillArgs {
    pub const ARITY: usize = 13;

    /// Carry every field of an existing record forward.
    pub fn from_bill(bill: &Bill) -> Self {
        Self {
            id: bill.id.clone(),
            money: bill.money.clone(),
            bill_type: bill.bill_type.clone(),
            issue_date: bill.issue_date.clone(),
            due_date: bill.due_date.clone(),
            issuer: bill.issuer(),
            payer: bill.payer(),
            acceptor: bill.acceptor(),
            holder: bill.holder(),
        }
    }

    /// `id, money, type, issueDate, dueDate, pubId, pubName, payId, payName,
    /// acceptId, acceptName, holdId, holdName`.
    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        expect_arity(function, args, Self::ARITY)?;
        Self::from_fields(args)
    }

    fn from_fields(args: &[String]) -> Result<Self, ContractError> {
        let party = |i: usize| Party::new(&args[i], &args[i + 1]);
        Ok(Self {
            id: BillId::parse(&args[0])?,
            money: args[1].clone(),
            bill_type: args[2].clone(),
            issue_date: args[3].clone(),
            due_date: args[4].clone(),
            issuer: party(5),
            payer: party(7),
            acceptor: party(9),
            holder: party(11),
        })
    }

    /// The record these arguments describe, endorsement cleared.
    pub fn to_bill(&self, state: BillState, message: BillMessage) -> Bill {
        Bill {
            id: self.id.clone(),
            money: self.money.clone(),
            bill_type: self.bill_type.clone(),
            issue_date: self.issue_date.clone(),
            due_date: self.due_date.clone(),
            pub_id: self.issuer.id.clone(),
            pub_name: self.issuer.name.clone(),
            pay_id: self.payer.id.clone(),
            pay_name: self.payer.name.clone(),
            accept_id: self.acceptor.id.clone(),
            accept_name: self.acceptor.name.clone(),
            hold_id: self.holder.id.clone(),
            hold_name: self.holder.name.clone(),
            endorsed_id: String::new(),
            endorsed_name: String::new(),
            message,
            state,
        }
    }
}

/// Full field set plus the proposed endorsee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "json::EndorseArgsJson", into = "json::EndorseArgsJson")]
pub struct EndorseArgs {
    pub bill: BillArgs,
    pub endorsee: Party,
}

impl EndorseArgs {
    pub const ARITY: usize = BillArgs::ARITY + 2;

    pub fn new(bill: BillArgs, endorsee: Party) -> Self {
        Self { bill, endorsee }
    }

    /// [`BillArgs`] order followed by `endorsedId, endorsedName`.
    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        expect_arity(function, args, Self::ARITY)?;
        Ok(Self {
            bill: BillArgs::from_fields(&args[..BillArgs::ARITY])?,
            endorsee: Party::new(&args[13], &args[14]),
        })
    }
}

/// New payer for an existing bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "json::ChangePayerArgsJson", into = "json::ChangePayerArgsJson")]
pub struct ChangePayerArgs {
    pub id: BillId,
    pub payer: Party,
}

impl ChangePayerArgs {
    pub const ARITY: usize = 3;

    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        expect_arity(function, args, Self::ARITY)?;
        Ok(Self {
            id: BillId::parse(&args[0])?,
            payer: Party::new(&args[1], &args[2]),
        })
    }
}

/// New beneficiary and holder for an existing bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "json::ChangeHolderArgsJson", into = "json::ChangeHolderArgsJson")]
pub struct ChangeHolderArgs {
    pub id: BillId,
    pub acceptor: Party,
    pub holder: Party,
}

impl ChangeHolderArgs {
    pub const ARITY: usize = 5;

    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        expect_arity(function, args, Self::ARITY)?;
        Ok(Self {
            id: BillId::parse(&args[0])?,
            acceptor: Party::new(&args[1], &args[2]),
            holder: Party::new(&args[3], &args[4]),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "json::ChangeStateArgsJson", into = "json::ChangeStateArgsJson")]
pub struct ChangeStateArgs {
    pub id: BillId,
    pub state: BillState,
}

impl ChangeStateArgs {
    pub const ARITY: usize = 2;

    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        expect_arity(function, args, Self::ARITY)?;
        Ok(Self {
            id: BillId::parse(&args[0])?,
            state: args[1].parse()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "json::ChangeMessageArgsJson", into = "json::ChangeMessageArgsJson")]
pub struct ChangeMessageArgs {
    pub id: BillId,
    pub message: BillMessage,
}

impl ChangeMessageArgs {
    pub const ARITY: usize = 2;

    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        expect_arity(function, args, Self::ARITY)?;
        Ok(Self {
            id: BillId::parse(&args[0])?,
            message: args[1].parse()?,
        })
    }
}

pub(crate) fn expect_arity(
    function: &str,
    args: &[String],
    expected: usize,
) -> Result<(), ContractError> {
    if args.len() != expected {
        return Err(ContractError::MalformedArgument(format!(
            "{function} takes {expected} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

/// Ledger-named JSON forms of the argument structs.
mod json {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct BillArgsJson {
        #[serde(rename = "BillInfoID")]
        id: String,
        #[serde(rename = "BillInfoMoney")]
        money: String,
        #[serde(rename = "BillInfoType")]
        bill_type: String,
        #[serde(rename = "BillInfoIssueDate")]
        issue_date: String,
        #[serde(rename = "BillInfoDueDate")]
        due_date: String,
        #[serde(rename = "PubBillID")]
        pub_id: String,
        #[serde(rename = "PubBillName")]
        pub_name: String,
        #[serde(rename = "PayBillID")]
        pay_id: String,
        #[serde(rename = "PayBillName")]
        pay_name: String,
        #[serde(rename = "AcceptBillID")]
        accept_id: String,
        #[serde(rename = "AcceptBillName")]
        accept_name: String,
        #[serde(rename = "HoldBillID")]
        hold_id: String,
        #[serde(rename = "HoldBillName")]
        hold_name: String,
    }

    impl TryFrom<BillArgsJson> for BillArgs {
        type Error = BillError;

        fn try_from(raw: BillArgsJson) -> Result<Self, BillError> {
            Ok(Self {
                id: BillId::parse(raw.id)?,
                money: raw.money,
                bill_type: raw.bill_type,
                issue_date: raw.issue_date,
                due_date: raw.due_date,
                issuer: Party::new(raw.pub_id, raw.pub_name),
                payer: Party::new(raw.pay_id, raw.pay_name),
                acceptor: Party::new(raw.accept_id, raw.accept_name),
                holder: Party::new(raw.hold_id, raw.hold_name),
            })
        }
    }

    impl From<BillArgs> for BillArgsJson {
        fn from(args: BillArgs) -> Self {
            Self {
                id: args.id.as_str().to_string(),
                money: args.money,
                bill_type: args.bill_type,
                issue_date: args.issue_date,
                due_date: args.due_date,
                pub_id: args.issuer.id,
                pub_name: args.issuer.name,
                pay_id: args.payer.id,
                pay_name: args.payer.name,
                accept_id: args.acceptor.id,
                accept_name: args.acceptor.name,
                hold_id: args.holder.id,
                hold_name: args.holder.name,
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub struct EndorseArgsJson {
        #[serde(flatten)]
        bill: BillArgsJson,
        #[serde(rename = "EndorsedID")]
        endorsed_id: String,
        #[serde(rename = "EndorsedName")]
        endorsed_name: String,
    }

    impl TryFrom<EndorseArgsJson> for EndorseArgs {
        type Error = BillError;

        fn try_from(raw: EndorseArgsJson) -> Result<Self, BillError> {
            Ok(Self {
                bill: raw.bill.try_into()?,
                endorsee: Party::new(raw.endorsed_id, raw.endorsed_name),
            })
        }
    }

    impl From<EndorseArgs> for EndorseArgsJson {
        fn from(args: EndorseArgs) -> Self {
            Self {
                bill: args.bill.into(),
                endorsed_id: args.endorsee.id,
                endorsed_name: args.endorsee.name,
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub struct ChangePayerArgsJson {
        #[serde(rename = "BillInfoID")]
        id: String,
        #[serde(rename = "PayBillID")]
        pay_id: String,
        #[serde(rename = "PayBillName")]
        pay_name: String,
    }

    impl TryFrom<ChangePayerArgsJson> for ChangePayerArgs {
        type Error = BillError;

        fn try_from(raw: ChangePayerArgsJson) -> Result<Self, BillError> {
            Ok(Self {
                id: BillId::parse(raw.id)?,
                payer: Party::new(raw.pay_id, raw.pay_name),
            })
        }
    }

    impl From<ChangePayerArgs> for ChangePayerArgsJson {
        fn from(args: ChangePayerArgs) -> Self {
            Self {
                id: args.id.as_str().to_string(),
                pay_id: args.payer.id,
                pay_name: args.payer.name,
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub struct ChangeHolderArgsJson {
        #[serde(rename = "BillInfoID")]
        id: String,
        #[serde(rename = "AcceptBillID")]
        accept_id: String,
        #[serde(rename = "AcceptBillName")]
        accept_name: String,
        #[serde(rename = "HoldBillID")]
        hold_id: String,
        #[serde(rename = "HoldBillName")]
        hold_name: String,
    }

    impl TryFrom<ChangeHolderArgsJson> for ChangeHolderArgs {
        type Error = BillError;

        fn try_from(raw: ChangeHolderArgsJson) -> Result<Self, BillError> {
            Ok(Self {
                id: BillId::parse(raw.id)?,
                acceptor: Party::new(raw.accept_id, raw.accept_name),
                holder: Party::new(raw.hold_id, raw.hold_name),
            })
        }
    }

    impl From<ChangeHolderArgs> for ChangeHolderArgsJson {
        fn from(args: ChangeHolderArgs) -> Self {
            Self {
                id: args.id.as_str().to_string(),
                accept_id: args.acceptor.id,
                accept_name: args.acceptor.name,
                hold_id: args.holder.id,
                hold_name: args.holder.name,
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub struct ChangeStateArgsJson {
        #[serde(rename = "BillInfoID")]
        id: String,
        #[serde(rename = "State")]
        state: BillState,
    }

    impl TryFrom<ChangeStateArgsJson> for ChangeStateArgs {
        type Error = BillError;

        fn try_from(raw: ChangeStateArgsJson) -> Result<Self, BillError> {
            Ok(Self {
                id: BillId::parse(raw.id)?,
                state: raw.state,
            })
        }
    }

    impl From<ChangeStateArgs> for ChangeStateArgsJson {
        fn from(args: ChangeStateArgs) -> Self {
            Self {
                id: args.id.as_str().to_string(),
                state: args.state,
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub struct ChangeMessageArgsJson {
        #[serde(rename = "BillInfoID")]
        id: String,
        #[serde(rename = "Message")]
        message: BillMessage,
    }

    impl TryFrom<ChangeMessageArgsJson> for ChangeMessageArgs {
        type Error = BillError;

        fn try_from(raw: ChangeMessageArgsJson) -> Result<Self, BillError> {
            Ok(Self {
                id: BillId::parse(raw.id)?,
                message: raw.message,
            })
        }
    }

    impl From<ChangeMessageArgs> for ChangeMessageArgsJson {
        fn from(args: ChangeMessageArgs) -> Self {
            Self {
                id: args.id.as_str().to_string(),
                message: args.message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn positional() -> Vec<String> {
        strings(&[
            "B1", "2000", "A", "2021-01-20", "2022-01-20", "bank", "Bank", "acmid", "A Co",
            "bcmid", "B Co", "bcmid", "B Co",
        ])
    }

    #[test]
    fn bill_args_positional_order() {
        let args = BillArgs::from_positional("issueBill", &positional()).unwrap();
        assert_eq!(args.id.as_str(), "B1");
        assert_eq!(args.money, "2000");
        assert_eq!(args.issuer, Party::new("bank", "Bank"));
        assert_eq!(args.payer, Party::new("acmid", "A Co"));
        assert_eq!(args.acceptor, Party::new("bcmid", "B Co"));
        assert_eq!(args.holder, Party::new("bcmid", "B Co"));
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let mut args = positional();
        args.pop();
        let result = BillArgs::from_positional("issueBill", &args);
        assert!(matches!(
            result.unwrap_err(),
            ContractError::MalformedArgument(_)
        ));
        assert!(ChangePayerArgs::from_positional("changeAccept", &strings(&["B1"])).is_err());
    }

    #[test]
    fn blank_id_is_malformed() {
        let mut args = positional();
        args[0] = "  ".into();
        assert!(matches!(
            BillArgs::from_positional("issueBill", &args).unwrap_err(),
            ContractError::MalformedArgument(_)
        ));
    }

    #[test]
    fn endorse_args_take_trailing_endorsee() {
        let mut args = positional();
        args.extend(strings(&["ccmid", "C Co"]));
        let endorse = EndorseArgs::from_positional("endorseBill", &args).unwrap();
        assert_eq!(endorse.endorsee, Party::new("ccmid", "C Co"));
        assert_eq!(endorse.bill.id.as_str(), "B1");
    }

    #[test]
    fn raw_state_and_message_must_be_known() {
        let ok = ChangeStateArgs::from_positional("changeState", &strings(&["B1", "waitpay"]));
        assert_eq!(ok.unwrap().state, BillState::WaitPay);
        assert!(
            ChangeStateArgs::from_positional("changeState", &strings(&["B1", "Public"])).is_err()
        );
        let cleared = ChangeMessageArgs::from_positional("changeMessage", &strings(&["B1", ""]));
        assert_eq!(cleared.unwrap().message, BillMessage::None);
    }

    #[test]
    fn from_bill_round_trips_through_to_bill() {
        let args = BillArgs::from_positional("issueBill", &positional()).unwrap();
        let bill = args.to_bill(BillState::Public, BillMessage::None);
        assert_eq!(BillArgs::from_bill(&bill), args);
        assert!(!bill.has_pending_endorsement());
    }

    #[test]
    fn json_form_uses_ledger_field_names() {
        let args = BillArgs::from_positional("issueBill", &positional()).unwrap();
        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(value["BillInfoID"], "B1");
        assert_eq!(value["BillInfoMoney"], "2000");
        assert_eq!(value["PubBillID"], "bank");
        assert_eq!(value["HoldBillName"], "B Co");
        assert_eq!(serde_json::from_value::<BillArgs>(value).unwrap(), args);

        let endorse: EndorseArgs = serde_json::from_value(json!({
            "BillInfoID": "B1", "BillInfoMoney": "2000", "BillInfoType": "A",
            "BillInfoIssueDate": "2021-01-20", "BillInfoDueDate": "2022-01-20",
            "PubBillID": "bank", "PubBillName": "Bank",
            "PayBillID": "acmid", "PayBillName": "A Co",
            "AcceptBillID": "bcmid", "AcceptBillName": "B Co",
            "HoldBillID": "bcmid", "HoldBillName": "B Co",
            "EndorsedID": "ccmid", "EndorsedName": "C Co",
        }))
        .unwrap();
        assert_eq!(endorse.bill, args);
        assert_eq!(endorse.endorsee, Party::new("ccmid", "C Co"));

        let payer: ChangePayerArgs = serde_json::from_value(
            json!({"BillInfoID": "B1", "PayBillID": "ccmid", "PayBillName": "C Co"}),
        )
        .unwrap();
        assert_eq!(payer.payer, Party::new("ccmid", "C Co"));
        let state: ChangeStateArgs =
            serde_json::from_value(json!({"BillInfoID": "B1", "State": "public"})).unwrap();
        assert_eq!(state.state, BillState::Public);
    }

    #[test]
    fn json_form_rejects_blank_id_and_rust_field_names() {
        assert!(serde_json::from_value::<ChangeMessageArgs>(
            json!({"BillInfoID": " ", "Message": ""})
        )
        .is_err());
        assert!(serde_json::from_value::<ChangePayerArgs>(
            json!({"id": "B1", "payer": {"id": "x", "name": "y"}})
        )
        .is_err());
    }
}
