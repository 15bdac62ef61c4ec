//! Named invocation of contract functions.
//!
//! Each wire function name maps to one typed [`Invocation`] variant; the
//! [`Dispatcher`] routes it to the contract, query engine or registry and
//! returns the result as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use billchain_store::LedgerStore;
use billchain_types::BillId;

use crate::args::{
    expect_arity, BillArgs, ChangeHolderArgs, ChangeMessageArgs, ChangePayerArgs,
    ChangeStateArgs, EndorseArgs,
};
use crate::contract::BillContract;
use crate::query::{BillQueries, OwnerPhase};
use crate::{genesis, registry, ContractError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args")]
pub enum Invocation {
    #[serde(rename = "initLedger")]
    InitLedger,
    #[serde(rename = "issueBill")]
    IssueBill(BillArgs),
    #[serde(rename = "agreePayBill")]
    AgreePayBill(BillArgs),
    #[serde(rename = "disagreePayBill")]
    DisagreePayBill(BillId),
    #[serde(rename = "discountBill")]
    DiscountBill(BillArgs),
    #[serde(rename = "agreeDiscountBill")]
    AgreeDiscountBill(BillArgs),
    #[serde(rename = "aDisagreeDiscountBill")]
    DisagreeDiscountBill(BillArgs),
    #[serde(rename = "endorseBill")]
    EndorseBill(EndorseArgs),
    #[serde(rename = "agreeEndorseBill")]
    AgreeEndorseBill(EndorseArgs),
    #[serde(rename = "disagreeEndorseBill")]
    DisagreeEndorseBill(BillArgs),
    #[serde(rename = "changeAccept")]
    ChangeAccept(ChangePayerArgs),
    #[serde(rename = "discountAndEndorse")]
    DiscountAndEndorse(ChangeHolderArgs),
    #[serde(rename = "changeState")]
    ChangeState(ChangeStateArgs),
    #[serde(rename = "changeMessage")]
    ChangeMessage(ChangeMessageArgs),
    #[serde(rename = "queryAllBill")]
    QueryAllBill,
    #[serde(rename = "queryBillById")]
    QueryBillById(BillId),
    #[serde(rename = "queryWaitDiscountBills")]
    QueryWaitDiscountBills,
    #[serde(rename = "queryWaitPayBills")]
    QueryWaitPayBills(String),
    #[serde(rename = "queryAllPayBills")]
    QueryAllPayBills(String),
    #[serde(rename = "queryAllAcceptBills")]
    QueryAllAcceptBills(String),
    #[serde(rename = "queryAllHoldBills")]
    QueryAllHoldBills(String),
    #[serde(rename = "queryWaitEndorseBills")]
    QueryWaitEndorseBills(String),
    #[serde(rename = "queryHistoryById", alias = "queryBillHistoryById")]
    QueryHistoryById(BillId),
    #[serde(rename = "querySignInfo")]
    QuerySignInfo,
    #[serde(rename = "queryMyBillByIdAndPay")]
    QueryMyBillByIdAndPay(String),
    #[serde(rename = "queryMyBillByIdAndUnpay")]
    QueryMyBillByIdAndUnpay(String),
}

impl Invocation {
    pub fn function_name(&self) -> &'static str {
        match self {
            Invocation::InitLedger => "initLedger",
            Invocation::IssueBill(_) => "issueBill",
            Invocation::AgreePayBill(_) => "agreePayBill",
            Invocation::DisagreePayBill(_) => "disagreePayBill",
            Invocation::DiscountBill(_) => "discountBill",
            Invocation::AgreeDiscountBill(_) => "agreeDiscountBill",
            Invocation::DisagreeDiscountBill(_) => "aDisagreeDiscountBill",
            Invocation::EndorseBill(_) => "endorseBill",
            Invocation::AgreeEndorseBill(_) => "agreeEndorseBill",
            Invocation::DisagreeEndorseBill(_) => "disagreeEndorseBill",
            Invocation::ChangeAccept(_) => "changeAccept",
            Invocation::DiscountAndEndorse(_) => "discountAndEndorse",
            Invocation::ChangeState(_) => "changeState",
            Invocation::ChangeMessage(_) => "changeMessage",
            Invocation::QueryAllBill => "queryAllBill",
            Invocation::QueryBillById(_) => "queryBillById",
            Invocation::QueryWaitDiscountBills => "queryWaitDiscountBills",
            Invocation::QueryWaitPayBills(_) => "queryWaitPayBills",
            Invocation::QueryAllPayBills(_) => "queryAllPayBills",
            Invocation::QueryAllAcceptBills(_) => "queryAllAcceptBills",
            Invocation::QueryAllHoldBills(_) => "queryAllHoldBills",
            Invocation::QueryWaitEndorseBills(_) => "queryWaitEndorseBills",
            Invocation::QueryHistoryById(_) => "queryHistoryById",
            Invocation::QuerySignInfo => "querySignInfo",
            Invocation::QueryMyBillByIdAndPay(_) => "queryMyBillByIdAndPay",
            Invocation::QueryMyBillByIdAndUnpay(_) => "queryMyBillByIdAndUnpay",
        }
    }

    /// Whether the function only reads the ledger.
    pub fn is_query(&self) -> bool {
        self.function_name().starts_with("query")
    }

    /// Decode a positional argument list for `function`.
    ///
    /// Rejects unknown functions and wrong arities without touching any store.
    pub fn from_positional(function: &str, args: &[String]) -> Result<Self, ContractError> {
        let one = || -> Result<String, ContractError> {
            expect_arity(function, args, 1)?;
            Ok(args[0].clone())
        };
        let id = || -> Result<BillId, ContractError> { Ok(BillId::parse(one()?)?) };
        let none = || expect_arity(function, args, 0);

        let invocation = match function {
            "initLedger" => none().map(|_| Invocation::InitLedger)?,
            "issueBill" => Invocation::IssueBill(BillArgs::from_positional(function, args)?),
            "agreePayBill" => Invocation::AgreePayBill(BillArgs::from_positional(function, args)?),
            "disagreePayBill" => Invocation::DisagreePayBill(id()?),
            "discountBill" => Invocation::DiscountBill(BillArgs::from_positional(function, args)?),
            "agreeDiscountBill" => {
                Invocation::AgreeDiscountBill(BillArgs::from_positional(function, args)?)
            }
            "aDisagreeDiscountBill" => {
                Invocation::DisagreeDiscountBill(BillArgs::from_positional(function, args)?)
            }
            "endorseBill" => Invocation::EndorseBill(EndorseArgs::from_positional(function, args)?),
            "agreeEndorseBill" => {
                Invocation::AgreeEndorseBill(EndorseArgs::from_positional(function, args)?)
            }
            "disagreeEndorseBill" => {
                Invocation::DisagreeEndorseBill(BillArgs::from_positional(function, args)?)
            }
            "changeAccept" => {
                Invocation::ChangeAccept(ChangePayerArgs::from_positional(function, args)?)
            }
            "discountAndEndorse" => {
                Invocation::DiscountAndEndorse(ChangeHolderArgs::from_positional(function, args)?)
            }
            "changeState" => {
                Invocation::ChangeState(ChangeStateArgs::from_positional(function, args)?)
            }
            "changeMessage" => {
                Invocation::ChangeMessage(ChangeMessageArgs::from_positional(function, args)?)
            }
            "queryAllBill" => none().map(|_| Invocation::QueryAllBill)?,
            "queryBillById" => Invocation::QueryBillById(id()?),
            "queryWaitDiscountBills" => none().map(|_| Invocation::QueryWaitDiscountBills)?,
            "queryWaitPayBills" => Invocation::QueryWaitPayBills(one()?),
            "queryAllPayBills" => Invocation::QueryAllPayBills(one()?),
            "queryAllAcceptBills" => Invocation::QueryAllAcceptBills(one()?),
            "queryAllHoldBills" => Invocation::QueryAllHoldBills(one()?),
            "queryWaitEndorseBills" => Invocation::QueryWaitEndorseBills(one()?),
            "queryHistoryById" | "queryBillHistoryById" => Invocation::QueryHistoryById(id()?),
            "querySignInfo" => none().map(|_| Invocation::QuerySignInfo)?,
            "queryMyBillByIdAndPay" => Invocation::QueryMyBillByIdAndPay(one()?),
            "queryMyBillByIdAndUnpay" => Invocation::QueryMyBillByIdAndUnpay(one()?),
            other => return Err(ContractError::UnknownFunction(other.to_string())),
        };
        Ok(invocation)
    }
}

/// Routes invocations to the contract, queries and registry.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    contract: BillContract,
    queries: BillQueries,
}

impl Dispatcher {
    pub fn new(contract: BillContract, queries: BillQueries) -> Self {
        Self { contract, queries }
    }

    pub fn contract(&self) -> &BillContract {
        &self.contract
    }

    pub fn queries(&self) -> &BillQueries {
        &self.queries
    }

    /// Run one invocation. Mutations return the written record,
    /// `initLedger` returns `null`.
    pub fn invoke<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        invocation: &Invocation,
    ) -> Result<Value, ContractError> {
        debug!(function = invocation.function_name(), "invoke");
        let c = &self.contract;
        let q = &self.queries;
        match invocation {
            Invocation::InitLedger => {
                genesis::init_ledger(store)?;
                Ok(Value::Null)
            }
            Invocation::IssueBill(args) => to_json(&c.issue(store, args)?),
            Invocation::AgreePayBill(args) => to_json(&c.agree_pay(store, args)?),
            Invocation::DisagreePayBill(id) => to_json(&c.disagree_pay(store, id)?),
            Invocation::DiscountBill(args) => to_json(&c.discount(store, args)?),
            Invocation::AgreeDiscountBill(args) => to_json(&c.agree_discount(store, args)?),
            Invocation::DisagreeDiscountBill(args) => to_json(&c.disagree_discount(store, args)?),
            Invocation::EndorseBill(args) => to_json(&c.endorse(store, args)?),
            Invocation::AgreeEndorseBill(args) => to_json(&c.agree_endorse(store, args)?),
            Invocation::DisagreeEndorseBill(args) => to_json(&c.disagree_endorse(store, args)?),
            Invocation::ChangeAccept(args) => to_json(&c.change_payer(store, args)?),
            Invocation::DiscountAndEndorse(args) => to_json(&c.change_holder(store, args)?),
            Invocation::ChangeState(args) => to_json(&c.change_state(store, args)?),
            Invocation::ChangeMessage(args) => to_json(&c.change_message(store, args)?),
            Invocation::QueryAllBill => to_json(&q.scan_all(store)?),
            Invocation::QueryBillById(id) => to_json(&q.get_bill(store, id)?),
            Invocation::QueryWaitDiscountBills => to_json(&q.wait_discount_bills(store)?),
            Invocation::QueryWaitPayBills(payer) => to_json(&q.wait_pay_bills(store, payer)?),
            Invocation::QueryAllPayBills(payer) => to_json(&q.pay_bills(store, payer)?),
            Invocation::QueryAllAcceptBills(acceptor) => {
                to_json(&q.accept_bills(store, acceptor)?)
            }
            Invocation::QueryAllHoldBills(holder) => to_json(&q.hold_bills(store, holder)?),
            Invocation::QueryWaitEndorseBills(endorsee) => {
                to_json(&q.wait_endorse_bills(store, endorsee)?)
            }
            Invocation::QueryHistoryById(id) => to_json(&q.history_of(store, id)?),
            Invocation::QuerySignInfo => to_json(&registry::scan_registry(store)?),
            Invocation::QueryMyBillByIdAndPay(user) => {
                to_json(&q.legacy_owner_phase_history(store, user, OwnerPhase::Public)?)
            }
            Invocation::QueryMyBillByIdAndUnpay(user) => {
                to_json(&q.legacy_owner_phase_history(store, user, OwnerPhase::Made)?)
            }
        }
    }

    /// Decode a positional call and run it.
    pub fn invoke_positional<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        function: &str,
        args: &[String],
    ) -> Result<Value, ContractError> {
        let invocation = Invocation::from_positional(function, args)?;
        self.invoke(store, &invocation)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ContractError> {
    serde_json::to_value(value).map_err(|e| ContractError::Encode(e.to_string()))
}
