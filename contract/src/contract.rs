//! The bill contract: lifecycle transitions and raw field primitives.
//!
//! `BillContract` holds no ledger state. Each operation takes the store
//! handle explicitly and commits with exactly one `put`.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use billchain_store::LedgerStore;
use billchain_types::{Bill, BillId};

use crate::args::{
    BillArgs, ChangeHolderArgs, ChangeMessageArgs, ChangePayerArgs, ChangeStateArgs, EndorseArgs,
};
use crate::keys::{bill_key, read_bill, write_bill};
use crate::lifecycle::{self, Transition, TransitionArgs};
use crate::ContractError;

/// How lifecycle operations treat the current record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// No read and no precondition check: every operation overwrites.
    #[default]
    Permissive,
    /// Reject operations the intended state diagram does not allow.
    Strict,
}

#[derive(Clone, Debug, Default)]
pub struct BillContract {
    policy: TransitionPolicy,
}

impl BillContract {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn issue<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &BillArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::Issue, TransitionArgs::Bill(args))
    }

    pub fn agree_pay<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &BillArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::AgreePay, TransitionArgs::Bill(args))
    }

    /// Void a bill. Only the id is needed.
    pub fn disagree_pay<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &BillId,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::DisagreePay, TransitionArgs::Void(id))
    }

    pub fn discount<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &BillArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::Discount, TransitionArgs::Bill(args))
    }

    /// Accept a discount; the payer in `args` becomes the new obligor.
    pub fn agree_discount<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &BillArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::AgreeDiscount, TransitionArgs::Bill(args))
    }

    pub fn disagree_discount<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &BillArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::DisagreeDiscount, TransitionArgs::Bill(args))
    }

    pub fn endorse<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &EndorseArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::Endorse, TransitionArgs::Endorse(args))
    }

    pub fn agree_endorse<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &EndorseArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::AgreeEndorse, TransitionArgs::Endorse(args))
    }

    pub fn disagree_endorse<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &BillArgs,
    ) -> Result<Bill, ContractError> {
        self.apply(store, Transition::DisagreeEndorse, TransitionArgs::Bill(args))
    }

    /// Apply one named transition and write the derived record.
    pub fn apply<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        transition: Transition,
        args: TransitionArgs<'_>,
    ) -> Result<Bill, ContractError> {
        let key = bill_key(args.id())?;
        let bill = lifecycle::derive(transition, args)?;
        if self.policy == TransitionPolicy::Strict {
            check_precondition(store, &key, args.id(), transition)?;
        }
        write_bill(store, &key, &bill)?;
        info!(bill = %bill.id, %transition, state = %bill.state, "applied transition");
        Ok(bill)
    }

    /// Overwrite the payer pair of an existing bill.
    pub fn change_payer<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &ChangePayerArgs,
    ) -> Result<Bill, ContractError> {
        modify(store, &args.id, "change-payer", |bill| {
            bill.set_payer(args.payer.clone())
        })
    }

    /// Overwrite the beneficiary and holder pairs of an existing bill.
    pub fn change_holder<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &ChangeHolderArgs,
    ) -> Result<Bill, ContractError> {
        modify(store, &args.id, "change-holder", |bill| {
            bill.set_acceptor(args.acceptor.clone());
            bill.set_holder(args.holder.clone());
        })
    }

    /// Overwrite `State` without consulting the transition table.
    pub fn change_state<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &ChangeStateArgs,
    ) -> Result<Bill, ContractError> {
        modify(store, &args.id, "change-state", |bill| bill.state = args.state)
    }

    /// Overwrite `Message` without consulting the transition table.
    pub fn change_message<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        args: &ChangeMessageArgs,
    ) -> Result<Bill, ContractError> {
        modify(store, &args.id, "change-message", |bill| {
            bill.message = args.message
        })
    }
}

fn check_precondition<S: LedgerStore + ?Sized>(
    store: &S,
    key: &str,
    id: &BillId,
    transition: Transition,
) -> Result<(), ContractError> {
    let current = read_bill(store, key)?;
    match current {
        Some(_) if transition == Transition::Issue => {
            warn!(bill = %id, "rejected re-issue of existing bill");
            Err(ContractError::AlreadyExists(id.to_string()))
        }
        None if transition != Transition::Issue => Err(ContractError::NotFound(id.to_string())),
        Some(bill) if !transition.permits(Some(bill.state)) => {
            warn!(bill = %id, %transition, state = %bill.state, "rejected transition");
            Err(ContractError::InvalidTransition {
                id: id.to_string(),
                transition: transition.to_string(),
                state: bill.state.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Read-modify-write of an existing bill, bypassing the transition table.
fn modify<S, F>(store: &S, id: &BillId, primitive: &str, edit: F) -> Result<Bill, ContractError>
where
    S: LedgerStore + ?Sized,
    F: FnOnce(&mut Bill),
{
    let key = bill_key(id)?;
    let mut bill = read_bill(store, &key)?.ok_or_else(|| ContractError::NotFound(id.to_string()))?;
    edit(&mut bill);
    write_bill(store, &key, &bill)?;
    info!(bill = %id, primitive, state = %bill.state, "applied raw mutation");
    Ok(bill)
}
