//! The bill lifecycle: named transitions and their pure record derivation.
//!
//! ```text
//! (absent) --Issue--> made --AgreePay----> public
//!                       \---DisagreePay--> billfail
//! public --Discount--> dcwaitsigned --AgreeDiscount | DisagreeDiscount--> public
//! public --Endorse---> enwaitsign   --AgreeEndorse  | DisagreeEndorse---> public
//! ```

use std::fmt;

use billchain_types::{Bill, BillId, BillMessage, BillState};

use crate::args::{BillArgs, EndorseArgs};
use crate::ContractError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    Issue,
    AgreePay,
    DisagreePay,
    Discount,
    AgreeDiscount,
    DisagreeDiscount,
    Endorse,
    AgreeEndorse,
    DisagreeEndorse,
}

impl Transition {
    pub const ALL: [Transition; 9] = [
        Transition::Issue,
        Transition::AgreePay,
        Transition::DisagreePay,
        Transition::Discount,
        Transition::AgreeDiscount,
        Transition::DisagreeDiscount,
        Transition::Endorse,
        Transition::AgreeEndorse,
        Transition::DisagreeEndorse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Transition::Issue => "issue",
            Transition::AgreePay => "agree-pay",
            Transition::DisagreePay => "disagree-pay",
            Transition::Discount => "discount",
            Transition::AgreeDiscount => "agree-discount",
            Transition::DisagreeDiscount => "disagree-discount",
            Transition::Endorse => "endorse",
            Transition::AgreeEndorse => "agree-endorse",
            Transition::DisagreeEndorse => "disagree-endorse",
        }
    }

    pub fn target_state(&self) -> BillState {
        match self {
            Transition::Issue => BillState::Made,
            Transition::DisagreePay => BillState::BillFail,
            Transition::Discount => BillState::DcWaitSigned,
            Transition::Endorse => BillState::EnWaitSign,
            Transition::AgreePay
            | Transition::AgreeDiscount
            | Transition::DisagreeDiscount
            | Transition::AgreeEndorse
            | Transition::DisagreeEndorse => BillState::Public,
        }
    }

    pub fn message(&self) -> BillMessage {
        match self {
            Transition::Issue | Transition::Discount | Transition::Endorse => BillMessage::None,
            Transition::AgreePay => BillMessage::WaitPaySuccess,
            Transition::DisagreePay => BillMessage::WaitPayFail,
            Transition::AgreeDiscount => BillMessage::DiscountSuccess,
            Transition::DisagreeDiscount => BillMessage::DiscountFail,
            Transition::AgreeEndorse => BillMessage::EndorseSuccess,
            Transition::DisagreeEndorse => BillMessage::EndorseFail,
        }
    }

    /// States the bill is intended to be in before this transition.
    ///
    /// Empty for [`Transition::Issue`], which applies to an absent key.
    pub fn allowed_from(&self) -> &'static [BillState] {
        match self {
            Transition::Issue => &[],
            Transition::AgreePay | Transition::DisagreePay => &[BillState::Made],
            Transition::Discount | Transition::Endorse => &[BillState::Public],
            Transition::AgreeDiscount | Transition::DisagreeDiscount => &[BillState::DcWaitSigned],
            Transition::AgreeEndorse | Transition::DisagreeEndorse => &[BillState::EnWaitSign],
        }
    }

    /// Whether the intended state diagram permits this transition from
    /// `current` (`None` for an absent bill).
    pub fn permits(&self, current: Option<BillState>) -> bool {
        match (self, current) {
            (Transition::Issue, None) => true,
            (_, None) => false,
            (t, Some(state)) => t.allowed_from().contains(&state),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments supplied to a transition.
#[derive(Clone, Copy, Debug)]
pub enum TransitionArgs<'a> {
    Bill(&'a BillArgs),
    Endorse(&'a EndorseArgs),
    /// Id-only transitions (disagree-pay).
    Void(&'a BillId),
}

impl<'a> TransitionArgs<'a> {
    pub fn id(&self) -> &'a BillId {
        match self {
            TransitionArgs::Bill(args) => &args.id,
            TransitionArgs::Endorse(args) => &args.bill.id,
            TransitionArgs::Void(id) => id,
        }
    }
}

/// Derive the record a transition writes. Depends on the arguments alone.
pub fn derive(transition: Transition, args: TransitionArgs<'_>) -> Result<Bill, ContractError> {
    let state = transition.target_state();
    let message = transition.message();
    let bill = match (transition, args) {
        (Transition::DisagreePay, args) => Bill::voided(args.id().clone()),
        (Transition::Endorse, TransitionArgs::Endorse(args)) => {
            let mut bill = args.bill.to_bill(state, message);
            bill.set_endorsee(args.endorsee.clone());
            bill
        }
        (Transition::AgreeEndorse, TransitionArgs::Endorse(args)) => {
            let mut bill = args.bill.to_bill(state, message);
            bill.set_acceptor(args.endorsee.clone());
            bill.set_holder(args.endorsee.clone());
            bill
        }
        (Transition::Endorse | Transition::AgreeEndorse, _) => {
            return Err(ContractError::MalformedArgument(format!(
                "{transition} requires an endorsee"
            )))
        }
        (_, TransitionArgs::Bill(args)) => args.to_bill(state, message),
        (_, TransitionArgs::Endorse(args)) => args.bill.to_bill(state, message),
        (_, TransitionArgs::Void(_)) => {
            return Err(ContractError::MalformedArgument(format!(
                "{transition} requires the full bill field set"
            )))
        }
    };
    Ok(bill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use billchain_types::Party;

    fn args() -> BillArgs {
        BillArgs {
            id: BillId::parse("B1").unwrap(),
            money: "2000".into(),
            bill_type: "A".into(),
            issue_date: "2021-01-20".into(),
            due_date: "2022-01-20".into(),
            issuer: Party::new("bank", "Bank"),
            payer: Party::new("acmid", "A Co"),
            acceptor: Party::new("bcmid", "B Co"),
            holder: Party::new("bcmid", "B Co"),
        }
    }

    #[test]
    fn every_transition_sets_its_state_and_message() {
        let endorse = EndorseArgs::new(args(), Party::new("ccmid", "C Co"));
        for t in Transition::ALL {
            let input = match t {
                Transition::Endorse | Transition::AgreeEndorse => TransitionArgs::Endorse(&endorse),
                _ => TransitionArgs::Bill(&endorse.bill),
            };
            let bill = derive(t, input).unwrap();
            assert_eq!(bill.state, t.target_state(), "{t}");
            assert_eq!(bill.message, t.message(), "{t}");
            assert_eq!(bill.id.as_str(), "B1");
        }
    }

    #[test]
    fn full_field_transitions_copy_arguments_and_clear_endorsee() {
        let a = args();
        for t in [
            Transition::Issue,
            Transition::AgreePay,
            Transition::Discount,
            Transition::AgreeDiscount,
            Transition::DisagreeDiscount,
            Transition::DisagreeEndorse,
        ] {
            let bill = derive(t, TransitionArgs::Bill(&a)).unwrap();
            assert_eq!(BillArgs::from_bill(&bill), a, "{t}");
            assert!(!bill.has_pending_endorsement(), "{t}");
        }
    }

    #[test]
    fn disagree_pay_voids_everything_but_id() {
        let bill = derive(Transition::DisagreePay, TransitionArgs::Bill(&args())).unwrap();
        assert_eq!(bill, Bill::voided(BillId::parse("B1").unwrap()));
        assert!(bill.money.is_empty() && bill.hold_id.is_empty() && bill.pub_name.is_empty());
    }

    #[test]
    fn endorse_records_pending_endorsee() {
        let endorse = EndorseArgs::new(args(), Party::new("ccmid", "C Co"));
        let bill = derive(Transition::Endorse, TransitionArgs::Endorse(&endorse)).unwrap();
        assert_eq!(bill.endorsee(), Party::new("ccmid", "C Co"));
        assert_eq!(bill.holder(), Party::new("bcmid", "B Co"));
    }

    #[test]
    fn agree_endorse_moves_rights_to_endorsee() {
        let endorse = EndorseArgs::new(args(), Party::new("ccmid", "C Co"));
        let bill = derive(Transition::AgreeEndorse, TransitionArgs::Endorse(&endorse)).unwrap();
        assert_eq!(bill.acceptor(), Party::new("ccmid", "C Co"));
        assert_eq!(bill.holder(), Party::new("ccmid", "C Co"));
        assert!(!bill.has_pending_endorsement());
        assert_eq!(bill.payer(), Party::new("acmid", "A Co"));
    }

    #[test]
    fn mismatched_arguments_are_malformed() {
        let a = args();
        assert!(matches!(
            derive(Transition::Endorse, TransitionArgs::Bill(&a)).unwrap_err(),
            ContractError::MalformedArgument(_)
        ));
        assert!(matches!(
            derive(Transition::Issue, TransitionArgs::Void(&a.id)).unwrap_err(),
            ContractError::MalformedArgument(_)
        ));
    }

    #[test]
    fn intended_diagram() {
        assert!(Transition::Issue.permits(None));
        assert!(!Transition::Issue.permits(Some(BillState::Made)));
        assert!(!Transition::AgreePay.permits(None));
        assert!(Transition::AgreePay.permits(Some(BillState::Made)));
        assert!(!Transition::Discount.permits(Some(BillState::Made)));
        // billfail is terminal: no transition leaves it.
        assert!(Transition::ALL
            .iter()
            .all(|t| !t.permits(Some(BillState::BillFail))));
        assert!(BillState::BillFail.is_terminal());
    }
}
