use proptest::prelude::*;

use billchain_types::{Bill, BillId, BillMessage, BillState};

fn any_state() -> impl Strategy<Value = BillState> {
    prop::sample::select(BillState::ALL.to_vec())
}

fn any_message() -> impl Strategy<Value = BillMessage> {
    prop::sample::select(BillMessage::ALL.to_vec())
}

/// Field text, deliberately including the empty string and non-ASCII names.
fn field() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-zA-Z0-9 ]{1,12}", "\\PC{0,8}"]
}

prop_compose! {
    fn any_bill()(
        id in "[A-Z]{3}[0-9]{1,8}",
        instrument in prop::collection::vec(field(), 4),
        parties in prop::collection::vec(field(), 10),
        message in any_message(),
        state in any_state(),
    ) -> Bill {
        Bill {
            id: BillId::parse(id).unwrap(),
            money: instrument[0].clone(),
            bill_type: instrument[1].clone(),
            issue_date: instrument[2].clone(),
            due_date: instrument[3].clone(),
            pub_id: parties[0].clone(),
            pub_name: parties[1].clone(),
            pay_id: parties[2].clone(),
            pay_name: parties[3].clone(),
            accept_id: parties[4].clone(),
            accept_name: parties[5].clone(),
            hold_id: parties[6].clone(),
            hold_name: parties[7].clone(),
            endorsed_id: parties[8].clone(),
            endorsed_name: parties[9].clone(),
            message,
            state,
        }
    }
}

proptest! {
    /// JSON encode -> decode reproduces every field, empty strings included.
    #[test]
    fn bill_json_roundtrip(bill in any_bill()) {
        let bytes = serde_json::to_vec(&bill).unwrap();
        let decoded: Bill = serde_json::from_slice(&bytes).unwrap();
        prop_assert_eq!(decoded, bill);
    }

    /// Every state survives its string form.
    #[test]
    fn state_string_roundtrip(state in any_state()) {
        prop_assert_eq!(state.as_str().parse::<BillState>().unwrap(), state);
    }

    /// Strings outside the enumeration never parse as a state.
    #[test]
    fn foreign_state_strings_rejected(raw in "[A-Z][a-z]{2,10}") {
        prop_assert!(raw.parse::<BillState>().is_err());
    }
}
