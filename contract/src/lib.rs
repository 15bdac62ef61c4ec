//! Bill lifecycle contract for billchain.
//!
//! The contract is stateless: every operation takes an explicit
//! [`LedgerStore`](billchain_store::LedgerStore) handle, derives the new
//! record from its arguments and commits it with a single `put`. Queries never
//! write. Concurrent operations on one bill race at the store, where the last
//! commit wins; nothing here adds mutual exclusion.

pub mod args;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod genesis;
pub mod keys;
pub mod lifecycle;
pub mod query;
pub mod registry;

pub use args::{
    BillArgs, ChangeHolderArgs, ChangeMessageArgs, ChangePayerArgs, ChangeStateArgs, EndorseArgs,
};
pub use contract::{BillContract, TransitionPolicy};
pub use dispatch::{Dispatcher, Invocation};
pub use error::ContractError;
pub use genesis::init_ledger;
pub use keys::{bill_key, user_key, BILL_PREFIX, USER_PREFIX};
pub use lifecycle::{derive, Transition, TransitionArgs};
pub use query::{BillPredicate, BillQueries, BillVersion, OwnerPhase};
pub use registry::{authenticate, scan_registry};
