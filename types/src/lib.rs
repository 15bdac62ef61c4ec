//! Fundamental types for billchain.
//!
//! This crate defines the records shared across every other crate in the
//! workspace: the bill record and its party roles, the lifecycle state and
//! outcome enums, registry entries and timestamps.

pub mod bill;
pub mod error;
pub mod party;
pub mod sign_info;
pub mod state;
pub mod time;

pub use bill::{Bill, BillId};
pub use error::BillError;
pub use party::Party;
pub use sign_info::SignInfo;
pub use state::{BillMessage, BillState};
pub use time::Timestamp;
