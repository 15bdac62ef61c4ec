//! Nullable infrastructure for deterministic testing.
//!
//! The ledger store and the clock it stamps history with are the only
//! external collaborators of the contract. The implementations here keep
//! everything in memory and can be switched off to exercise store-failure
//! paths.
//!
//! Usage: pass a [`NullLedgerStore`] wherever an LMDB ledger would go.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullLedgerStore;
