//! LMDB storage backend for billchain.
//!
//! Implements the storage traits from `billchain-store` using the `heed` LMDB
//! bindings. State, key history and metadata live in separate named
//! databases within a single environment.

pub mod environment;
pub mod error;
pub mod ledger;
pub mod meta;
pub mod migration;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use ledger::LmdbLedgerStore;
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};

/// Default LMDB map size (1 GiB).
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Default number of named databases.
pub const DEFAULT_MAX_DBS: u32 = 8;
