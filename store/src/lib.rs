//! Abstract storage traits for the UBI accrual ledger.
//!
//! Every storage backend (file, in-memory for testing) implements these
//! traits. The ledger depends only on the traits and serializes its own
//! state, so this crate never needs to know the ledger's types.

pub mod error;
pub mod meta;

pub use error::StoreError;
pub use meta::LedgerStore;
