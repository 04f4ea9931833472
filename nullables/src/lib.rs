//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the ledger (the host clock, the
//! eligibility oracle, snapshot storage) has a stand-in here that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Never touches the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and replays.

pub mod clock;
pub mod oracle;
pub mod store;

pub use clock::NullClock;
pub use oracle::NullOracle;
pub use store::NullStore;
