//! Fundamental types for the UBI accrual ledger.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: addresses, timestamps, ledger parameters, the error taxonomy,
//! and the eligibility oracle seam.

pub mod address;
pub mod error;
pub mod oracle;
pub mod params;
pub mod time;

pub use address::Address;
pub use error::ErrorKind;
pub use oracle::EligibilityOracle;
pub use params::LedgerParams;
pub use time::Timestamp;
