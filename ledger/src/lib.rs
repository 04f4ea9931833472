//! The continuously-accruing UBI ledger.
//!
//! A balance is not a stored number but a function of time:
//!
//! `balance(a) = (principal(a) + accrued(a)) ⊖ owed_to_streams(a)`
//!
//! [`UbiLedger`] owns every component (accrual clocks, the delegation
//! graph, the stream registry, the token book) and is the only place they
//! are mutated. Every write entry point validates first, then consolidates
//! the accounts it touches, then applies its own effect. Reads are pure.

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod snapshot;

mod accrue;
mod consolidate;
mod delegate;
mod resolver;
mod streams;
mod token;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use ledger::{TokenMetadata, UbiLedger};
pub use snapshot::LedgerSnapshot;

pub use ubi_stream::{CreateStream, Stream, StreamId};
pub use ubi_types::{Address, EligibilityOracle, ErrorKind, LedgerParams, Timestamp};
