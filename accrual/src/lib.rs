//! Accrual ledger: the time-proportional half of every balance.
//!
//! An account's unrealized accrual is a pure function of time:
//! `accrued(a) = rate × (t_now − accrued_since(a)) × weight(a)`
//!
//! where `weight` is the live accruing factor (see [`FactorSplit`]). Nothing
//! here runs periodically; callers evaluate on demand and consolidate
//! (realize and restart the clock) before mutating balances.

pub mod engine;
pub mod error;
pub mod state;

pub use engine::AccrualLedger;
pub use error::AccrualError;
pub use state::{AccountAccrual, AccruingFactor, FactorSplit};
