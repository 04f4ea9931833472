//! Plain token bookkeeping.
//!
//! Balances stored here are *principal*: value that has already been
//! realized. The time-proportional part of a balance lives in the accrual
//! ledger and is folded in by consolidation before any debit.

pub mod book;
pub mod error;

pub use book::TokenBook;
pub use error::TokenError;
