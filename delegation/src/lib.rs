//! Accrual delegation: redirect one account's accruing unit to another.
//!
//! Supports:
//! - **Single delegate** per account, and at most one inbound delegator
//! - **Depth one**: a unit moves exactly one hop, never along a chain
//! - **Cycle rejection**: no self-loop, no direct mutual delegation
//!
//! The graph only validates and records edges. Moving the factor and
//! realizing accrual on both endpoints is the ledger's job, driven by the
//! [`DelegationPlan`] this crate produces.

pub mod error;
pub mod graph;

pub use error::DelegationError;
pub use graph::{DelegationGraph, DelegationPlan, DelegatorContext};
