//! Delegation-specific errors.

use thiserror::Error;
use ubi_types::ErrorKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DelegationError {
    #[error("delegator {0} is not eligible")]
    NotEligible(String),

    #[error("{0} already delegates to that account")]
    Unchanged(String),

    #[error("cannot delegate to self")]
    SelfDelegation,

    #[error("{delegate} already delegates to {delegator}; mutual delegation is not allowed")]
    MutualDelegation { delegator: String, delegate: String },

    #[error("{delegate} already receives the delegation of {by}")]
    DelegateTaken { delegate: String, by: String },

    #[error("{0} has no own accruing unit to delegate")]
    NothingToDelegate(String),

    #[error("{delegator} sponsors {count} stream(s) that have not ended")]
    ActiveStreams { delegator: String, count: usize },
}

impl DelegationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotEligible(_) => ErrorKind::Eligibility,
            Self::Unchanged(_)
            | Self::DelegateTaken { .. }
            | Self::NothingToDelegate(_)
            | Self::ActiveStreams { .. } => ErrorKind::StateConflict,
            Self::SelfDelegation | Self::MutualDelegation { .. } => ErrorKind::InvariantViolation,
        }
    }
}
