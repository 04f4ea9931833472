//! Token-specific errors.

use thiserror::Error;
use ubi_types::ErrorKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: u128, approved: u128 },

    #[error("allowance would drop below zero: current {current}, decrease {decrease}")]
    AllowanceUnderflow { current: u128, decrease: u128 },

    #[error("arithmetic overflow in token bookkeeping")]
    Overflow,
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientAllowance { .. } => ErrorKind::Authorization,
            Self::InsufficientBalance { .. } | Self::AllowanceUnderflow { .. } | Self::Overflow => {
                ErrorKind::InvariantViolation
            }
        }
    }
}
