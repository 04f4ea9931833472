//! Accrual-specific errors.

use thiserror::Error;
use ubi_types::ErrorKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrualError {
    #[error("account {0} is not eligible to accrue")]
    NotEligible(String),

    #[error("account {0} is still eligible")]
    StillEligible(String),

    #[error("account {0} is already accruing")]
    AlreadyAccruing(String),

    #[error("account {0} is not accruing")]
    NotAccruing(String),

    #[error("account {0} has delegated its accrual away")]
    Delegating(String),

    #[error("accruing factor of {0} would drop below zero")]
    FactorUnderflow(String),

    #[error("arithmetic overflow in accrual computation")]
    Overflow,
}

impl AccrualError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotEligible(_) | Self::StillEligible(_) => ErrorKind::Eligibility,
            Self::AlreadyAccruing(_) | Self::NotAccruing(_) | Self::Delegating(_) => {
                ErrorKind::StateConflict
            }
            Self::FactorUnderflow(_) | Self::Overflow => ErrorKind::InvariantViolation,
        }
    }
}
