//! Stream-specific errors.

use thiserror::Error;
use ubi_types::ErrorKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream {0} not found")]
    NotFound(u64),

    #[error("sender {0} is not eligible")]
    NotEligible(String),

    #[error("sender {0} is not accruing")]
    NotAccruing(String),

    #[error("stream asset {got} is not this ledger ({expected})")]
    ForeignAsset { expected: String, got: String },

    #[error("stream interval must be {expected}s, got {got}s")]
    InvalidInterval { expected: u64, got: u64 },

    #[error("stream rate must be non-zero")]
    ZeroRate,

    #[error("cannot stream to self")]
    SelfStream,

    #[error("stream start {start} is before now ({now})")]
    StartInPast { start: u64, now: u64 },

    #[error("stream start {start} is after stop {stop}")]
    InvalidWindow { start: u64, stop: u64 },

    #[error("stream {0} from this sender to this recipient has not ended")]
    ActiveStreamExists(u64),

    #[error("stream rate {requested} exceeds the sender's unallocated accrual rate {available}")]
    RateExceedsAccrual { requested: u128, available: u128 },

    #[error("{who} is neither sender nor recipient of stream {id}")]
    NotParty { who: String, id: u64 },

    #[error("only the recipient of stream {0} can withdraw")]
    NotRecipient(u64),

    #[error("withdrawal amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient stream balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("arithmetic overflow in stream computation")]
    Overflow,
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotEligible(_) => ErrorKind::Eligibility,
            Self::NotAccruing(_) | Self::ActiveStreamExists(_) => ErrorKind::StateConflict,
            Self::NotParty { .. } | Self::NotRecipient(_) => ErrorKind::Authorization,
            Self::RateExceedsAccrual { .. } | Self::InsufficientBalance { .. } | Self::Overflow => {
                ErrorKind::InvariantViolation
            }
            Self::NotFound(_)
            | Self::ForeignAsset { .. }
            | Self::InvalidInterval { .. }
            | Self::ZeroRate
            | Self::SelfStream
            | Self::StartInPast { .. }
            | Self::InvalidWindow { .. }
            | Self::ZeroAmount => ErrorKind::Configuration,
        }
    }
}
