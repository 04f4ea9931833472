use thiserror::Error;
use tracing::warn;
use ubi_accrual::AccrualError;
use ubi_delegation::DelegationError;
use ubi_store::StoreError;
use ubi_stream::StreamError;
use ubi_token::TokenError;
use ubi_types::ErrorKind;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Accrual(#[from] AccrualError),

    #[error(transparent)]
    Delegation(#[from] DelegationError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("{caller} is not the governance authority")]
    Unauthorized { caller: String },

    #[error("time regression: operation at {now}s precedes the last executed at {last}s")]
    TimeRegression { now: u64, last: u64 },

    #[error("arithmetic overflow while settling {0}")]
    Overflow(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// The taxonomy class of this rejection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Accrual(e) => e.kind(),
            Self::Delegation(e) => e.kind(),
            Self::Stream(e) => e.kind(),
            Self::Token(e) => e.kind(),
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::TimeRegression { .. } | Self::Config(_) => ErrorKind::Configuration,
            Self::Overflow(_) => ErrorKind::InvariantViolation,
            Self::Store(e) => e.kind(),
        }
    }
}

/// Log a rejected entry point once, at the façade boundary.
pub(crate) trait LogRejection {
    fn log_rejection(self, op: &'static str) -> Self;
}

impl<T> LogRejection for Result<T, LedgerError> {
    fn log_rejection(self, op: &'static str) -> Self {
        if let Err(e) = &self {
            warn!(op, kind = %e.kind(), error = %e, "operation rejected");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_wrapped_error() {
        let e: LedgerError = StreamError::ZeroAmount.into();
        assert_eq!(e.kind(), ErrorKind::Configuration);
        let e: LedgerError = TokenError::InsufficientAllowance { needed: 2, approved: 1 }.into();
        assert_eq!(e.kind(), ErrorKind::Authorization);
        let e: LedgerError = DelegationError::SelfDelegation.into();
        assert_eq!(e.kind(), ErrorKind::InvariantViolation);
        assert_eq!(
            LedgerError::TimeRegression { now: 1, last: 2 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            LedgerError::Unauthorized { caller: "ubi_x".into() }.kind(),
            ErrorKind::Authorization
        );
    }

    #[test]
    fn transparent_errors_keep_their_message() {
        let e: LedgerError = StreamError::NotFound(7).into();
        assert_eq!(e.to_string(), "stream 7 not found");
    }
}
