//! Error taxonomy shared by every crate in the workspace.
//!
//! Each crate keeps its own error enum; `ErrorKind` is the coarse class a
//! caller can match on without knowing which component rejected the call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of a rejected operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The caller lacks the identity the operation requires.
    Authorization,
    /// The subject's eligibility is not what the operation requires.
    Eligibility,
    /// The subject is not in the state the operation requires.
    StateConflict,
    /// An arithmetic or structural bound would be broken.
    InvariantViolation,
    /// The parameters themselves are malformed.
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Eligibility => "eligibility",
            Self::StateConflict => "state_conflict",
            Self::InvariantViolation => "invariant_violation",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
