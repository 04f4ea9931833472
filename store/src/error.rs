use thiserror::Error;
use ubi_types::ErrorKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::Configuration,
            Self::Backend(_) | Self::Serialization(_) | Self::Corruption(_) => {
                ErrorKind::InvariantViolation
            }
        }
    }
}
