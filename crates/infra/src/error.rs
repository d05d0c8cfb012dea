use thiserror::Error;

use roomshare_core::{DomainError, ValidationErrors};

/// Store operation error.
///
/// `Rejected` carries a domain error raised by a mutation closure; the record
/// is left untouched when it is returned.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Rejected(DomainError::Validation(errors))
    }
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Backend("store lock poisoned".to_string())
    }
}
