use thiserror::Error;

use pricelens_core::DomainError;

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a service operation, as seen by request handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
        }
    }
}
