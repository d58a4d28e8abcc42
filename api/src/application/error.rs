use crate::domain::error::DomainError;

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Busy(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("insufficient balance: current {current}, required {required}")]
    InsufficientBalance { current: i64, required: i64 },
    #[error("{0}")]
    QueueTokenInvalid(String),
    #[error("{0}")]
    QueueAccessDenied(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{what} not found: {id}"))
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidState { .. } => ServiceError::Conflict(err.to_string()),
            DomainError::Validation(msg) => ServiceError::InvalidArgument(msg),
            DomainError::UnknownVariant { .. } => ServiceError::InvalidArgument(err.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
