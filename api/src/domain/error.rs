#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("{entity} cannot {action} while {status}")]
    InvalidState {
        entity: &'static str,
        action: &'static str,
        status: &'static str,
    },
    #[error("{0}")]
    Validation(String),
    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}
