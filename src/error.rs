use nucsim_protocol::{ErrorCode, ErrorReport, UnknownVariant};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NucError>;

/// Errors raised by sequence, strand and reaction operations.
///
/// Every failure is scoped to the single operation that raised it; no state
/// is changed when an operation returns an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NucError {
    /// A field carries the wrong kind of value, or names no field at all.
    #[error("Type constraint violated: {0}")]
    TypeConstraint(String),

    /// The value has the right type but is semantically invalid.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate name or position on insert, or an edit target that is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is forbidden in the current state.
    #[error("Invalid state: {0}")]
    State(String),

    #[error("Binding not found: {0}")]
    BindingNotFound(String),
}

impl NucError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TypeConstraint(_) => ErrorCode::TypeConstraint,
            Self::Validation(_) => ErrorCode::Validation,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::State(_) => ErrorCode::State,
            Self::BindingNotFound(_) => ErrorCode::BindingNotFound,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::TypeConstraint(m)
            | Self::Validation(m)
            | Self::Conflict(m)
            | Self::NotFound(m)
            | Self::State(m)
            | Self::BindingNotFound(m) => m,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.message().to_string(),
        }
    }
}

impl From<UnknownVariant> for NucError {
    fn from(err: UnknownVariant) -> Self {
        NucError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for NucError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        if err.is_data() && message.starts_with("invalid type") {
            NucError::TypeConstraint(message)
        } else {
            NucError::Validation(message)
        }
    }
}
