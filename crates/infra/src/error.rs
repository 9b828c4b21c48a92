//! Application-level error returned by every handler.
//!
//! Domain, auth and storage errors are folded into one enum so the HTTP layer
//! has a single place that maps failures to status codes.

use thiserror::Error;

use farmhub_auth::{AuthzError, PasswordError, TokenError};
use farmhub_core::{DomainError, ValidationErrors};

use crate::repository::RepositoryError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AppError {
    /// Request or entity data failed field validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A domain invariant rejected the operation.
    #[error("{0}")]
    Domain(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Failures that are neither the caller's fault nor storage-related
    /// (token signing, password hashing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DomainError> for AppError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::InvariantViolation(msg) => AppError::Domain(msg),
            DomainError::InvalidId(msg) => AppError::validation("id", msg),
            DomainError::NotFound(what) => AppError::NotFound(what.to_string()),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Duplicate { kind, id } => AppError::Conflict(format!("duplicate {kind} {id}")),
            RepositoryError::NotFound { kind, .. } => AppError::NotFound(kind.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<AuthzError> for AppError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthorized => AppError::Unauthorized,
            AuthzError::Forbidden(permission) => AppError::Forbidden(permission),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(value: PasswordError) -> Self {
        match value {
            PasswordError::Empty => AppError::validation("password", "must not be empty"),
            PasswordError::Crypto(msg) => AppError::Internal(msg),
        }
    }
}

/// Only reached when issuing; a token that fails validation is `Unauthorized`.
impl From<TokenError> for AppError {
    fn from(value: TokenError) -> Self {
        AppError::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_by_kind() {
        assert_eq!(
            AppError::from(DomainError::invariant("employee is already inactive")),
            AppError::Domain("employee is already inactive".into())
        );
        assert_eq!(AppError::from(DomainError::not_found("farm")), AppError::NotFound("farm".into()));
        assert!(matches!(
            AppError::from(DomainError::validation("name", "must not be empty")),
            AppError::Validation(e) if e.has_field("name")
        ));
    }

    #[test]
    fn storage_errors_keep_duplicates_as_conflicts() {
        let dup = RepositoryError::Duplicate { kind: "farms", id: "x".into() };
        assert!(matches!(AppError::from(dup), AppError::Conflict(_)));
        let backend = RepositoryError::Backend("pool closed".into());
        assert!(matches!(AppError::from(backend), AppError::Storage(_)));
    }
}
