use serde::Serialize;
use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

/// A single field-level validation failure reported back to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type used by service layer functions, mapped onto HTTP statuses in
/// the routes layer.
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    /// Input failed validation (400).
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    /// Requested resource was not found (404).
    #[error("{0}")]
    NotFound(String),
    /// A case-insensitive uniqueness rule was violated (400).
    #[error("{0}")]
    Duplicate(String),
    /// The referenced parent exists but is inactive (400).
    #[error("{0}")]
    InactiveParent(String),
    /// Subcategory does not belong to the stated category (400).
    #[error("{0}")]
    HierarchyMismatch(String),
    /// Deletion blocked by dependent records (400).
    #[error("{0}")]
    HasDependents(String),
    /// Authentication failed or is missing (401).
    #[error("{0}")]
    Unauthorized(String),
    /// The authenticated user may not perform the operation (403).
    #[error("{0}")]
    Forbidden(String),
    /// A batch operation succeeded for some items and failed for others (207).
    #[error("{message}")]
    PartialFailure { message: String, failed: Vec<i32> },
    /// An unexpected internal error occurred (500). Details are logged, not
    /// returned.
    #[error("internal error")]
    Internal,
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn validation_fields(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    pub fn inactive_parent(message: impl Into<String>) -> Self {
        Self::InactiveParent(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record not found".to_string()),
            RepositoryError::Conflict(message) => Self::Duplicate(message),
            RepositoryError::ConstraintViolation(message) => Self::validation(message),
            RepositoryError::Pool(e) => {
                log::error!("Database pool error: {e}");
                Self::Internal
            }
            RepositoryError::Database(e) => {
                log::error!("Database error: {e}");
                Self::Internal
            }
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        Self::validation(err.to_string())
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
