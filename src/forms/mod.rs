//! Request forms: deserializable input structs validated with `validator`
//! and converted into strongly-typed payloads via `TryFrom`.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::services::errors::{FieldError, ServiceError};

pub mod auth;
pub mod categories;
pub mod products;
pub mod subcategories;
pub mod users;

/// Error produced while turning a raw form into a typed payload.
#[derive(Debug, Error)]
pub enum FormError {
    /// The form failed `validator` checks; per-field errors are preserved.
    #[error("validation failed")]
    Invalid(ValidationErrors),
    /// A failure not attributable to a single field.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for FormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

impl From<TypeConstraintError> for FormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(value: FormError) -> Self {
        match value {
            FormError::Invalid(errors) => {
                let mut fields = Vec::new();
                for (field, errs) in errors.field_errors() {
                    for err in errs {
                        let message = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("invalid {field}"));
                        fields.push(FieldError::new(field.to_string(), message));
                    }
                }
                ServiceError::validation_fields("validation failed", fields)
            }
            FormError::Validation(message) | FormError::TypeConstraint(message) => {
                ServiceError::validation(message)
            }
        }
    }
}
