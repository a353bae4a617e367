//! Persistence error taxonomy.

use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound,
            diesel::result::Error::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    diesel::result::DatabaseErrorKind::UniqueViolation => Self::Conflict(message),
                    diesel::result::DatabaseErrorKind::ForeignKeyViolation
                    | diesel::result::DatabaseErrorKind::CheckViolation
                    | diesel::result::DatabaseErrorKind::NotNullViolation => {
                        Self::ConstraintViolation(message)
                    }
                    _ => Self::Database(diesel::result::Error::DatabaseError(kind, info)),
                }
            }
            other => Self::Database(other),
        }
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        Self::ConstraintViolation(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
