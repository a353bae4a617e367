//! Business rules between the HTTP routes and the repository traits.
//!
//! Service functions are generic over the repository traits they need, so
//! unit tests can run them against the in-memory test repository.

pub mod auth;
pub mod categories;
pub mod errors;
pub mod products;
pub mod subcategories;
#[cfg(test)]
pub(crate) mod tests_support;
pub mod users;

pub use errors::{FieldError, ServiceError, ServiceResult};

use crate::auth::AuthenticatedUser;

/// Number of entries returned by "top" aggregates in stats endpoints.
pub(crate) const STATS_TOP_COUNT: usize = 5;

pub(crate) fn require_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("administrator role required"))
    }
}
