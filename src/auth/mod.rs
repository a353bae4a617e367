//! Authentication: token service, password hashing and the request
//! extractor resolving bearer tokens to live user records.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use crate::domain::types::{Email, Role, UserId, Username};
use crate::domain::user::User;
use crate::repository::{DieselRepository, UserReader};
use crate::services::errors::ServiceError;

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, JwtService};
pub use password::{PasswordError, hash_password, verify_password};

/// Identity of the caller, resolved from a verified bearer token.
///
/// The backing user record is re-read on every request so that deactivated
/// accounts lose access immediately, regardless of token expiry.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::unauthorized("missing bearer token"))?;

    let jwt = req
        .app_data::<web::Data<JwtService>>()
        .ok_or(ServiceError::Internal)?;
    let claims = jwt
        .verify_token(token)
        .map_err(|e| ServiceError::unauthorized(e.to_string()))?;

    let repo = req
        .app_data::<web::Data<DieselRepository>>()
        .ok_or(ServiceError::Internal)?;
    let user_id =
        UserId::new(claims.sub).map_err(|_| ServiceError::unauthorized("invalid token subject"))?;
    let user = repo
        .get_user_by_id(user_id)?
        .ok_or_else(|| ServiceError::unauthorized("unknown user"))?;
    if !user.is_active {
        return Err(ServiceError::unauthorized("account is deactivated"));
    }

    Ok(AuthenticatedUser::from(&user))
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map_err(Into::into))
    }
}
