//! Login, token introspection and password changes.

use chrono::Utc;

use crate::auth::{AuthenticatedUser, JwtService, hash_password, verify_password};
use crate::domain::user::UserPatch;
use crate::dto::users::{LoginDto, UserDto};
use crate::forms::auth::{ChangePasswordPayload, LoginPayload};
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Authenticate by username or email and issue a bearer token.
///
/// Unknown identities are reported as not-found, deactivated accounts as
/// forbidden and a wrong password as unauthorized, so clients can
/// distinguish the three cases.
pub fn login<R>(payload: LoginPayload, jwt: &JwtService, repo: &R) -> ServiceResult<LoginDto>
where
    R: UserReader + UserWriter,
{
    let user = repo
        .get_user_by_identity(&payload.identity.to_lowercase())?
        .ok_or_else(|| ServiceError::not_found("user not found"))?;
    if !user.is_active {
        return Err(ServiceError::forbidden("account is deactivated"));
    }

    let valid = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        log::error!("verifying password for user {}: {e}", user.id);
        ServiceError::Internal
    })?;
    if !valid {
        return Err(ServiceError::unauthorized("invalid credentials"));
    }

    let patch = UserPatch {
        last_login: Some(Utc::now().naive_utc()),
        ..Default::default()
    };
    let user = repo.update_user(user.id, &patch)?;

    let token = jwt.create_token(&user).map_err(|e| {
        log::error!("issuing token for user {}: {e}", user.id);
        ServiceError::Internal
    })?;
    Ok(LoginDto {
        user: UserDto::from(user),
        token,
        expires_in: jwt.ttl_seconds(),
    })
}

/// Full profile of the authenticated caller.
pub fn me<R: UserReader>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<UserDto> {
    let found = repo
        .get_user_by_id(user.id)?
        .ok_or_else(|| ServiceError::unauthorized("unknown user"))?;
    Ok(UserDto::from(found))
}

/// Replace the caller's password after verifying the current one.
pub fn change_password<R>(
    payload: ChangePasswordPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter,
{
    let record = repo
        .get_user_by_id(user.id)?
        .ok_or_else(|| ServiceError::unauthorized("unknown user"))?;

    let valid = verify_password(&payload.current_password, &record.password_hash).map_err(|e| {
        log::error!("verifying password for user {}: {e}", user.id);
        ServiceError::Internal
    })?;
    if !valid {
        return Err(ServiceError::unauthorized("current password is incorrect"));
    }

    let password_hash = hash_password(&payload.new_password).map_err(|e| {
        log::error!("hashing new password for user {}: {e}", user.id);
        ServiceError::Internal
    })?;
    let patch = UserPatch {
        password_hash: Some(password_hash),
        ..Default::default()
    };
    repo.update_user(user.id, &patch)?;
    Ok(())
}
