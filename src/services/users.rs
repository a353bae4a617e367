//! User account management. Creation, deletion and status toggling are
//! admin-only; non-admins may update their own profile fields.

use chrono::Utc;

use crate::auth::{AuthenticatedUser, hash_password};
use crate::domain::types::{Role, UserId};
use crate::domain::user::{NewUser, UserPatch};
use crate::dto::users::{UserDto, UserStatsDto};
use crate::forms::users::{CreateUserPayload, UpdateUserPayload, UserListParams};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, Pagination};
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, require_admin};

/// Number of recently created accounts included in user stats.
const RECENT_USERS_COUNT: usize = 5;

/// List accounts. Any authenticated role may browse the directory.
pub fn list_users<R: UserReader>(
    params: UserListParams,
    _user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<(Vec<UserDto>, Option<Paginated>)> {
    let mut query = UserListQuery::default();
    if let Some(role) = params.role.filter(|r| !r.trim().is_empty()) {
        query = query.role(Role::try_from(role.as_str())?);
    }
    if let Some(is_active) = params.is_active {
        query = query.active(is_active);
    }
    if let Some(search) = params.search.filter(|s| !s.trim().is_empty()) {
        query = query.search(search.trim());
    }
    let pagination = params
        .page
        .map(|page| Pagination::new(page, params.limit.unwrap_or(DEFAULT_ITEMS_PER_PAGE)));
    query.pagination = pagination;

    let (total, users) = repo.list_users(query)?;
    let items = users.into_iter().map(UserDto::from).collect();
    Ok((items, pagination.map(|p| Paginated::new(p, total))))
}

/// Read one account. Non-admins may only read their own.
pub fn get_user<R: UserReader>(
    id: UserId,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UserDto> {
    if !user.is_admin() && user.id != id {
        return Err(ServiceError::forbidden("cannot read other accounts"));
    }
    let found = repo
        .get_user_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("user not found"))?;
    Ok(UserDto::from(found))
}

pub fn create_user<R>(
    payload: CreateUserPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    require_admin(user)?;
    if repo
        .find_user_by_username(payload.username.as_str(), None)?
        .is_some()
    {
        return Err(ServiceError::duplicate("username already in use"));
    }
    if repo
        .find_user_by_email(payload.email.as_str(), None)?
        .is_some()
    {
        return Err(ServiceError::duplicate("email already in use"));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        log::error!("hashing password for new user: {e}");
        ServiceError::Internal
    })?;
    let now = Utc::now().naive_utc();
    let created = repo.create_user(&NewUser {
        username: payload.username,
        email: payload.email,
        password_hash,
        first_name: payload.first_name,
        last_name: payload.last_name,
        role: payload.role,
        is_active: payload.is_active,
        phone: payload.phone,
        created_by: Some(user.id),
        created_at: now,
        updated_at: now,
    })?;
    Ok(UserDto::from(created))
}

/// Update an account. Non-admins may only update themselves and may not
/// touch role or active-state.
pub fn update_user<R>(
    id: UserId,
    payload: UpdateUserPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    if !user.is_admin() {
        if user.id != id {
            return Err(ServiceError::forbidden("cannot update other accounts"));
        }
        if payload.touches_privileged_fields() {
            return Err(ServiceError::forbidden(
                "role and active-state changes require administrator role",
            ));
        }
    }
    if payload.is_empty() {
        return Err(ServiceError::validation("no fields to update"));
    }
    repo.get_user_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("user not found"))?;

    if let Some(username) = &payload.username {
        if repo
            .find_user_by_username(username.as_str(), Some(id))?
            .is_some()
        {
            return Err(ServiceError::duplicate("username already in use"));
        }
    }
    if let Some(email) = &payload.email {
        if repo.find_user_by_email(email.as_str(), Some(id))?.is_some() {
            return Err(ServiceError::duplicate("email already in use"));
        }
    }

    let password_hash = payload
        .password
        .as_deref()
        .map(|password| {
            hash_password(password).map_err(|e| {
                log::error!("hashing password for user {id}: {e}");
                ServiceError::Internal
            })
        })
        .transpose()?;

    let patch = UserPatch {
        username: payload.username,
        email: payload.email,
        password_hash,
        first_name: payload.first_name,
        last_name: payload.last_name,
        role: payload.role,
        is_active: payload.is_active,
        phone: payload.phone,
        last_login: None,
    };
    let updated = repo.update_user(id, &patch)?;
    Ok(UserDto::from(updated))
}

/// Delete an account. Admins may never delete themselves.
pub fn delete_user<R>(id: UserId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: UserReader + UserWriter,
{
    require_admin(user)?;
    if user.id == id {
        return Err(ServiceError::forbidden("cannot delete own account"));
    }
    repo.get_user_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("user not found"))?;
    repo.delete_user(id)?;
    Ok(())
}

/// Flip the active flag. Admins may never deactivate themselves.
pub fn toggle_user_status<R>(
    id: UserId,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    require_admin(user)?;
    if user.id == id {
        return Err(ServiceError::forbidden("cannot change own active state"));
    }
    let target = repo
        .get_user_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("user not found"))?;

    let patch = UserPatch {
        is_active: Some(!target.is_active),
        ..Default::default()
    };
    let updated = repo.update_user(id, &patch)?;
    Ok(UserDto::from(updated))
}

pub fn user_stats<R: UserReader>(
    _user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UserStatsDto> {
    let stats = repo.user_stats(RECENT_USERS_COUNT)?;
    Ok(UserStatsDto {
        total: stats.total,
        active: stats.active,
        inactive: stats.total - stats.active,
        admins: stats.admins,
        coordinators: stats.coordinators,
        recent: stats.recent.into_iter().map(UserDto::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Email, PersonName, Phone, Username};
    use crate::repository::test::TestRepository;
    use crate::services::tests_support::{admin, coordinator, user};

    fn create_payload(username: &str) -> CreateUserPayload {
        CreateUserPayload {
            username: Username::new(username).unwrap(),
            email: Email::new(format!("{username}@example.com")).unwrap(),
            password: "secret123".to_string(),
            first_name: PersonName::new("Ana").unwrap(),
            last_name: PersonName::new("Luz").unwrap(),
            role: Role::Coordinador,
            phone: Phone::new("5551234567").unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn create_requires_admin() {
        let repo = TestRepository::new();
        let err = create_user(create_payload("ana.luz"), &coordinator(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn create_rejects_duplicate_username() {
        let repo = TestRepository::new()
            .with_users(vec![user(5, "ana.luz", Role::Coordinador, true, "x")]);
        let err = create_user(create_payload("ana.luz"), &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[test]
    fn create_hashes_password() {
        let repo = TestRepository::new();
        let dto = create_user(create_payload("ana.luz"), &admin(), &repo).unwrap();
        let stored = repo
            .get_user_by_id(UserId::new(dto.id).unwrap())
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "secret123");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn non_admin_cannot_update_others() {
        let repo = TestRepository::new()
            .with_users(vec![user(5, "ana.luz", Role::Coordinador, true, "x")]);
        let payload = UpdateUserPayload {
            first_name: Some(PersonName::new("Other").unwrap()),
            ..Default::default()
        };
        let err =
            update_user(UserId::new(5).unwrap(), payload, &coordinator(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn non_admin_cannot_change_own_role() {
        let repo = TestRepository::new()
            .with_users(vec![user(2, "coordinator", Role::Coordinador, true, "x")]);
        let payload = UpdateUserPayload {
            role: Some(Role::Admin),
            ..Default::default()
        };
        let err =
            update_user(UserId::new(2).unwrap(), payload, &coordinator(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn non_admin_can_update_own_profile() {
        let repo = TestRepository::new()
            .with_users(vec![user(2, "coordinator", Role::Coordinador, true, "x")]);
        let payload = UpdateUserPayload {
            first_name: Some(PersonName::new("Carla").unwrap()),
            ..Default::default()
        };
        let dto = update_user(UserId::new(2).unwrap(), payload, &coordinator(), &repo).unwrap();
        assert_eq!(dto.first_name, "Carla");
    }

    #[test]
    fn admin_cannot_delete_self() {
        let repo = TestRepository::new()
            .with_users(vec![user(1, "admin", Role::Admin, true, "x")]);
        let err = delete_user(UserId::new(1).unwrap(), &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn admin_cannot_deactivate_self() {
        let repo = TestRepository::new()
            .with_users(vec![user(1, "admin", Role::Admin, true, "x")]);
        let err = toggle_user_status(UserId::new(1).unwrap(), &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn toggle_flips_active_state() {
        let repo = TestRepository::new()
            .with_users(vec![user(5, "ana.luz", Role::Coordinador, true, "x")]);
        let dto = toggle_user_status(UserId::new(5).unwrap(), &admin(), &repo).unwrap();
        assert!(!dto.is_active);
    }

    #[test]
    fn non_admin_reads_only_own_account() {
        let repo = TestRepository::new().with_users(vec![
            user(2, "coordinator", Role::Coordinador, true, "x"),
            user(5, "ana.luz", Role::Coordinador, true, "x"),
        ]);
        assert!(get_user(UserId::new(2).unwrap(), &coordinator(), &repo).is_ok());
        let err = get_user(UserId::new(5).unwrap(), &coordinator(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn stats_count_roles() {
        let repo = TestRepository::new().with_users(vec![
            user(1, "admin", Role::Admin, true, "x"),
            user(2, "coordinator", Role::Coordinador, true, "x"),
            user(3, "old.timer", Role::Coordinador, false, "x"),
        ]);
        let stats = user_stats(&admin(), &repo).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.coordinators, 2);
        assert_eq!(stats.inactive, 1);
    }

    #[test]
    fn coordinator_can_list_users() {
        let repo = TestRepository::new().with_users(vec![
            user(1, "admin", Role::Admin, true, "x"),
            user(2, "coordinator", Role::Coordinador, true, "x"),
        ]);
        let (items, _) = list_users(UserListParams::default(), &coordinator(), &repo).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn coordinator_can_read_stats() {
        let repo = TestRepository::new().with_users(vec![
            user(1, "admin", Role::Admin, true, "x"),
            user(2, "coordinator", Role::Coordinador, true, "x"),
        ]);
        let stats = user_stats(&coordinator(), &repo).unwrap();
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn list_filters_by_role() {
        let repo = TestRepository::new().with_users(vec![
            user(1, "admin", Role::Admin, true, "x"),
            user(2, "coordinator", Role::Coordinador, true, "x"),
        ]);
        let params = UserListParams {
            role: Some("admin".to_string()),
            ..Default::default()
        };
        let (items, _) = list_users(params, &admin(), &repo).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].username, "admin");
    }
}
