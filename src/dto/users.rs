use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::user::User;

/// User view returned to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub phone: String,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let full_name = value.full_name();
        Self {
            id: value.id.get(),
            username: value.username.into_inner(),
            email: value.email.into_inner(),
            first_name: value.first_name.into_inner(),
            last_name: value.last_name.into_inner(),
            full_name,
            role: value.role.as_str().to_string(),
            is_active: value.is_active,
            phone: value.phone.into_inner(),
            last_login: value.last_login,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginDto {
    pub user: UserDto,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserStatsDto {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub admins: usize,
    pub coordinators: usize,
    pub recent: Vec<UserDto>,
}
