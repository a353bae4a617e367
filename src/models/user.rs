use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{Email, PersonName, Phone, Role, TypeConstraintError, UserId, Username};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser, UserPatch};

/// Diesel model representing the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub phone: String,
    pub last_login: Option<NaiveDateTime>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`User`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub phone: String,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for partial user updates.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub phone: Option<String>,
    pub last_login: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl UserChanges {
    pub fn from_patch(patch: UserPatch, now: NaiveDateTime) -> Self {
        Self {
            username: patch.username.map(Username::into_inner),
            email: patch.email.map(Email::into_inner),
            password_hash: patch.password_hash,
            first_name: patch.first_name.map(PersonName::into_inner),
            last_name: patch.last_name.map(PersonName::into_inner),
            role: patch.role.map(Into::into),
            is_active: patch.is_active,
            phone: patch.phone.map(Phone::into_inner),
            last_login: patch.last_login,
            updated_at: now,
        }
    }
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.try_into()?,
            username: Username::new(user.username)?,
            email: Email::new(user.email)?,
            password_hash: user.password_hash,
            first_name: PersonName::new(user.first_name)?,
            last_name: PersonName::new(user.last_name)?,
            role: Role::try_from(user.role)?,
            is_active: user.is_active,
            phone: Phone::new(user.phone)?,
            last_login: user.last_login,
            created_by: user
                .created_by
                .map(UserId::try_from)
                .transpose()?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl From<DomainNewUser> for NewUser {
    fn from(user: DomainNewUser) -> Self {
        Self {
            username: user.username.into_inner(),
            email: user.email.into_inner(),
            password_hash: user.password_hash,
            first_name: user.first_name.into_inner(),
            last_name: user.last_name.into_inner(),
            role: user.role.into(),
            is_active: user.is_active,
            phone: user.phone.into_inner(),
            created_by: user.created_by.map(UserId::get),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
