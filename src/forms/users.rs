use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{Email, PersonName, Phone, Role, Username};
use crate::forms::FormError;

/// Query parameters accepted by the user list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserForm {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    pub role: String,
    pub phone: String,
    pub is_active: Option<bool>,
}

/// `password` stays plaintext here; the auth service hashes it before the
/// record reaches the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserPayload {
    pub username: Username,
    pub email: Email,
    pub password: String,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: Role,
    pub phone: Phone,
    pub is_active: bool,
}

impl TryFrom<CreateUserForm> for CreateUserPayload {
    type Error = FormError;

    fn try_from(value: CreateUserForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            username: Username::new(value.username)?,
            email: Email::new(value.email)?,
            password: value.password,
            first_name: PersonName::new(value.first_name)?,
            last_name: PersonName::new(value.last_name)?,
            role: Role::try_from(value.role)?,
            phone: Phone::new(value.phone)?,
            is_active: value.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserPayload {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub password: Option<String>,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub role: Option<Role>,
    pub phone: Option<Phone>,
    pub is_active: Option<bool>,
}

impl UpdateUserPayload {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.phone.is_none()
            && self.is_active.is_none()
    }

    /// Whether the payload touches fields only admins may change.
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

impl TryFrom<UpdateUserForm> for UpdateUserPayload {
    type Error = FormError;

    fn try_from(value: UpdateUserForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            username: value.username.map(Username::new).transpose()?,
            email: value.email.map(Email::new).transpose()?,
            password: value.password,
            first_name: value.first_name.map(PersonName::new).transpose()?,
            last_name: value.last_name.map(PersonName::new).transpose()?,
            role: value.role.map(Role::try_from).transpose()?,
            phone: value.phone.map(Phone::new).transpose()?,
            is_active: value.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_form() -> CreateUserForm {
        CreateUserForm {
            username: "ana.luz".to_string(),
            email: "Ana@Example.com".to_string(),
            password: "secret123".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Luz".to_string(),
            role: "coordinador".to_string(),
            phone: "5551234567".to_string(),
            is_active: None,
        }
    }

    #[test]
    fn create_lowercases_email_and_parses_role() {
        let payload = CreateUserPayload::try_from(minimal_form()).unwrap();
        assert_eq!(payload.email.as_str(), "ana@example.com");
        assert_eq!(payload.role, Role::Coordinador);
        assert!(payload.is_active);
    }

    #[test]
    fn create_rejects_short_password() {
        let mut form = minimal_form();
        form.password = "12345".to_string();
        assert!(CreateUserPayload::try_from(form).is_err());
    }

    #[test]
    fn update_detects_privileged_fields() {
        let payload = UpdateUserPayload {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(payload.touches_privileged_fields());
        assert!(!UpdateUserPayload::default().touches_privileged_fields());
    }
}
