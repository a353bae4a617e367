use serde::Deserialize;
use validator::Validate;

use crate::forms::FormError;

/// Login request. Both fields are optional at the wire level so that
/// missing values surface as a validation error rather than a parse error.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email_or_username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginPayload {
    pub identity: String,
    pub password: String,
}

impl TryFrom<LoginForm> for LoginPayload {
    type Error = FormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        let identity = value
            .email_or_username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let password = value.password.filter(|s| !s.is_empty());
        match (identity, password) {
            (Some(identity), Some(password)) => Ok(Self {
                identity: identity.to_string(),
                password,
            }),
            _ => Err(FormError::Validation(
                "email_or_username and password are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordForm {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6, message = "new password must have at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

impl TryFrom<ChangePasswordForm> for ChangePasswordPayload {
    type Error = FormError;

    fn try_from(value: ChangePasswordForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            current_password: value.current_password,
            new_password: value.new_password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            email_or_username: Some("ana".to_string()),
            password: None,
        };
        assert!(LoginPayload::try_from(form).is_err());

        let form = LoginForm {
            email_or_username: Some("  ".to_string()),
            password: Some("secret".to_string()),
        };
        assert!(LoginPayload::try_from(form).is_err());
    }

    #[test]
    fn login_trims_identity() {
        let form = LoginForm {
            email_or_username: Some(" ana@example.com ".to_string()),
            password: Some("secret".to_string()),
        };
        let payload = LoginPayload::try_from(form).unwrap();
        assert_eq!(payload.identity, "ana@example.com");
    }

    #[test]
    fn change_password_enforces_minimum_length() {
        let form = ChangePasswordForm {
            current_password: "old".to_string(),
            new_password: "short".to_string(),
        };
        assert!(ChangePasswordPayload::try_from(form).is_err());
    }
}
