use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const EMAIL_MAX_LENGTH: usize = 254;
pub const NAME_MAX_LENGTH: usize = 150;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)?;
        if self.username.is_empty()
            || self.username.chars().count() > NAME_MAX_LENGTH
            || !self.username.chars().all(is_username_char)
        {
            return Err(AppError::BadRequest(
                "username: Only letters, numbers and symbols @/./+/-/_ are allowed".into(),
            ));
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().is_empty() || value.chars().count() > NAME_MAX_LENGTH {
                return Err(AppError::BadRequest(format!(
                    "{field}: must be between 1 and {NAME_MAX_LENGTH} characters"
                )));
            }
        }
        validate_password(&self.password)
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_')
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let valid = email.len() <= EMAIL_MAX_LENGTH
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::BadRequest("email: Enter a valid email address".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 8 {
        return Err(AppError::BadRequest(
            "password: must contain at least 8 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub auth_token: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: "cook@example.com".into(),
            username: "cook.master+1".into(),
            first_name: "Ivan".into(),
            last_name: "Petrov".into(),
            password: "correct horse".into(),
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn rejects_bad_username() {
        let mut req = request();
        req.username = "bad name!".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let mut req = request();
        req.email = "nobody".into();
        assert!(req.validate().is_err());

        let mut req = request();
        req.password = "short".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_blank_names() {
        let mut req = request();
        req.last_name = "  ".into();
        assert!(req.validate().is_err());
    }
}
