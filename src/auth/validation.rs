//! Request payloads accepted by the authentication endpoints.

use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Credentials posted to `/login`. Missing or null fields deserialize as empty
/// strings so that validation, not the extractor, reports them.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "The email field is required."))]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Operator request to add a user to the directory.
#[derive(Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,

    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_login_fields_fail_validation() {
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn null_login_fields_read_as_missing() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email": null, "password": "x"}"#).unwrap();
        assert_eq!(request.email, "");
        assert_eq!(request.password, "x");

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(!errors.field_errors().contains_key("password"));
    }

    #[test]
    fn login_email_is_not_format_checked() {
        // Any string is looked up verbatim; a malformed address simply won't match.
        let request = LoginRequest { email: "not-an-email".into(), password: "x".into() };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let request = LoginRequest { email: "a@x.com".into(), password: "hunter2".into() };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("a@x.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn create_user_requires_valid_email() {
        let request = CreateUserRequest {
            email: "nope".into(),
            name: "Alice".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_err());

        let request = CreateUserRequest { email: "a@x.com".into(), ..request };
        assert!(request.validate().is_ok());
    }
}
