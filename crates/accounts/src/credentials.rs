//! E-mail/password input checks, applied before anything is sent to the
//! identity provider.

use crate::error::{AuthError, AuthResult};
use serde::Deserialize;
use std::fmt;

pub const MISSING_CREDENTIALS: &str = "Email and password are required";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

pub const MIN_PASSWORD_LEN: usize = 6;

/// Raw login/signup form fields.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CredentialsForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsForm {
    pub fn validate(&self) -> AuthResult<Credentials> {
        Credentials::validate(self.email.as_deref(), self.password.as_deref())
    }
}

/// Validated credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Checks run in order and the first failure wins.
    pub fn validate(email: Option<&str>, password: Option<&str>) -> AuthResult<Self> {
        let (email, password) = match (email, password) {
            (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
            _ => return Err(AuthError::validation(MISSING_CREDENTIALS)),
        };

        if !email.contains('@') || !email.contains('.') {
            return Err(AuthError::validation(INVALID_EMAIL));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::validation(PASSWORD_TOO_SHORT));
        }

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn message(result: AuthResult<Credentials>) -> String {
        match result {
            Err(AuthError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_credentials() {
        let creds = Credentials::validate(Some("ada@example.com"), Some("hunter22")).unwrap();
        assert_eq!(creds.email(), "ada@example.com");
        assert_eq!(creds.password(), "hunter22");
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(message(Credentials::validate(None, Some("secret1"))), MISSING_CREDENTIALS);
        assert_eq!(message(Credentials::validate(Some("a@b.c"), Some(""))), MISSING_CREDENTIALS);
        assert_eq!(message(CredentialsForm::default().validate()), MISSING_CREDENTIALS);
    }

    #[test]
    fn test_email_needs_at_and_dot() {
        for email in ["ada.example.com", "ada@localhost"] {
            assert_eq!(
                message(Credentials::validate(Some(email), Some("secret1"))),
                INVALID_EMAIL
            );
        }
    }

    #[test]
    fn test_short_password() {
        assert_eq!(
            message(Credentials::validate(Some("ada@example.com"), Some("12345"))),
            PASSWORD_TOO_SHORT
        );
        assert_matches!(Credentials::validate(Some("ada@example.com"), Some("123456")), Ok(_));
    }

    #[test]
    fn test_email_checked_before_password() {
        assert_eq!(message(Credentials::validate(Some("nope"), Some("1"))), INVALID_EMAIL);
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::validate(Some("ada@example.com"), Some("hunter22")).unwrap();
        assert!(!format!("{:?}", creds).contains("hunter22"));
    }
}
