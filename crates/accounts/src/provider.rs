use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Kind of one-time token carried by a confirmation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::Signup => "signup",
            OtpType::Invite => "invite",
            OtpType::Magiclink => "magiclink",
            OtpType::Recovery => "recovery",
            OtpType::EmailChange => "email_change",
            OtpType::Email => "email",
        }
    }
}

impl FromStr for OtpType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpType::Signup),
            "invite" => Ok(OtpType::Invite),
            "magiclink" => Ok(OtpType::Magiclink),
            "recovery" => Ok(OtpType::Recovery),
            "email_change" => Ok(OtpType::EmailChange),
            "email" => Ok(OtpType::Email),
            other => Err(AuthError::validation(format!(
                "Invalid verification type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Linked identities. The provider answers a sign-up for an existing
    /// address with an empty list instead of an error.
    #[serde(default)]
    pub identities: Option<Vec<Value>>,
    #[serde(default)]
    pub confirmation_sent_at: Option<String>,
}

impl User {
    pub fn is_existing_account(&self) -> bool {
        matches!(&self.identities, Some(ids) if ids.is_empty())
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.confirmation_sent_at.is_some()
    }
}

#[derive(Clone, PartialEq, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<User>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a sign-up. A session is only issued when the provider does not
/// require e-mail confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUp {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// Operations the accounts routes need from an identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Session>;

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUp>;

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> AuthResult<()>;

    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_otp_type_parse() {
        for kind in ["signup", "invite", "magiclink", "recovery", "email_change", "email"] {
            assert_eq!(kind.parse::<OtpType>().unwrap().as_str(), kind);
        }
        assert_matches!("sms".parse::<OtpType>(), Err(AuthError::Validation(_)));
    }

    #[test]
    fn test_existing_account_detection() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "email": "ada@example.com",
            "identities": []
        }))
        .unwrap();
        assert!(user.is_existing_account());
        assert!(!user.awaiting_confirmation());

        let fresh: User = serde_json::from_value(json!({
            "id": "u2",
            "identities": [{"provider": "email"}],
            "confirmation_sent_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(!fresh.is_existing_account());
        assert!(fresh.awaiting_confirmation());
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session: Session =
            serde_json::from_value(json!({"access_token": "jwt.secret.value"})).unwrap();
        assert!(!format!("{:?}", session).contains("jwt.secret.value"));
    }
}
