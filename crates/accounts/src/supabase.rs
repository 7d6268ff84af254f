//! [`AuthProvider`] over the Supabase GoTrue REST API.

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::provider::{AuthProvider, OtpType, Session, SignUp, User};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct SupabaseAuth {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SupabaseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseAuth")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Sign-up answers with a session when confirmation is off, otherwise with
/// the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(User),
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self::with_client(base_url, anon_key, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, anon_key: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str, bearer: &str) -> RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(request: RequestBuilder) -> AuthResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        let message = provider_message(&body).unwrap_or_else(|| status.to_string());
        warn!(status = status.as_u16(), %message, "Identity provider rejected request");

        Err(AuthError::Provider {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Serialization(e.to_string()))
    }
}

/// GoTrue reports errors under several keys depending on the endpoint.
fn provider_message(body: &Value) -> Option<String> {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn credentials_body(credentials: &Credentials) -> Value {
    json!({
        "email": credentials.email(),
        "password": credentials.password(),
    })
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    #[instrument(skip_all, fields(email = credentials.email()))]
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Session> {
        let request = self
            .post("token", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&credentials_body(credentials));

        let session: Session = Self::decode(Self::send(request).await?).await?;
        debug!("Signed in");
        Ok(session)
    }

    #[instrument(skip_all, fields(email = credentials.email()))]
    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUp> {
        let request = self
            .post("signup", &self.anon_key)
            .json(&credentials_body(credentials));

        let outcome = match Self::decode::<SignUpResponse>(Self::send(request).await?).await? {
            SignUpResponse::Session(session) => SignUp {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => SignUp {
                user: Some(user),
                session: None,
            },
        };
        debug!(
            confirmation_sent = outcome
                .user
                .as_ref()
                .is_some_and(User::awaiting_confirmation),
            "Signed up"
        );
        Ok(outcome)
    }

    #[instrument(skip(self, token_hash))]
    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> AuthResult<()> {
        let request = self
            .post("verify", &self.anon_key)
            .json(&json!({ "token_hash": token_hash, "type": kind.as_str() }));

        Self::send(request).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        Self::send(self.post("logout", access_token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_endpoints() {
        let auth = SupabaseAuth::new("https://project.supabase.co/", "anon");
        assert_eq!(auth.base_url(), "https://project.supabase.co");
        assert_eq!(
            auth.endpoint("signup"),
            "https://project.supabase.co/auth/v1/signup"
        );
    }

    #[test]
    fn test_provider_message_keys() {
        assert_eq!(
            provider_message(&json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            provider_message(&json!({"code": 422, "msg": "User already registered"})),
            Some("User already registered".to_string())
        );
        assert_eq!(provider_message(&json!({"code": 500})), None);
    }

    #[test]
    fn test_signup_response_shapes() {
        let unconfirmed: SignUpResponse = serde_json::from_value(json!({
            "id": "u1",
            "email": "ada@example.com",
            "identities": [{"provider": "email"}],
            "confirmation_sent_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_matches!(unconfirmed, SignUpResponse::User(u) if u.awaiting_confirmation());

        let confirmed: SignUpResponse = serde_json::from_value(json!({
            "access_token": "jwt",
            "expires_in": 3600,
            "user": {"id": "u1"}
        }))
        .unwrap();
        assert_matches!(confirmed, SignUpResponse::Session(s) if s.access_token == "jwt");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let auth = SupabaseAuth::new("http://127.0.0.1:1", "anon");
        let creds = Credentials::validate(Some("ada@example.com"), Some("secret1")).unwrap();
        assert_matches!(auth.sign_in(&creds).await, Err(AuthError::Transport(_)));
    }
}
