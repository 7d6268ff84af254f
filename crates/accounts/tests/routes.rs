//! Account routes driven end to end with a scripted identity provider.

use accounts::{
    auth_routes, AuthError, AuthProvider, AuthResult, AuthState, Credentials, OtpType, Session,
    SignUp,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Accepts one known account and records every call it receives.
#[derive(Default)]
struct ScriptedProvider {
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for ScriptedProvider {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Session> {
        self.record(format!("sign_in:{}", credentials.email()));
        if credentials.email() == "ada@example.com" && credentials.password() == "analytical" {
            Ok(Session {
                access_token: "token-ada".to_string(),
                refresh_token: None,
                expires_in: Some(3600),
                user: None,
            })
        } else {
            Err(AuthError::Provider {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUp> {
        self.record(format!("sign_up:{}", credentials.email()));
        Err(AuthError::Transport("connection reset".to_string()))
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> AuthResult<()> {
        self.record(format!("verify:{}:{}", token_hash, kind));
        Err(AuthError::Provider {
            status: 403,
            message: "Email link is invalid or has expired".to_string(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        self.record(format!("sign_out:{}", access_token));
        Ok(())
    }
}

fn app(provider: Arc<ScriptedProvider>) -> Router {
    auth_routes(AuthState::new(provider, true))
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn header_value(response: &axum::response::Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn login_then_logout() {
    let provider = Arc::new(ScriptedProvider::default());

    let response = app(provider.clone())
        .oneshot(post_form("/login", "email=ada%40example.com&password=analytical"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/private");

    let cookie = header_value(&response, header::SET_COOKIE);
    assert!(cookie.contains("Secure"));
    let pair = cookie.split(';').next().unwrap_or_default().to_string();
    assert_eq!(pair, "bandstand-session=token-ada");

    let response = app(provider.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(header_value(&response, header::LOCATION), "/login");

    assert_eq!(
        provider.calls(),
        vec!["sign_in:ada@example.com", "sign_out:token-ada"]
    );
}

#[tokio::test]
async fn logout_without_session_skips_provider() {
    let provider = Arc::new(ScriptedProvider::default());

    let response = app(provider.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(header_value(&response, header::LOCATION), "/login");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn short_password_never_reaches_provider() {
    let provider = Arc::new(ScriptedProvider::default());

    let response = app(provider.clone())
        .oneshot(post_form("/signup", "email=ada%40example.com&password=abc"))
        .await
        .unwrap();

    assert_eq!(
        header_value(&response, header::LOCATION),
        "/login?error=Password+must+be+at+least+6+characters"
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn provider_outage_shows_generic_message() {
    let provider = Arc::new(ScriptedProvider::default());

    let response = app(provider)
        .oneshot(post_form("/signup", "email=ada%40example.com&password=analytical"))
        .await
        .unwrap();

    assert_eq!(
        header_value(&response, header::LOCATION),
        "/login?error=Server+error+occurred"
    );
}

#[tokio::test]
async fn expired_link_reports_provider_message() {
    let provider = Arc::new(ScriptedProvider::default());

    let response = app(provider.clone())
        .oneshot(
            Request::builder()
                .uri("/api/auth/confirm?token_hash=stale&type=email")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        header_value(&response, header::LOCATION),
        "/auth/confirm?status=error&message=Email+link+is+invalid+or+has+expired"
    );
    assert_eq!(provider.calls(), vec!["verify:stale:email"]);
}

#[tokio::test]
async fn unknown_otp_type_is_rejected_locally() {
    let provider = Arc::new(ScriptedProvider::default());

    let response = app(provider.clone())
        .oneshot(
            Request::builder()
                .uri("/api/auth/confirm?token_hash=abc&type=sms")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        header_value(&response, header::LOCATION),
        "/auth/confirm?status=error&message=Invalid+verification+type%3A+sms"
    );
    assert!(provider.calls().is_empty());
}
