//! Browser-facing account routes. Every outcome is a 303 redirect; errors
//! travel to the target page in the query string.

use crate::credentials::CredentialsForm;
use crate::error::AuthError;
use crate::provider::{AuthProvider, OtpType};
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const SESSION_COOKIE: &str = "bandstand-session";

pub const LOGIN_PAGE: &str = "/login";
pub const PRIVATE_PAGE: &str = "/private";
pub const CONFIRM_PAGE: &str = "/auth/confirm";

pub const ALREADY_REGISTERED: &str = "This email is already registered";
pub const CHECK_EMAIL: &str = "Check your email for confirmation";
pub const MISSING_VERIFICATION_PARAMS: &str = "Missing verification parameters";

pub struct AuthState {
    pub provider: Arc<dyn AuthProvider>,
    /// Mark the session cookie `Secure`. Off only for plain-http development.
    pub secure_cookies: bool,
}

impl AuthState {
    pub fn new(provider: Arc<dyn AuthProvider>, secure_cookies: bool) -> Arc<Self> {
        Arc::new(Self {
            provider,
            secure_cookies,
        })
    }

    fn session_cookie(&self, access_token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, access_token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build()
    }
}

/// `path?k=v&...` with form-encoded values.
pub fn redirect_with(path: &str, params: &[(&str, &str)]) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    Redirect::to(&format!("{}?{}", path, query))
}

fn login_error(err: &AuthError) -> Redirect {
    redirect_with(LOGIN_PAGE, &[("error", err.user_message())])
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> (CookieJar, Redirect) {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(err) => return (jar, login_error(&err)),
    };

    match state.provider.sign_in(&credentials).await {
        Ok(session) => {
            info!(email = credentials.email(), "Login succeeded");
            let jar = jar.add(state.session_cookie(session.access_token));
            (jar, Redirect::to(PRIVATE_PAGE))
        }
        Err(err) => {
            warn!(email = credentials.email(), error = %err, "Login failed");
            (jar, login_error(&err))
        }
    }
}

/// POST /signup
pub async fn signup(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> (CookieJar, Redirect) {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(err) => return (jar, login_error(&err)),
    };

    let outcome = match state.provider.sign_up(&credentials).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(email = credentials.email(), error = %err, "Signup failed");
            return (jar, login_error(&err));
        }
    };

    if let Some(user) = &outcome.user {
        if user.is_existing_account() {
            info!(email = credentials.email(), "Signup for registered address");
            return (
                jar,
                redirect_with(LOGIN_PAGE, &[("error", ALREADY_REGISTERED)]),
            );
        }
        if user.awaiting_confirmation() {
            info!(email = credentials.email(), "Confirmation e-mail sent");
            return (jar, redirect_with(CONFIRM_PAGE, &[("message", CHECK_EMAIL)]));
        }
    }

    let jar = match outcome.session {
        Some(session) => jar.add(state.session_cookie(session.access_token)),
        None => jar,
    };
    (jar, Redirect::to(PRIVATE_PAGE))
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmParams {
    pub token_hash: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn confirm_error(message: &str) -> Redirect {
    redirect_with(CONFIRM_PAGE, &[("status", "error"), ("message", message)])
}

/// GET /api/auth/confirm
pub async fn confirm(
    State(state): State<Arc<AuthState>>,
    Query(params): Query<ConfirmParams>,
) -> Redirect {
    let (token_hash, kind) = match (params.token_hash.as_deref(), params.kind.as_deref()) {
        (Some(hash), Some(kind)) if !hash.is_empty() && !kind.is_empty() => (hash, kind),
        _ => {
            warn!("Missing verification parameters");
            return confirm_error(MISSING_VERIFICATION_PARAMS);
        }
    };

    let kind = match kind.parse::<OtpType>() {
        Ok(kind) => kind,
        Err(err) => return confirm_error(err.user_message()),
    };

    match state.provider.verify_otp(token_hash, kind).await {
        Ok(()) => {
            info!(%kind, "E-mail verification succeeded");
            redirect_with(CONFIRM_PAGE, &[("status", "success")])
        }
        Err(err) => {
            warn!(%kind, error = %err, "E-mail verification failed");
            confirm_error(err.user_message())
        }
    }
}

/// POST /logout
///
/// The cookie is cleared even when the provider call fails.
pub async fn logout(State(state): State<Arc<AuthState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(err) = state.provider.sign_out(cookie.value()).await {
            warn!(error = %err, "Provider sign-out failed");
        }
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to(LOGIN_PAGE))
}

pub fn auth_routes(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/logout", post(logout))
        .route("/api/auth/confirm", get(confirm))
        .with_state(state)
}
