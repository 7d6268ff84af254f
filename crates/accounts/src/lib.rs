//! Accounts for Bandstand.
//!
//! Sign-in, sign-up, e-mail confirmation and sign-out are delegated to a
//! hosted identity provider through the [`AuthProvider`] trait. This crate
//! owns only the input checks in [`credentials`] and the redirect flow in
//! [`routes`]; password storage and token issuance stay with the provider.

pub mod credentials;
pub mod error;
pub mod provider;
pub mod routes;
pub mod supabase;

pub use credentials::{Credentials, CredentialsForm};
pub use error::{AuthError, AuthResult};
pub use provider::{AuthProvider, OtpType, Session, SignUp, User};
pub use routes::{auth_routes, AuthState, SESSION_COOKIE};
pub use supabase::SupabaseAuth;
