//! Checkout for Bandstand.
//!
//! `POST /api/checkout` validates an amount and currency, asks a
//! [`PaymentProvider`] for a hosted checkout session, and returns its id for
//! the browser to redirect to. Card handling stays entirely with the provider.

pub mod checkout;
pub mod error;
pub mod provider;
pub mod routes;
pub mod stripe;

pub use checkout::CheckoutRequest;
pub use error::{PaymentError, PaymentResult};
pub use provider::{CheckoutSession, PaymentProvider};
pub use routes::{checkout_routes, CheckoutState};
pub use stripe::{Product, StripeCheckout};
