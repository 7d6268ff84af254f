//! Router assembly. Optional surfaces are mounted only when configured.

use accounts::{auth_routes, AuthProvider, AuthState};
use axum::Router;
use instrument::{instrument_routes, InstrumentApiState, InstrumentService};
use payments::{checkout_routes, CheckoutState, PaymentProvider};
use server::{health_routes, HealthState};
use std::sync::Arc;

pub struct AuthSurface {
    pub provider: Arc<dyn AuthProvider>,
    pub secure_cookies: bool,
}

pub struct CheckoutSurface {
    pub provider: Arc<dyn PaymentProvider>,
    pub default_currency: String,
}

pub struct Surfaces {
    pub instruments: InstrumentService,
    pub health: Arc<HealthState>,
    pub auth: Option<AuthSurface>,
    pub checkout: Option<CheckoutSurface>,
}

pub fn build_router(surfaces: Surfaces) -> Router {
    let mut router = instrument_routes(InstrumentApiState::new(surfaces.instruments))
        .merge(health_routes(surfaces.health));

    if let Some(auth) = surfaces.auth {
        router = router.merge(auth_routes(AuthState::new(auth.provider, auth.secure_cookies)));
    }

    if let Some(checkout) = surfaces.checkout {
        router = router.merge(checkout_routes(CheckoutState::new(
            checkout.provider,
            &checkout.default_currency,
        )));
    }

    router
}
