//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Install (HTML)
//! GET     /api/auth/start       - Redirect to Shopify authorize page (alias /authorize-start)
//! GET     /api/auth/callback    - Complete installation (alias /authorize-callback)
//!
//! # Health
//! GET     /api/health           - Liveness JSON
//! GET     /health/ready         - Installation store reachability
//!
//! # Pricing (CORS *)
//! GET     /api/pricing          - Normalized ticket pricing
//! PUT     /api/pricing          - Normalize and save ticket pricing
//! OPTIONS /api/pricing          - CORS preflight
//!
//! # Events
//! GET     /api/events-feed      - Event days of a month
//! GET     /api/ics              - Single-event calendar file
//! ```

pub mod auth;
pub mod events;
pub mod health;
pub mod ics;
pub mod pricing;

use axum::Router;
use xmas_events_core::ShopDomain;

use crate::error::AppError;
use crate::models::Installation;
use crate::state::AppState;

/// Build the application router (without state).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(health::router())
        .merge(pricing::router())
        .merge(events::router())
        .merge(ics::router())
}

/// Pick the installation a request acts on.
///
/// An explicit `shop` must be installed; without one the earliest
/// installation is used.
pub(crate) async fn resolve_installation(
    state: &AppState,
    shop: Option<&str>,
) -> Result<Installation, AppError> {
    let installation = match shop.filter(|s| !s.is_empty()) {
        Some(shop) => {
            let shop = ShopDomain::parse(&shop.to_lowercase())
                .map_err(|e| AppError::BadRequest(format!("Invalid shop: {e}")))?;
            state.store().find(&shop).await?
        }
        None => state.store().first().await?,
    };

    installation.ok_or(AppError::NoInstallation)
}
