//! App installation callback.
//!
//! Runs the checks Shopify's OAuth redirect must pass, in order, before
//! anything is persisted:
//!
//! 1. `shop`, `code` and `state` present, `shop` a valid merchant domain
//! 2. `hmac` signature valid over every received parameter
//! 3. `state` equal to the one issued at authorize time (the cookie)
//! 4. code exchanged for an access token
//! 5. installation upserted
//!
//! The first failing step ends the flow; nothing is retried.

use thiserror::Error;
use tracing::instrument;
use xmas_events_core::ShopDomain;

use crate::db::{InstallationStore, RepositoryError};
use crate::models::Installation;
use crate::shopify::oauth::{OAuthClient, state::states_match};

/// Reasons an installation callback is rejected.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Missing parameters or an invalid shop domain.
    #[error("missing or invalid callback parameters")]
    BadRequest,

    /// The `hmac` parameter does not match.
    #[error("invalid HMAC signature")]
    InvalidSignature,

    /// The `state` parameter does not match the issued state.
    #[error("invalid state")]
    InvalidState,

    /// Shopify refused the code or could not be reached.
    #[error("token exchange failed (status {})", display_status(.status))]
    ExchangeFailed {
        /// Upstream HTTP status, if one was received.
        status: Option<u16>,
    },

    /// The installation could not be saved.
    #[error("failed to store installation: {0}")]
    Storage(#[from] RepositoryError),
}

#[allow(clippy::ref_option)]
fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl InstallError {
    /// Whether the failure is the caller's fault (4xx) rather than ours.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadRequest | Self::InvalidSignature | Self::InvalidState
        )
    }
}

/// Last value of `name` in a query parameter list.
///
/// Matches the HMAC message, where a repeated name keeps its last value.
fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

/// Complete an installation from Shopify's callback.
///
/// `params` is the full callback query; `expected_state` is the state
/// issued at authorize time (absent if the cookie was not sent back).
///
/// # Errors
///
/// Returns the [`InstallError`] for the first step that fails.
#[instrument(skip_all, fields(shop))]
pub async fn complete_installation(
    oauth: &OAuthClient,
    store: &dyn InstallationStore,
    params: &[(String, String)],
    expected_state: Option<&str>,
) -> Result<Installation, InstallError> {
    let (Some(shop), Some(code), Some(state)) = (
        param(params, "shop"),
        param(params, "code"),
        param(params, "state"),
    ) else {
        return Err(InstallError::BadRequest);
    };
    let shop = ShopDomain::parse(shop).map_err(|_| InstallError::BadRequest)?;
    tracing::Span::current().record("shop", shop.as_str());

    if !oauth.verify_hmac(params) {
        tracing::warn!("Rejected callback with invalid HMAC");
        return Err(InstallError::InvalidSignature);
    }

    if !expected_state.is_some_and(|expected| states_match(expected, state)) {
        tracing::warn!(cookie_present = expected_state.is_some(), "Rejected callback with mismatched state");
        return Err(InstallError::InvalidState);
    }

    let grant = oauth
        .exchange_code(&shop, code)
        .await
        .map_err(|e| InstallError::ExchangeFailed { status: e.status })?;

    let installation = store.upsert(&shop, &grant.access_token, &grant.scope).await?;

    tracing::info!(scope = %installation.scope, "Shop installed");
    Ok(installation)
}
