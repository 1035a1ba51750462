//! Shopify app OAuth (authorization code grant).
//!
//! # Flow
//!
//! 1. [`OAuthClient::authorization_request`] builds the authorize redirect and
//!    a state token; the caller stores the state in a short-lived cookie.
//! 2. Shopify redirects back with `code`, `shop`, `state` and a signed `hmac`.
//! 3. [`OAuthClient::verify_hmac`] checks the signature,
//!    [`state::states_match`] the state, and
//!    [`OAuthClient::exchange_code`] trades the code for an access token.

pub mod authorize;
pub mod hmac;
pub mod state;
mod token_exchange;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use xmas_events_core::ShopDomain;

use crate::config::ShopifyAppConfig;

pub use authorize::{AuthorizationRequest, CALLBACK_PATH};
pub use token_exchange::{AccessTokenGrant, ExchangeError};

/// Shopify OAuth client for the app install flow.
///
/// Cheap to clone; holds one shared HTTP client.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    scopes: String,
    app_url: String,
    origin_override: Option<String>,
}

impl OAuthClient {
    /// Create a new OAuth client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify app credentials
    /// * `app_url` - Public base URL used to build the callback URL
    /// * `http` - Shared HTTP client (carries the request timeout)
    #[must_use]
    pub fn new(config: &ShopifyAppConfig, app_url: &str, http: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                http,
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                scopes: config.scopes.clone(),
                app_url: app_url.trim_end_matches('/').to_string(),
                origin_override: config.origin_override.clone(),
            }),
        }
    }

    /// Build the authorize redirect for `shop` with a fresh state token.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the authorize URL cannot be built.
    pub fn authorization_request(
        &self,
        shop: &ShopDomain,
    ) -> Result<AuthorizationRequest, url::ParseError> {
        authorize::build_authorize_url(
            shop,
            &self.inner.scopes,
            &self.inner.app_url,
            &self.inner.client_id,
        )
    }

    /// Verify the `hmac` signature over callback query parameters.
    #[must_use]
    pub fn verify_hmac(&self, params: &[(String, String)]) -> bool {
        hmac::verify_query_hmac(self.inner.client_secret.expose_secret(), params)
    }

    /// Exchange an authorization code for the shop's access token.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError`] if Shopify rejects the code or cannot be
    /// reached.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessTokenGrant, ExchangeError> {
        token_exchange::exchange_code(
            &self.inner.http,
            &self.origin(shop),
            &self.inner.client_id,
            self.inner.client_secret.expose_secret(),
            code,
        )
        .await
    }

    fn origin(&self, shop: &ShopDomain) -> String {
        shop_origin(self.inner.origin_override.as_deref(), shop)
    }
}

/// Base URL for server-to-server calls to `shop`.
#[must_use]
pub fn shop_origin(origin_override: Option<&str>, shop: &ShopDomain) -> String {
    origin_override.map_or_else(|| format!("https://{shop}"), ToString::to_string)
}
