//! Shopify app installation record.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use xmas_events_core::ShopDomain;

/// One installed shop and the credential it granted.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Installation {
    /// Shop domain (primary key).
    pub shop: ShopDomain,
    /// Offline Admin API access token (HIGH PRIVILEGE - redacted in debug output).
    pub access_token: SecretString,
    /// Comma-separated granted scopes, possibly empty.
    pub scope: String,
    /// When the shop last completed the install flow.
    pub installed_at: DateTime<Utc>,
}

impl std::fmt::Debug for Installation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installation")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("installed_at", &self.installed_at)
            .finish()
    }
}
