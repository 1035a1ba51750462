//! Authorization redirect URL.

use url::Url;
use xmas_events_core::ShopDomain;

use super::state::{DEFAULT_STATE_BYTES, generate_state};

/// Path Shopify redirects back to after the merchant approves the install.
pub const CALLBACK_PATH: &str = "/api/auth/callback";

/// An authorization redirect and the state it embeds.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Where to send the merchant.
    pub url: Url,
    /// State token the caller must remember until the callback.
    pub state: String,
}

/// Callback URL for an app served at `app_url`.
#[must_use]
pub fn redirect_uri(app_url: &str) -> String {
    format!("{}{CALLBACK_PATH}", app_url.trim_end_matches('/'))
}

/// Build `https://<shop>/admin/oauth/authorize` with a fresh state token.
///
/// # Errors
///
/// Returns `url::ParseError` if the resulting URL is malformed, which a
/// validated [`ShopDomain`] rules out in practice.
pub fn build_authorize_url(
    shop: &ShopDomain,
    scopes: &str,
    app_url: &str,
    client_id: &str,
) -> Result<AuthorizationRequest, url::ParseError> {
    let state = generate_state(DEFAULT_STATE_BYTES);

    let mut url = Url::parse(&format!("https://{shop}/admin/oauth/authorize"))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("scope", scopes)
        .append_pair("redirect_uri", &redirect_uri(app_url))
        .append_pair("state", &state);

    Ok(AuthorizationRequest { url, state })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_redirect_uri_trims_trailing_slashes() {
        assert_eq!(
            redirect_uri("https://xmas.example.com//"),
            "https://xmas.example.com/api/auth/callback"
        );
    }

    #[test]
    fn test_build_authorize_url() {
        let shop = ShopDomain::parse("foo.myshopify.com").unwrap();
        let request = build_authorize_url(
            &shop,
            "read_products,write_products",
            "https://xmas.example.com/",
            "client-id",
        )
        .unwrap();

        assert_eq!(request.url.host_str(), Some("foo.myshopify.com"));
        assert_eq!(request.url.path(), "/admin/oauth/authorize");

        let query: HashMap<_, _> = request.url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "client-id");
        assert_eq!(query["scope"], "read_products,write_products");
        assert_eq!(query["redirect_uri"], "https://xmas.example.com/api/auth/callback");
        assert_eq!(query["state"], request.state);
        assert_eq!(request.state.len(), 32);
    }

    #[test]
    fn test_each_request_gets_new_state() {
        let shop = ShopDomain::parse("foo.myshopify.com").unwrap();
        let a = build_authorize_url(&shop, "", "https://x.example.com", "id").unwrap();
        let b = build_authorize_url(&shop, "", "https://x.example.com", "id").unwrap();
        assert_ne!(a.state, b.state);
    }
}
