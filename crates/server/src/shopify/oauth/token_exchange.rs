//! Authorization code exchange.
//!
//! `POST https://<shop>/admin/oauth/access_token` with a JSON body of
//! `{client_id, client_secret, code}` returns the shop's offline access
//! token and the scopes actually granted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token exchange failed.
///
/// `status` carries the upstream HTTP status when Shopify answered with a
/// non-success code; it is `None` for network failures, timeouts and
/// unparsable bodies.
#[derive(Debug, Error)]
#[error("{}", describe_failure(.status))]
pub struct ExchangeError {
    /// Upstream HTTP status, if one was received.
    pub status: Option<u16>,
}

#[allow(clippy::ref_option)]
fn describe_failure(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("token exchange failed with status {code}"),
        None => "token exchange failed".to_string(),
    }
}

/// Access token granted by a successful exchange.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Deserialize)]
pub struct AccessTokenGrant {
    /// Offline Admin API access token.
    pub access_token: String,
    /// Granted scopes (empty when Shopify omits them or sends `null`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scope: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::fmt::Debug for AccessTokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Request body for the code exchange.
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Exchange a one-time authorization `code` at `origin`.
///
/// # Errors
///
/// Returns [`ExchangeError`] on a non-2xx status, transport failure, or a
/// response body that is not a token grant. No retries are attempted.
pub(super) async fn exchange_code(
    http: &reqwest::Client,
    origin: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<AccessTokenGrant, ExchangeError> {
    let url = format!("{origin}/admin/oauth/access_token");

    let response = http
        .post(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&TokenExchangeRequest {
            client_id,
            client_secret,
            code,
        })
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Token exchange request failed");
            ExchangeError { status: None }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "Token exchange rejected");
        return Err(ExchangeError {
            status: Some(status.as_u16()),
        });
    }

    response.json::<AccessTokenGrant>().await.map_err(|e| {
        tracing::warn!(error = %e, "Token exchange returned an unexpected body");
        ExchangeError { status: None }
    })
}
