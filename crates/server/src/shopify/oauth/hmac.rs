//! HMAC-SHA256 verification of OAuth callback query strings.
//!
//! Shopify signs callback redirects by sorting every query parameter except
//! `hmac` and `signature`, joining them as `key=value` pairs with `&`, and
//! signing that message with the app's client secret. The hex digest is
//! sent back as the `hmac` parameter.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Build the signed message from callback parameters.
///
/// Returns the message and the provided digest (empty when absent). When a
/// name repeats, the last value wins.
#[must_use]
pub fn signing_message(params: &[(String, String)]) -> (String, String) {
    let mut sorted: BTreeMap<&str, &str> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let provided = sorted.remove("hmac").unwrap_or_default().to_string();
    sorted.remove("signature");

    let message = sorted
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    (message, provided)
}

/// Compute the lowercase hex HMAC-SHA256 of `message`.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify the `hmac` parameter of an OAuth callback.
///
/// The provided digest is hex-decoded before a constant-time comparison, so
/// upper- and lowercase hex both verify. A missing or non-hex digest is
/// simply invalid.
#[must_use]
pub fn verify_query_hmac(secret: &str, params: &[(String, String)]) -> bool {
    let (message, provided) = signing_message(params);
    if provided.is_empty() {
        return false;
    }

    let Ok(provided) = hex::decode(&provided) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&provided).is_ok()
}
