//! OAuth `state` tokens.

use rand::RngCore;
use subtle::ConstantTimeEq;

/// Default number of random bytes in a state token (32 hex characters).
pub const DEFAULT_STATE_BYTES: usize = 16;

/// Generate a random, lowercase hex-encoded state token of `len` bytes.
#[must_use]
pub fn generate_state(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time comparison of the cookie state against the query state.
#[must_use]
pub fn states_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}
