//! Request signing for Cloudinary's authenticated API calls.
//!
//! Parameters are sorted by name, joined as `name=value` pairs with `&`, the
//! API secret is appended, and the result is hashed with SHA-256.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Hex-encoded signature over `params`.
///
/// Empty values are skipped, matching how the host builds its own string.
pub(super) fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
