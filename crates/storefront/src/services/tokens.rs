//! Bearer tokens.
//!
//! Tokens are 32 random bytes, URL-safe base64 encoded. Only
//! `sha256(pepper || token)` is ever stored, so a leaked table cannot be
//! replayed without the pepper.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Generate a fresh token. Shown to the operator once, never stored.
#[must_use]
pub fn generate_token() -> SecretString {
    let bytes: [u8; 32] = rand::random();
    SecretString::from(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a presented token for lookup.
#[must_use]
pub fn hash_token(pepper: &SecretString, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pepper.expose_secret().as_bytes());
    hasher.update(token.as_bytes());
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            use std::fmt::Write;
            let _ = write!(out, "{byte:02x}");
            out
        })
}
