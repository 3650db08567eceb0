//! Double-submit CSRF tokens for the credentials form.
//!
//! The cookie holds `token|sha256(token + secret)`; a form submission is
//! accepted when its `csrfToken` equals the cookie's token and the hash
//! still matches the server secret.

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

pub fn hash_token(token: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Returns `(token, cookie_value)`.
pub fn generate(secret: &str) -> (String, String) {
    let token = general_purpose::URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>());
    let cookie_value = format!("{}|{}", token, hash_token(&token, secret));
    (token, cookie_value)
}

/// Token carried by a well-formed, untampered cookie.
pub fn token_from_cookie(cookie_value: &str, secret: &str) -> Option<String> {
    let (token, hash) = cookie_value.split_once('|')?;
    (hash_token(token, secret) == hash).then(|| token.to_string())
}

pub fn verify(cookie_value: &str, submitted: &str, secret: &str) -> bool {
    token_from_cookie(cookie_value, secret).is_some_and(|token| token == submitted)
}
