//! Shared-secret hashing.

use sha2::{Digest, Sha256};

/// Number of hex characters of a token hash that may appear in logs.
pub const SHORT_HASH_LEN: usize = 12;

/// Derive the stable link identifier for a shared secret.
///
/// The token is trimmed before hashing so that secrets copied with stray
/// whitespace still match. The result is lowercase hex SHA-256 of
/// `token + pepper`.
///
/// # Examples
///
/// ```
/// use kavex_gateway::hash_token;
///
/// assert_eq!(hash_token("  secret\n", "pepper"), hash_token("secret", "pepper"));
/// assert_ne!(hash_token("secret", "a"), hash_token("secret", "b"));
/// ```
pub fn hash_token(token: &str, pepper: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    hasher.update(pepper.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Loggable prefix of a token hash.
pub fn short_hash(token_hash: &str) -> &str {
    token_hash.get(..SHORT_HASH_LEN).unwrap_or(token_hash)
}
