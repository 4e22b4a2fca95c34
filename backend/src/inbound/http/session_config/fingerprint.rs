//! Loggable fingerprint of the session cookie key.
//!
//! Replicas behind one load balancer must share a key or sessions bounce
//! between signed-in and signed-out. Comparing fingerprints in the startup
//! logs shows a mismatch without printing key material.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 16;

/// First 16 hex characters of the SHA-256 of the master key.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use portal::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let mut encoded = hex::encode(Sha256::digest(key.master()));
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn replicas_sharing_a_key_agree() {
        let material = [7_u8; 64];
        assert_eq!(
            key_fingerprint(&Key::from(&material)),
            key_fingerprint(&Key::from(&material))
        );
    }

    #[rstest]
    fn rotated_keys_are_told_apart() {
        let before = Key::derive_from(&[b'a'; 64]);
        let after = Key::derive_from(&[b'b'; 64]);
        assert_ne!(key_fingerprint(&before), key_fingerprint(&after));
    }

    #[rstest]
    fn fingerprint_is_lowercase_hex() {
        let fp = key_fingerprint(&Key::generate());
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }
}
