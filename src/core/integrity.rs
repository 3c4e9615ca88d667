//! HMAC-SHA256 tagging and verification.
//!
//! Tags cover the ciphertext, not the plaintext, keyed by the HMAC half of
//! the data key. Verification is constant-time and fails closed: a mismatch
//! means the caller never sees any plaintext.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::core::constants::KEY_HALF_LEN;
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 tag of `message`.
pub fn tag(message: &[u8], key: &[u8; KEY_HALF_LEN]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a stored hex tag against `message`.
///
/// Comparison happens inside `verify_slice`, which is constant-time. Every
/// failure, including an unparsable stored tag, maps to
/// [`Error::HmacValidationFailed`] so tampering is indistinguishable from
/// corruption.
pub fn verify(message: &[u8], key: &[u8; KEY_HALF_LEN], expected_hex: &str) -> Result<()> {
    let expected = hex::decode(expected_hex).map_err(|_| Error::HmacValidationFailed)?;
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    mac.verify_slice(&expected)
        .map_err(|_| Error::HmacValidationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [42u8; 32];

    #[test]
    fn test_tag_is_hex_sha256_length() {
        let t = tag(b"ciphertext bytes", &KEY);
        assert_eq!(t.len(), 64);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tag_is_deterministic() {
        assert_eq!(tag(b"payload", &KEY), tag(b"payload", &KEY));
    }

    #[test]
    fn test_verify_accepts_matching_tag() {
        let t = tag(b"payload", &KEY);
        assert!(verify(b"payload", &KEY, &t).is_ok());
    }

    #[test]
    fn test_verify_rejects_modified_message() {
        let t = tag(b"payload", &KEY);
        assert!(matches!(
            verify(b"payloae", &KEY, &t),
            Err(Error::HmacValidationFailed)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let other: [u8; 32] = [43u8; 32];
        let t = tag(b"payload", &KEY);
        assert!(verify(b"payload", &other, &t).is_err());
    }

    #[test]
    fn test_verify_rejects_unparsable_tag() {
        assert!(matches!(
            verify(b"payload", &KEY, "not hex at all"),
            Err(Error::HmacValidationFailed)
        ));
    }

    #[test]
    fn test_tag_depends_on_message_and_key() {
        let other: [u8; 32] = [43u8; 32];
        assert_ne!(tag(b"a", &KEY), tag(b"b", &KEY));
        assert_ne!(tag(b"a", &KEY), tag(b"a", &other));
    }
}
