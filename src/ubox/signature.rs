//! Login password signature
//!
//! The portal expects the password as base64(HMAC-SHA1(key = "", password))
//! with the final base64 character swapped for a comma.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Sign a password for the login request
pub fn hmac_sha1_base64(data: &str) -> String {
    // An all-zero block-sized key is the padded form of the empty key
    let mut mac = <HmacSha1 as KeyInit>::new(&Default::default());
    mac.update(data.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut encoded = STANDARD.encode(digest);
    encoded.pop();
    encoded.push(',');
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_shape() {
        let sig = hmac_sha1_base64("password");
        // 20-byte digest -> 28 base64 chars, padding '=' replaced
        assert_eq!(sig.len(), 28);
        assert!(sig.ends_with(','));
        assert!(!sig.contains('='));
    }

    #[test]
    fn test_signature_known_value() {
        // HMAC-SHA1 with empty key over empty message: fbdb1d1b18aa6c08324b7d64b71fb76370690e1d
        assert_eq!(hmac_sha1_base64(""), "+9sdGxiqbAgyS31ktx+3Y3BpDh0,");
        assert_eq!(hmac_sha1_base64("password"), "rgqoFHiJ6Aw9nYFzFVrPDHdIcrE,");
    }

    #[test]
    fn test_zero_key_matches_empty_key() {
        let mut empty = <HmacSha1 as KeyInit>::new_from_slice(b"").unwrap();
        empty.update(b"secret");
        let expected = STANDARD.encode(empty.finalize().into_bytes());

        let sig = hmac_sha1_base64("secret");
        assert_eq!(&sig[..27], &expected[..27]);
    }

    #[test]
    fn test_signature_deterministic() {
        assert_eq!(hmac_sha1_base64("abc123"), hmac_sha1_base64("abc123"));
        assert_ne!(hmac_sha1_base64("abc123"), hmac_sha1_base64("abc124"));
    }

    #[test]
    fn test_signature_unicode_password() {
        let sig = hmac_sha1_base64("pässwörd");
        assert_eq!(sig.len(), 28);
        assert!(sig.ends_with(','));
    }
}
