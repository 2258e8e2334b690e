//! X-Line-Signature: base64(HMAC-SHA256(channel secret, raw body)).

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn mac(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac
}

/// Signature the platform would send for `body`.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(mac(secret, body).finalize().into_bytes())
}

/// Constant-time check of a header value against the body.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    mac(secret, body).verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_body_verifies() {
        let body = br#"{"destination":"U1","events":[]}"#;
        let sig = sign_body("secret", body);
        assert!(verify_signature("secret", body, &sig));
    }

    #[test]
    fn wrong_secret_or_body_fails() {
        let body = br#"{"events":[]}"#;
        let sig = sign_body("secret", body);
        assert!(!verify_signature("other", body, &sig));
        assert!(!verify_signature("secret", br#"{"events":[1]}"#, &sig));
    }

    #[test]
    fn garbage_signature_fails() {
        assert!(!verify_signature("secret", b"{}", "not base64!!"));
        assert!(!verify_signature("secret", b"{}", ""));
    }
}
