use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check a hex-encoded HMAC-SHA256 `signature` of `body`.
pub fn is_valid_signature(signature: &str, body: &[u8], secret: &str) -> bool {
    let decoded = match hex::decode(signature) {
        Ok(decoded) => decoded,
        Err(_) => return false,
    };

    let mut hmac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(hmac) => hmac,
        Err(_) => return false,
    };
    hmac.update(body);

    hmac.verify_slice(&decoded).is_ok()
}

#[cfg(test)]
pub(crate) fn sign(body: &[u8], secret: &str) -> String {
    let mut hmac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    hmac.update(body);
    hex::encode(hmac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_signature, sign};

    #[test]
    fn test_valid_signature() {
        let signature = sign(b"payload", "secret");
        assert!(is_valid_signature(&signature, b"payload", "secret"));
    }

    #[test]
    fn test_invalid_signature() {
        let signature = sign(b"payload", "secret");
        assert!(!is_valid_signature(&signature, b"payload", "other"));
        assert!(!is_valid_signature(&signature, b"tampered", "secret"));
        assert!(!is_valid_signature("not-hex", b"payload", "secret"));
        assert!(!is_valid_signature("", b"payload", "secret"));
    }
}
