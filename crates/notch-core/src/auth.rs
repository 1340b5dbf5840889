use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("infallible: HMAC accepts keys of any length")
}

// ---------------------------------------------------------------------------
// AdminCredentials
// ---------------------------------------------------------------------------

/// The single shared admin password, held as an HMAC tag so that checking a
/// candidate takes the same time whatever it contains.
pub struct AdminCredentials {
    key: Vec<u8>,
    tag: Vec<u8>,
}

impl AdminCredentials {
    pub fn new(password: &str, secret: &str) -> Self {
        let key = secret.as_bytes().to_vec();
        let mut mac = keyed(&key);
        mac.update(password.as_bytes());
        let tag = mac.finalize().into_bytes().to_vec();
        Self { key, tag }
    }

    /// An empty candidate never matches.
    pub fn verify(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        let mut mac = keyed(&self.key);
        mac.update(candidate.as_bytes());
        mac.verify_slice(&self.tag).is_ok()
    }
}

// ---------------------------------------------------------------------------
// SessionSigner
// ---------------------------------------------------------------------------

/// Signs session tokens for the cookie as `<token>.<base64url hmac>`.
pub struct SessionSigner {
    key: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    pub fn sign(&self, token: &str) -> String {
        let mut mac = keyed(&self.key);
        mac.update(token.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{token}.{sig}")
    }

    /// Return the token if the signature checks out.
    pub fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (token, sig) = value.rsplit_once('.')?;
        if token.is_empty() {
            return None;
        }
        let expected = URL_SAFE_NO_PAD.decode(sig).ok()?;
        let mut mac = keyed(&self.key);
        mac.update(token.as_bytes());
        mac.verify_slice(&expected).ok()?;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_matches_only_itself() {
        let creds = AdminCredentials::new("hunter2", "secret");
        assert!(creds.verify("hunter2"));
        assert!(!creds.verify("hunter3"));
        assert!(!creds.verify("hunter22"));
        assert!(!creds.verify(""));
    }

    #[test]
    fn empty_configured_password_never_matches() {
        let creds = AdminCredentials::new("", "secret");
        assert!(!creds.verify(""));
    }

    #[test]
    fn signed_token_verifies() {
        let signer = SessionSigner::new("secret");
        let cookie = signer.sign("abc123");
        assert!(cookie.starts_with("abc123."));
        assert_eq!(signer.verify(&cookie), Some("abc123"));
    }

    #[test]
    fn tampered_or_foreign_cookies_are_rejected() {
        let signer = SessionSigner::new("secret");
        let cookie = signer.sign("abc123");
        let forged = cookie.replacen("abc123", "abc124", 1);
        assert_eq!(signer.verify(&forged), None);
        assert_eq!(signer.verify("abc123"), None);
        assert_eq!(signer.verify(".sig"), None);
        assert_eq!(signer.verify("abc123.!!!"), None);

        let other = SessionSigner::new("other-secret");
        assert_eq!(other.verify(&cookie), None);
    }
}
