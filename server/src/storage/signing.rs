use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Issues and checks time-limited blob URLs.
///
/// The signature is HMAC-SHA256 over `"{key}\n{expires}"`, hex encoded.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha256,
    base_url: String,
    ttl_secs: i64,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: &[u8], base_url: &str, ttl_secs: i64) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl_secs,
        })
    }

    fn mac_for(&self, key: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    pub fn sign(&self, key: &str, expires: i64) -> String {
        hex::encode(self.mac_for(key, expires).finalize().into_bytes())
    }

    /// Signed URL valid for the configured TTL from `now` (unix seconds).
    pub fn signed_url_at(&self, key: &str, now: i64) -> String {
        let expires = now.saturating_add(self.ttl_secs);
        format!(
            "{}/api/blobs/{}?expires={}&signature={}",
            self.base_url,
            key,
            expires,
            self.sign(key, expires)
        )
    }

    pub fn signed_url(&self, key: &str) -> String {
        self.signed_url_at(key, chrono::Utc::now().timestamp())
    }

    /// Check a signature in constant time and reject expired links.
    pub fn verify(&self, key: &str, expires: i64, signature: &str, now: i64) -> bool {
        if expires < now {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        self.mac_for(key, expires).verify_slice(&signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_800_000_000;

    fn signer() -> UrlSigner {
        UrlSigner::new(b"test-secret-test-secret-test-secret", "https://food.example.com/", 600)
            .unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap_or("")
    }

    #[test]
    fn test_signed_url_shape() {
        let url = signer().signed_url_at("recipes/r/p.jpg", NOW);
        assert!(url.starts_with("https://food.example.com/api/blobs/recipes/r/p.jpg?expires="));
        assert_eq!(query_param(&url, "expires"), (NOW + 600).to_string());
        assert_eq!(query_param(&url, "signature").len(), 64);
    }

    #[test]
    fn test_verify_accepts_own_signature() {
        let signer = signer();
        let url = signer.signed_url_at("recipes/r/p.jpg", NOW);
        let signature = query_param(&url, "signature");
        assert!(signer.verify("recipes/r/p.jpg", NOW + 600, signature, NOW + 10));
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let signer = signer();
        let signature = signer.sign("recipes/r/p.jpg", NOW + 600);
        assert!(!signer.verify("recipes/r/other.jpg", NOW + 600, &signature, NOW));
        assert!(!signer.verify("recipes/r/p.jpg", NOW + 601, &signature, NOW));
        assert!(!signer.verify("recipes/r/p.jpg", NOW + 600, "not-hex", NOW));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let signer = signer();
        let signature = signer.sign("recipes/r/p.jpg", NOW);
        assert!(!signer.verify("recipes/r/p.jpg", NOW, &signature, NOW + 1));
    }

    #[test]
    fn test_different_secrets_disagree() {
        let other = UrlSigner::new(b"another-secret-another-secret-xx", "http://x", 600).unwrap();
        let signature = signer().sign("k", NOW);
        assert!(!other.verify("k", NOW, &signature, NOW));
    }

    #[test]
    fn test_expiry_saturates_instead_of_overflowing() {
        let signer = UrlSigner::new(b"test-secret-test-secret-test-secret", "http://x", i64::MAX)
            .unwrap();
        let url = signer.signed_url_at("k", NOW);
        assert_eq!(query_param(&url, "expires"), i64::MAX.to_string());
    }
}
