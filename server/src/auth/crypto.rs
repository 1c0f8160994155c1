use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a bearer token, as stored in `sessions.token_hash`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_token_differs_per_token() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
        assert_eq!(hash_token("token-a").len(), 64);
    }
}
