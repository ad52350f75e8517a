use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::user::generate_salt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKey {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub create_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutApiKeyRequest {
    pub name: String,
}

/// Returned once when a key is created; `key` is never shown again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyCreated {
    pub id: String,
    pub name: String,
    pub key: String,
}

const SECRET_LENGTH: usize = 40;

pub fn generate_secret() -> String {
    generate_salt(SECRET_LENGTH)
}

pub fn hash_secret(secret: &str) -> String {
    let hash = Sha256::digest(secret.as_bytes());
    format!("{:x}", hash)
}

/// Compares in constant time against a digest from [`hash_secret`].
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    hash_secret(secret).as_bytes().ct_eq(hash.as_bytes()).into()
}

/// Splits a full key `"{id}.{secret}"`.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    let (id, secret) = key.split_once('.')?;
    if id.is_empty() || secret.is_empty() {
        return None;
    }
    Some((id, secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("abc.def"), Some(("abc", "def")));
        assert_eq!(split_key("abc.def.ghi"), Some(("abc", "def.ghi")));
        assert_eq!(split_key("abc"), None);
        assert_eq!(split_key(".def"), None);
        assert_eq!(split_key("abc."), None);
    }

    #[test]
    fn test_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_LENGTH);
        assert!(!secret.contains('.'));
        assert_eq!(hash_secret(&secret), hash_secret(&secret));
        assert_ne!(hash_secret(&secret), hash_secret("other"));

        let hash = hash_secret(&secret);
        assert!(verify_secret(&secret, &hash));
        assert!(!verify_secret("other", &hash));
        assert!(!verify_secret(&secret, &hash[..hash.len() - 1]));
        assert!(!verify_secret(&secret, ""));
    }
}
