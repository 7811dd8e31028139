//! Password hashing and random tokens.

use rand::Rng;

/// Key-derivation context for password hashes.
const PASSWORD_CONTEXT: &str = "pimp 2024-01-01 account password v1";

/// Bytes of randomness in salts and tokens.
const TOKEN_BYTES: usize = 32;

/// Generate a random hex token for sessions and password resets.
pub(crate) fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Generate a random hex salt.
pub(crate) fn generate_salt() -> String {
    generate_token()
}

/// Hash a password with its salt.
pub(crate) fn hash_password(password: &str, salt: &str) -> String {
    digest(password, salt).to_hex().to_string()
}

/// Check a password against a stored hash.
///
/// The comparison goes through `blake3::Hash` equality, which is constant time.
pub(crate) fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let Ok(stored) = blake3::Hash::from_hex(stored_hash) else {
        return false;
    };
    digest(password, salt) == stored
}

fn digest(password: &str, salt: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_and_verify() {
        let salt = generate_salt();
        let hash = hash_password("correct horse", &salt);
        assert!(verify_password("correct horse", &salt, &hash));
        assert!(!verify_password("wrong horse", &salt, &hash));
    }

    #[test]
    fn test_salt_changes_hash() {
        assert_ne!(
            hash_password("secret123", "salt-a"),
            hash_password("secret123", "salt-b")
        );
    }

    #[test]
    fn test_malformed_stored_hash_fails() {
        assert!(!verify_password("anything", "salt", "not-hex"));
    }
}
