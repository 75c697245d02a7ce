//! bcrypt hashing for stored user passwords.

pub use bcrypt::BcryptError;

/// Cost used when the caller has no configured value.
pub const DEFAULT_COST: u32 = 10;

/// Hash `password` with a fresh salt. CPU-bound; async callers should run
/// it on a blocking thread.
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost)
}

/// Compare `password` against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_verifies_and_is_salted() {
        let first = hash_password("correct horse", TEST_COST).unwrap();
        let second = hash_password("correct horse", TEST_COST).unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("correct horse"));
        assert!(verify_password("correct horse", &first).unwrap());
        assert!(!verify_password("battery staple", &first).unwrap());
    }

    #[test]
    fn hash_embeds_cost() {
        let hash = hash_password("pw", TEST_COST).unwrap();
        assert!(hash.starts_with("$2b$04$"));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }
}
