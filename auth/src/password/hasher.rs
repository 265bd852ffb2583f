use bcrypt::BcryptError;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Provides adaptive, salted password hashing (internally uses bcrypt).
/// Inputs longer than 72 bytes are truncated by the primitive, so two
/// passwords sharing the same first 72 bytes verify against each other's hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Cost used when none is configured.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;
    /// Lowest cost accepted, only suitable for automated tests.
    pub const MIN_COST: u32 = 4;
    /// Highest cost accepted.
    pub const MAX_COST: u32 = 31;

    /// Create a new password hasher with the default cost.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }

    /// Create a password hasher with an explicit cost factor.
    ///
    /// # Arguments
    /// * `cost` - bcrypt work factor (log2 of the number of rounds)
    ///
    /// # Errors
    /// * `InvalidCost` - Cost is outside `MIN_COST..=MAX_COST`
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }

        Ok(Self { cost })
    }

    /// Configured cost factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password securely.
    ///
    /// Every call draws a fresh random salt, so hashing the same password
    /// twice never yields the same string.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Modular crypt format hash (includes version, cost, salt, and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - Salt generation or hashing failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash
    ///
    /// # Returns
    /// True if password matches, false otherwise (including when `hash` is
    /// not a well-formed bcrypt string)
    ///
    /// # Errors
    /// * `VerificationFailed` - An I/O failure interrupted verification
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        match bcrypt::verify(password, hash) {
            Ok(matches) => Ok(matches),
            Err(BcryptError::Io(e)) => Err(PasswordError::VerificationFailed(e.to_string())),
            Err(_) => Ok(false),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(PasswordHasher::MIN_COST).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$2"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();

        let first = hasher.hash("p").unwrap();
        let second = hasher.hash("p").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("p", &first).unwrap());
        assert!(hasher.verify("p", &second).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash_is_false() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("password", "invalid_hash").unwrap());
        assert!(!hasher.verify("password", "").unwrap());
        assert!(!hasher.verify("password", "$2b$04$tooshort").unwrap());
    }

    #[test]
    fn test_input_beyond_72_bytes_is_ignored() {
        let hasher = fast_hasher();
        let prefix = "a".repeat(72);

        let hash = hasher.hash(&prefix).unwrap();

        assert!(hasher.verify(&format!("{}suffix", prefix), &hash).unwrap());
        assert!(!hasher.verify(&"a".repeat(71), &hash).unwrap());
    }

    #[test]
    fn test_cost_is_embedded_in_hash() {
        let hasher = fast_hasher();
        let hash = hasher.hash("p").unwrap();

        assert!(hash.contains("$04$"));
    }

    #[test]
    fn test_with_cost_rejects_out_of_range() {
        assert_eq!(
            PasswordHasher::with_cost(3),
            Err(PasswordError::InvalidCost(3))
        );
        assert_eq!(
            PasswordHasher::with_cost(32),
            Err(PasswordError::InvalidCost(32))
        );
        assert_eq!(PasswordHasher::new().cost(), PasswordHasher::DEFAULT_COST);
    }
}
