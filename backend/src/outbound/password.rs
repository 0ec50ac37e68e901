//! bcrypt-backed `PasswordHasher` adapter.

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Work factor used for new hashes in production.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Hashes passwords with bcrypt at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        bcrypt::hash(password, self.cost).map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hashed: &str) -> Result<bool, PasswordHashError> {
        bcrypt::verify(password, hashed).map_err(|err| PasswordHashError::hash(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> BcryptPasswordHasher {
        // bcrypt's minimum cost keeps the suite fast.
        BcryptPasswordHasher::new(4)
    }

    #[rstest]
    fn verifies_the_original_password(hasher: BcryptPasswordHasher) {
        let hashed = hasher.hash("pa$$word").expect("hash");
        assert_eq!(hashed.len(), 60);
        assert!(hasher.verify("pa$$word", &hashed).expect("verify"));
        assert!(!hasher.verify("wrong", &hashed).expect("verify"));
    }

    #[rstest]
    fn malformed_hashes_are_errors(hasher: BcryptPasswordHasher) {
        assert!(hasher.verify("pa$$word", "not-a-hash").is_err());
    }

    #[rstest]
    fn default_cost_is_twelve() {
        assert_eq!(BcryptPasswordHasher::default().cost, 12);
    }
}
