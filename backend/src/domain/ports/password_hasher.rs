//! Driven port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The hashing primitive failed or the stored hash is malformed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies passwords. Implementations are CPU bound and are
/// called from blocking threads.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// `Ok(false)` means the password does not match the hash.
    fn verify(&self, password: &str, hashed: &str) -> Result<bool, PasswordHashError>;
}
