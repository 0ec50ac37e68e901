//! Outbound adapters implementing the driven ports.

pub mod password;
pub mod persistence;

pub use password::BcryptPasswordHasher;
