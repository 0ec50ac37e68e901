//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to check credentials without importing the
//! backing infrastructure, so handler tests can swap in a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id. Unknown
    /// emails and wrong passwords are both `ErrorCode::Unauthorized`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
