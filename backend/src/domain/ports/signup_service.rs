//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, NewUser};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Register an account. A taken email address is `ErrorCode::Conflict`.
    async fn register(&self, user: &NewUser) -> Result<(), Error>;
}
