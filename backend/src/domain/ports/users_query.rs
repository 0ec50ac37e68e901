//! Driving port for user reads.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch a user by id. A missing user is `ErrorCode::NotFound`.
    async fn get(&self, id: UserId) -> Result<User, Error>;
}
