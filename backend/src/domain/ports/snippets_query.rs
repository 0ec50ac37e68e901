//! Driving port for reading snippets.

use async_trait::async_trait;

use crate::domain::{Error, Snippet, SnippetId};

/// Number of snippets shown on the home page.
pub const LATEST_SNIPPETS_LIMIT: i64 = 10;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetsQuery: Send + Sync {
    /// Fetch an unexpired snippet. Missing and expired snippets are both
    /// `ErrorCode::NotFound`.
    async fn get(&self, id: SnippetId) -> Result<Snippet, Error>;

    /// Up to [`LATEST_SNIPPETS_LIMIT`] unexpired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, Error>;
}
