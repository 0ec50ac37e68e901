//! Driving port for creating snippets.

use async_trait::async_trait;

use crate::domain::{Error, NewSnippet, SnippetId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetsCommand: Send + Sync {
    /// Persist a validated snippet and return its identifier.
    async fn create(&self, snippet: &NewSnippet) -> Result<SnippetId, Error>;
}
