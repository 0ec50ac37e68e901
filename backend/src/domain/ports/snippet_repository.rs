//! Driven port for snippet storage.
use async_trait::async_trait;

use crate::domain::{NewSnippet, Snippet, SnippetId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by snippet repository adapters.
    pub enum SnippetPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "snippet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "snippet repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetRepository: Send + Sync {
    /// Store a snippet whose expiry is measured from the insertion time.
    async fn insert(&self, snippet: &NewSnippet) -> Result<SnippetId, SnippetPersistenceError>;

    /// Fetch a snippet that has not yet expired.
    async fn find_live(&self, id: SnippetId) -> Result<Option<Snippet>, SnippetPersistenceError>;

    /// Most recently created unexpired snippets, newest first.
    async fn latest_live(&self, limit: i64) -> Result<Vec<Snippet>, SnippetPersistenceError>;
}
