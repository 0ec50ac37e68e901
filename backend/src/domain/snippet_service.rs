//! Snippet domain service.
//!
//! Implements the snippet driving ports on top of a `SnippetRepository` and
//! owns the translation of persistence failures into domain errors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    LATEST_SNIPPETS_LIMIT, SnippetPersistenceError, SnippetRepository, SnippetsCommand,
    SnippetsQuery,
};
use crate::domain::{Error, NewSnippet, Snippet, SnippetId};

/// Snippet service implementing [`SnippetsCommand`] and [`SnippetsQuery`].
#[derive(Clone)]
pub struct SnippetService<R> {
    repository: Arc<R>,
}

impl<R> SnippetService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

fn map_persistence_error(error: SnippetPersistenceError) -> Error {
    match error {
        SnippetPersistenceError::Connection { message } => Error::internal(message),
        SnippetPersistenceError::Query { message } => Error::internal(message),
    }
}

#[async_trait]
impl<R> SnippetsCommand for SnippetService<R>
where
    R: SnippetRepository + 'static,
{
    async fn create(&self, snippet: &NewSnippet) -> Result<SnippetId, Error> {
        self.repository
            .insert(snippet)
            .await
            .map_err(map_persistence_error)
    }
}

#[async_trait]
impl<R> SnippetsQuery for SnippetService<R>
where
    R: SnippetRepository + 'static,
{
    async fn get(&self, id: SnippetId) -> Result<Snippet, Error> {
        self.repository
            .find_live(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("snippet not found"))
    }

    async fn latest(&self) -> Result<Vec<Snippet>, Error> {
        self.repository
            .latest_live(LATEST_SNIPPETS_LIMIT)
            .await
            .map_err(map_persistence_error)
    }
}
