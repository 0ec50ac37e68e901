//! PostgreSQL-backed `SnippetRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{SnippetPersistenceError, SnippetRepository};
use crate::domain::{NewSnippet, Snippet, SnippetId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSnippetRow, SnippetRow};
use super::pool::{DbPool, PoolError};
use super::schema::snippets;

/// Diesel-backed implementation of the `SnippetRepository` port.
#[derive(Clone)]
pub struct DieselSnippetRepository {
    pool: DbPool,
}

impl DieselSnippetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SnippetPersistenceError {
    map_basic_pool_error(error, SnippetPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SnippetPersistenceError {
    map_basic_diesel_error(
        error,
        SnippetPersistenceError::query,
        SnippetPersistenceError::connection,
    )
}

fn row_to_snippet(row: SnippetRow) -> Result<Snippet, SnippetPersistenceError> {
    let id = SnippetId::new(row.id).map_err(|err| {
        warn!(id = row.id, "snippet row carries an invalid id");
        SnippetPersistenceError::query(err.to_string())
    })?;
    Ok(Snippet::new(id, row.title, row.content, row.created, row.expires))
}

#[async_trait]
impl SnippetRepository for DieselSnippetRepository {
    async fn insert(&self, snippet: &NewSnippet) -> Result<SnippetId, SnippetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let created = Utc::now();
        let row = NewSnippetRow {
            title: snippet.title(),
            content: snippet.content(),
            created,
            expires: created + snippet.expiry().duration(),
        };

        let id: i64 = diesel::insert_into(snippets::table)
            .values(&row)
            .returning(snippets::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        SnippetId::new(id).map_err(|err| SnippetPersistenceError::query(err.to_string()))
    }

    async fn find_live(&self, id: SnippetId) -> Result<Option<Snippet>, SnippetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = snippets::table
            .filter(snippets::id.eq(id.get()))
            .filter(snippets::expires.gt(Utc::now()))
            .select(SnippetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_snippet).transpose()
    }

    async fn latest_live(&self, limit: i64) -> Result<Vec<Snippet>, SnippetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = snippets::table
            .filter(snippets::expires.gt(Utc::now()))
            .order((snippets::created.desc(), snippets::id.desc()))
            .limit(limit)
            .select(SnippetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_snippet).collect()
    }
}
