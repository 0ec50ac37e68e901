//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; adapters convert them into
//! domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{snippets, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = snippets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SnippetRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = snippets)]
pub(crate) struct NewSnippetRow<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: i64,
    pub hashed_password: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub created: DateTime<Utc>,
}
