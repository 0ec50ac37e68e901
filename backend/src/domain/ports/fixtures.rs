//! In-memory port implementations with fixed data.
//!
//! Used by HTTP tests and by local development when no database is wired.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::{
    Error, LoginCredentials, NewSnippet, NewUser, Snippet, SnippetId, User, UserId,
};

use super::{LoginService, SignupService, SnippetsCommand, SnippetsQuery, UsersQuery};

/// Email address the fixture treats as already registered.
pub const FIXTURE_DUPLICATE_EMAIL: &str = "dupe@example.com";
/// Email of the single fixture account.
pub const FIXTURE_USER_EMAIL: &str = "alice@example.com";
/// Password of the single fixture account.
pub const FIXTURE_USER_PASSWORD: &str = "pa$$word";

fn fixture_snippet_id() -> Result<SnippetId, Error> {
    SnippetId::new(1).map_err(|err| Error::internal(format!("invalid fixture snippet id: {err}")))
}

fn fixture_user_id() -> Result<UserId, Error> {
    UserId::new(1).map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
}

fn fixture_snippet() -> Result<Snippet, Error> {
    let now = Utc::now();
    Ok(Snippet::new(
        fixture_snippet_id()?,
        "An old silent pond",
        "An old silent pond...",
        now,
        now + Duration::days(1),
    ))
}

/// Snippet store holding snippet 1 and assigning id 2 to every insert.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSnippets;

#[async_trait]
impl SnippetsCommand for FixtureSnippets {
    async fn create(&self, _snippet: &NewSnippet) -> Result<SnippetId, Error> {
        SnippetId::new(2).map_err(|err| Error::internal(format!("invalid fixture snippet id: {err}")))
    }
}

#[async_trait]
impl SnippetsQuery for FixtureSnippets {
    async fn get(&self, id: SnippetId) -> Result<Snippet, Error> {
        if id == fixture_snippet_id()? {
            fixture_snippet()
        } else {
            Err(Error::not_found("snippet not found"))
        }
    }

    async fn latest(&self) -> Result<Vec<Snippet>, Error> {
        Ok(vec![fixture_snippet()?])
    }
}

/// Account store holding user 1 ("Alice").
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccounts;

#[async_trait]
impl SignupService for FixtureAccounts {
    async fn register(&self, user: &NewUser) -> Result<(), Error> {
        if user.email() == FIXTURE_DUPLICATE_EMAIL {
            Err(Error::conflict("email address already in use"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LoginService for FixtureAccounts {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.email() == FIXTURE_USER_EMAIL
            && credentials.password() == FIXTURE_USER_PASSWORD
        {
            fixture_user_id()
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[async_trait]
impl UsersQuery for FixtureAccounts {
    async fn get(&self, id: UserId) -> Result<User, Error> {
        if id == fixture_user_id()? {
            Ok(User::new(id, "Alice", FIXTURE_USER_EMAIL, Utc::now()))
        } else {
            Err(Error::not_found("user not found"))
        }
    }
}
