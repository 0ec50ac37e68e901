//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`SnippetsCommand`, `SnippetsQuery`, `SignupService`,
//! `LoginService`, `UsersQuery`) are called by inbound adapters. Driven ports
//! (`SnippetRepository`, `UserRepository`, `PasswordHasher`) are implemented
//! by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod fixtures;
mod login_service;
mod password_hasher;
mod signup_service;
mod snippet_repository;
mod snippets_command;
mod snippets_query;
mod user_repository;
mod users_query;

pub use fixtures::{
    FIXTURE_DUPLICATE_EMAIL, FIXTURE_USER_EMAIL, FIXTURE_USER_PASSWORD, FixtureAccounts,
    FixtureSnippets,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use signup_service::MockSignupService;
pub use signup_service::SignupService;
#[cfg(test)]
pub use snippet_repository::MockSnippetRepository;
pub use snippet_repository::{SnippetPersistenceError, SnippetRepository};
#[cfg(test)]
pub use snippets_command::MockSnippetsCommand;
pub use snippets_command::SnippetsCommand;
#[cfg(test)]
pub use snippets_query::MockSnippetsQuery;
pub use snippets_query::{LATEST_SNIPPETS_LIMIT, SnippetsQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUserRecord, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
