//! Account domain service: signup, login and user lookups.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    LoginService, NewUserRecord, PasswordHashError, PasswordHasher, SignupService,
    UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{Error, LoginCredentials, NewUser, User, UserId};

/// Account service implementing [`SignupService`], [`LoginService`] and
/// [`UsersQuery`].
#[derive(Clone)]
pub struct AccountService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> AccountService<R, H> {
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail => Error::conflict("email address already in use"),
        UserPersistenceError::Connection { message } => Error::internal(message),
        UserPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

impl<R, H> AccountService<R, H>
where
    H: PasswordHasher + 'static,
{
    /// Run a hashing call on the blocking pool.
    async fn with_hasher<T, F>(&self, op: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&H) -> Result<T, PasswordHashError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || op(hasher.as_ref()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }
}

#[async_trait]
impl<R, H> SignupService for AccountService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, user: &NewUser) -> Result<(), Error> {
        let password = zeroize::Zeroizing::new(user.password().to_owned());
        let hashed_password = self
            .with_hasher(move |hasher| hasher.hash(password.as_str()))
            .await?;
        let record = NewUserRecord {
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            hashed_password,
        };
        let id = self
            .users
            .insert(&record)
            .await
            .map_err(map_persistence_error)?;
        debug!(user_id = %id, "account registered");
        Ok(())
    }
}

#[async_trait]
impl<R, H> LoginService for AccountService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
        else {
            return Err(Error::unauthorized("invalid credentials"));
        };

        let password = zeroize::Zeroizing::new(credentials.password().to_owned());
        let hashed = stored.hashed_password;
        let matches = self
            .with_hasher(move |hasher| hasher.verify(password.as_str(), &hashed))
            .await?;
        if matches {
            Ok(stored.id)
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[async_trait]
impl<R, H> UsersQuery for AccountService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn get(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
