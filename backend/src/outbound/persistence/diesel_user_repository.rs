//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewUserRecord, UserPersistenceError, UserRepository};
use crate::domain::{StoredCredentials, User, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CredentialsRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if is_unique_violation(&error) {
        return UserPersistenceError::duplicate_email();
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn to_user_id(raw: i64) -> Result<UserId, UserPersistenceError> {
    UserId::new(raw).map_err(|err| UserPersistenceError::query(err.to_string()))
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    Ok(User::new(to_user_id(row.id)?, row.name, row.email, row.created))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<UserId, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            name: &record.name,
            email: &record.email,
            hashed_password: &record.hashed_password,
            created: Utc::now(),
        };
        let id: i64 = diesel::insert_into(users::table)
            .values(&row)
            .returning(users::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_user_id(id)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            Ok(StoredCredentials {
                id: to_user_id(row.id)?,
                hashed_password: row.hashed_password,
            })
        })
        .transpose()
    }
}
