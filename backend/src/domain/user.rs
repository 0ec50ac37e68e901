//! User data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::Zeroizing;

/// Validation errors returned by user primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    NonPositiveId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveId => write!(f, "user id must be positive"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier, rejecting zero and negatives.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw < 1 {
            return Err(UserValidationError::NonPositiveId);
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered account. The password hash never leaves the persistence layer
/// through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    created: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Validated signup input.
///
/// ## Invariants
/// - `password` is plaintext and is wiped from memory on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
    password: Zeroizing<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: &str) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: Zeroizing::new(password.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
