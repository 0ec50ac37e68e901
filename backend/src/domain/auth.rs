//! Authentication primitives such as login credentials.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::UserId;

/// Returned when login values are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use snippetbox::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice@example.com ", "pa$$word").unwrap();
/// assert_eq!(creds.email(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Stored credential pair looked up by email during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub id: UserId,
    pub hashed_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("a@b.c", "", LoginValidationError::EmptyPassword)]
    fn rejects_blank_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(
            LoginCredentials::try_from_parts(email, password),
            Err(expected)
        );
    }

    #[rstest]
    fn keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("a@b.c", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }
}
