//! Snippet entity and the value types used to create one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Validation errors for snippet primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetValidationError {
    /// Identifier text was not a decimal integer.
    MalformedId,
    /// Identifier was zero or negative.
    NonPositiveId,
    /// Expiry was not one of the permitted lifetimes.
    UnknownExpiry,
}

impl fmt::Display for SnippetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedId => write!(f, "snippet id must be a decimal integer"),
            Self::NonPositiveId => write!(f, "snippet id must be positive"),
            Self::UnknownExpiry => write!(f, "expiry must be one of 365, 7 or 1 days"),
        }
    }
}

impl std::error::Error for SnippetValidationError {}

/// Positive integer identifying a stored snippet.
///
/// # Examples
/// ```
/// use snippetbox::domain::SnippetId;
///
/// assert_eq!(SnippetId::parse("42").unwrap().get(), 42);
/// assert!(SnippetId::parse("-1").is_err());
/// assert!(SnippetId::parse("1.23").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SnippetId(i64);

impl SnippetId {
    /// Wrap a raw identifier, rejecting zero and negatives.
    pub fn new(raw: i64) -> Result<Self, SnippetValidationError> {
        if raw < 1 {
            return Err(SnippetValidationError::NonPositiveId);
        }
        Ok(Self(raw))
    }

    /// Parse an identifier taken from a URL segment.
    pub fn parse(text: &str) -> Result<Self, SnippetValidationError> {
        let raw = text
            .parse::<i64>()
            .map_err(|_| SnippetValidationError::MalformedId)?;
        Self::new(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permitted snippet lifetimes, keyed by their form value in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    OneYear,
    OneWeek,
    OneDay,
}

impl Expiry {
    /// Form values accepted for the `expires` field.
    pub const PERMITTED: [&'static str; 3] = ["365", "7", "1"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneYear => "365",
            Self::OneWeek => "7",
            Self::OneDay => "1",
        }
    }

    /// Lifetime measured from the moment of insertion.
    pub fn duration(self) -> Duration {
        match self {
            Self::OneYear => Duration::days(365),
            Self::OneWeek => Duration::days(7),
            Self::OneDay => Duration::days(1),
        }
    }
}

impl FromStr for Expiry {
    type Err = SnippetValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "365" => Ok(Self::OneYear),
            "7" => Ok(Self::OneWeek),
            "1" => Ok(Self::OneDay),
            _ => Err(SnippetValidationError::UnknownExpiry),
        }
    }
}

/// A stored snippet.
///
/// Snippets are insert-only. Reaching `expires` is the only way one stops
/// being visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    id: SnippetId,
    title: String,
    content: String,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
}

impl Snippet {
    pub fn new(
        id: SnippetId,
        title: impl Into<String>,
        content: impl Into<String>,
        created: DateTime<Utc>,
        expires: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created,
            expires,
        }
    }

    pub fn id(&self) -> SnippetId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    /// Whether the snippet is still visible at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

/// Validated input for creating a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippet {
    title: String,
    content: String,
    expiry: Expiry,
}

impl NewSnippet {
    pub fn new(title: impl Into<String>, content: impl Into<String>, expiry: Expiry) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            expiry,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn expiry(&self) -> Expiry {
        self.expiry
    }
}
