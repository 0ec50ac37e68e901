//! Form values and the validation engine used by POST handlers.
//!
//! A [`Form`] holds the submitted values and accumulates error messages per
//! field. Checks never touch the values, and errors accumulate across calls,
//! so a handler runs every rule and then asks [`Form::valid`] once.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use regex::Regex;
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::domain::Error;

/// Field key reserved for form-level errors.
const GENERIC_FIELD: &str = "";

static EMAIL_RX: OnceLock<Regex> = OnceLock::new();

/// Email pattern used by the signup form.
#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is compiled by the form tests"
)]
pub fn email_regex() -> &'static Regex {
    EMAIL_RX.get_or_init(|| {
        let pattern = concat!(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
            r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
            r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        );
        Regex::new(pattern).expect("email pattern compiles")
    })
}

/// Raised when a request body cannot be read as a URL-encoded form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormParseError {
    #[error("form body is not valid UTF-8")]
    NotUtf8,
    #[error("malformed percent escape at byte {offset}")]
    BadEscape { offset: usize },
}

impl From<FormParseError> for Error {
    fn from(err: FormParseError) -> Self {
        Error::invalid_request(err.to_string())
    }
}

fn check_escapes(body: &[u8]) -> Result<(), FormParseError> {
    for (offset, _) in body.iter().enumerate().filter(|(_, byte)| **byte == b'%') {
        let digits = body.get(offset + 1..offset + 3);
        if !digits.is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit)) {
            return Err(FormParseError::BadEscape { offset });
        }
    }
    Ok(())
}

/// Submitted form values plus accumulated validation errors.
///
/// # Examples
/// ```
/// use snippetbox::inbound::http::forms::Form;
///
/// let mut form = Form::from_pairs([("title", "  "), ("expires", "30")]);
/// form.required(&["title", "expires"]);
/// form.permitted_values("expires", &["365", "7", "1"]);
/// assert!(!form.valid());
/// assert_eq!(form.errors("title"), ["This field cannot be blank"]);
/// assert_eq!(form.errors("expires"), ["This field is invalid"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    values: BTreeMap<String, Vec<String>>,
    errors: BTreeMap<String, Vec<String>>,
}

impl Form {
    /// Blank form for GET pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form from decoded name/value pairs. Repeated names keep every
    /// value in submission order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self {
            values,
            errors: BTreeMap::new(),
        }
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Every `%` must start a two-digit hex escape.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, FormParseError> {
        std::str::from_utf8(body).map_err(|_| FormParseError::NotUtf8)?;
        check_escapes(body)?;
        Ok(Self::from_pairs(url::form_urlencoded::parse(body)))
    }

    /// First submitted value for `field`, or `""`.
    pub fn get(&self, field: &str) -> &str {
        self.values
            .get(field)
            .and_then(|values| values.first())
            .map_or("", String::as_str)
    }

    /// True when no errors have been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Record an error that belongs to the form as a whole.
    pub fn add_generic_error(&mut self, message: impl Into<String>) {
        self.add_error(GENERIC_FIELD, message);
    }

    pub fn errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn generic_errors(&self) -> &[String] {
        self.errors(GENERIC_FIELD)
    }

    /// Flag each field whose value is blank once trimmed.
    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.add_error(field, "This field cannot be blank");
            }
        }
    }

    /// Flag `field` when it holds more than `max` characters.
    pub fn max_length(&mut self, field: &str, max: usize) {
        let value = self.get(field);
        if !value.is_empty() && value.chars().count() > max {
            self.add_error(
                field,
                format!("This field is too long (maximum is {max} characters)"),
            );
        }
    }

    /// Flag `field` when it holds fewer than `min` characters.
    pub fn min_length(&mut self, field: &str, min: usize) {
        let value = self.get(field);
        if !value.is_empty() && value.chars().count() < min {
            self.add_error(
                field,
                format!("This field is too short (minimum is {min} characters)"),
            );
        }
    }

    /// Flag `field` unless it exactly matches one of `options`.
    pub fn permitted_values(&mut self, field: &str, options: &[&str]) {
        let value = self.get(field);
        if !value.is_empty() && !options.contains(&value) {
            self.add_error(field, "This field is invalid");
        }
    }

    /// Flag `field` when it does not match `pattern`.
    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) {
        let value = self.get(field);
        if !value.is_empty() && !pattern.is_match(value) {
            self.add_error(field, "This field is invalid");
        }
    }
}

impl Serialize for Form {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values: BTreeMap<&str, &str> = self
            .values
            .iter()
            .filter_map(|(key, values)| {
                values
                    .first()
                    .map(|value| (key.as_str(), value.as_str()))
            })
            .collect();
        let errors: BTreeMap<&str, &[String]> = self
            .errors
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
            .collect();

        let mut state = serializer.serialize_struct("Form", 3)?;
        state.serialize_field("values", &values)?;
        state.serialize_field("errors", &errors)?;
        state.serialize_field("generic_errors", self.generic_errors())?;
        state.end()
    }
}

/// Extracts the POST body as a [`Form`].
///
/// Reuses the form the CSRF layer already parsed when one is present in the
/// request extensions, since that layer consumed the payload.
impl FromRequest for Form {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if let Some(form) = req.extensions_mut().remove::<Form>() {
            return Box::pin(async move { Ok(form) });
        }
        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let body = body
                .await
                .map_err(|err| Error::invalid_request(format!("failed to read form body: {err}")))?;
            Ok(Form::from_urlencoded(&body)?)
        })
    }
}
