//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the actix session so handlers and middleware only deal with the
//! authenticated user id, one-shot flash messages and the CSRF token.

use actix_session::{Session, SessionExt};
use actix_web::dev::ServiceRequest;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures_util::future::LocalBoxFuture;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "authenticated_user_id";
pub(crate) const FLASH_KEY: &str = "flash";
pub(crate) const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Bytes of entropy in a CSRF token before encoding.
const CSRF_TOKEN_BYTES: usize = 32;

fn session_error(action: &str, error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to {action} session: {error}"))
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Session attached to a request travelling through middleware.
    pub fn from_service_request(req: &ServiceRequest) -> Self {
        Self(req.get_session())
    }

    /// Record the authenticated user's id.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| session_error("persist", error))
    }

    /// Current user id, if one is stored. Tampered or non-positive values
    /// are treated as absent.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<i64>(USER_ID_KEY)
            .map_err(|error| session_error("read", error))?;
        match raw.map(UserId::new) {
            Some(Ok(id)) => Ok(Some(id)),
            Some(Err(error)) => {
                tracing::warn!("invalid user id in session cookie: {error}");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn remove_user(&self) {
        self.0.remove(USER_ID_KEY);
    }

    /// Store a message shown once on the next rendered page.
    pub fn put_flash(&self, message: &str) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, message)
            .map_err(|error| session_error("write flash to", error))
    }

    /// Pending flash message, left in place. A malformed value is dropped.
    pub fn flash(&self) -> Result<Option<String>, Error> {
        match self.0.get::<String>(FLASH_KEY) {
            Ok(message) => Ok(message),
            Err(error) => {
                tracing::warn!(%error, "discarding malformed flash message");
                self.clear_flash();
                Ok(None)
            }
        }
    }

    pub fn clear_flash(&self) {
        self.0.remove(FLASH_KEY);
    }

    /// Take the pending flash message. The session is only touched when a
    /// message was stored.
    pub fn pop_flash(&self) -> Result<Option<String>, Error> {
        let message = self.flash()?;
        if message.is_some() {
            self.clear_flash();
        }
        Ok(message)
    }

    /// CSRF token bound to this session, created on first use.
    pub fn csrf_token(&self) -> Result<String, Error> {
        if let Some(token) = self
            .0
            .get::<String>(CSRF_TOKEN_KEY)
            .map_err(|error| session_error("read", error))?
        {
            return Ok(token);
        }
        let mut bytes = [0_u8; CSRF_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        self.0
            .insert(CSRF_TOKEN_KEY, &token)
            .map_err(|error| session_error("persist", error))?;
        Ok(token)
    }

    /// Issue a fresh session cookie while keeping the session state.
    pub fn renew(&self) {
        self.0.renew();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
