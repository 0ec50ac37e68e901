//! Authentication context for the current request.
//!
//! [`resolve_user`] reads the user id from the session, loads the user and
//! stores an [`AuthenticatedUser`] in the request extensions. Handlers read it
//! with [`CurrentUser`]; [`require_authenticated_user`] gates routes on it.

use actix_web::body::BoxBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, body::MessageBody, web};
use futures_util::future::{Ready, ready};
use serde::Serialize;
use tracing::info;

use crate::domain::{Error, ErrorCode, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

pub(crate) const LOGIN_REQUIRED_FLASH: &str = "Please log in before continuing.";

/// User resolved for this request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub name: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_owned(),
        }
    }
}

/// Extractor for the optional authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl CurrentUser {
    pub fn of(req: &HttpRequest) -> Self {
        Self(req.extensions().get::<AuthenticatedUser>().cloned())
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::of(req)))
    }
}

async fn lookup(req: &ServiceRequest) -> Result<Option<AuthenticatedUser>, Error> {
    let session = SessionContext::from_service_request(req);
    let Some(user_id) = session.user_id()? else {
        return Ok(None);
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;

    match state.users.get(user_id).await {
        Ok(user) => Ok(Some(AuthenticatedUser::from(&user))),
        Err(error) if error.code() == ErrorCode::NotFound => {
            info!(user_id = %user_id, "session refers to a missing user; clearing it");
            session.remove_user();
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Middleware function resolving the authenticated user. Must run inside
/// the session middleware.
pub async fn resolve_user(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    match lookup(&req).await {
        Ok(user) => {
            if let Some(user) = user {
                req.extensions_mut().insert(user);
            }
            Ok(next.call(req).await?.map_into_boxed_body())
        }
        Err(error) => Ok(req.error_response(error)),
    }
}

/// Route guard redirecting anonymous visitors to the login page.
///
/// Authenticated responses are marked `Cache-Control: no-store`.
pub async fn require_authenticated_user(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    if req.extensions().get::<AuthenticatedUser>().is_none() {
        let session = SessionContext::from_service_request(&req);
        if let Err(error) = session.put_flash(LOGIN_REQUIRED_FLASH) {
            return Ok(req.error_response(error));
        }
        let response = HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/user/login"))
            .finish();
        return Ok(req.into_response(response));
    }

    let mut res = next.call(req).await?.map_into_boxed_body();
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(res)
}
