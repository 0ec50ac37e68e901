//! Response hardening headers.

use std::fmt;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{
    HeaderMap, HeaderName, HeaderValue, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use actix_web::middleware::Next;
use actix_web::{HttpResponse, ResponseError};

const HEADERS: [(HeaderName, &str); 2] = [
    (X_XSS_PROTECTION, "1; mode=block"),
    (X_FRAME_OPTIONS, "deny"),
];

/// Insert the hardening headers into `headers`.
pub(crate) fn harden(headers: &mut HeaderMap) {
    for (name, value) in HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Inner-layer error that renders with the hardening headers attached.
#[derive(Debug)]
struct Hardened(actix_web::Error);

impl fmt::Display for Hardened {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl ResponseError for Hardened {
    fn status_code(&self) -> StatusCode {
        self.0.as_response_error().status_code()
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = self.0.error_response();
        harden(response.headers_mut());
        response
    }
}

/// Middleware function adding `X-XSS-Protection` and `X-Frame-Options` to
/// every response, including errors raised by inner layers.
pub async fn security_headers(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let mut res = next
        .call(req)
        .await
        .map_err(|error| actix_web::Error::from(Hardened(error)))?;
    harden(res.headers_mut());
    Ok(res)
}
