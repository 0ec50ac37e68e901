//! CSRF protection bound to the session.
//!
//! Every request gets the session's token exposed as [`CsrfToken`]. Unsafe
//! methods must echo it back through the `csrf_token` form field or the
//! `X-CSRF-Token` header, otherwise the request fails with 400 before
//! reaching the handler.

use actix_web::body::BoxBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{FromRequest, HttpMessage, HttpRequest, body::MessageBody, web};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::Error;
use crate::inbound::http::forms::Form;
use crate::inbound::http::session::SessionContext;

/// Name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";
/// Header accepted in place of the form field.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// The session's CSRF token for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for CsrfToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CsrfToken>()
                .cloned()
                .ok_or_else(|| Error::internal("csrf middleware not installed")),
        )
    }
}

fn is_unsafe(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Length-independent comparison that inspects every byte.
fn tokens_match(expected: &str, submitted: &str) -> bool {
    let (expected, submitted) = (expected.as_bytes(), submitted.as_bytes());
    if expected.len() != submitted.len() {
        return false;
    }
    expected
        .iter()
        .zip(submitted)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

async fn check(req: &mut ServiceRequest) -> Result<(), Error> {
    let token = SessionContext::from_service_request(req).csrf_token()?;
    req.extensions_mut().insert(CsrfToken(token.clone()));
    if !is_unsafe(req.method()) {
        return Ok(());
    }

    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = req
        .extract::<web::Bytes>()
        .await
        .map_err(|err| Error::invalid_request(format!("failed to read request body: {err}")))?;
    let form = Form::from_urlencoded(&body)?;

    let submitted = header.unwrap_or_else(|| form.get(CSRF_FIELD).to_owned());
    if !tokens_match(&token, &submitted) {
        warn!(path = req.path(), "rejected request with a missing or stale CSRF token");
        return Err(Error::invalid_request("CSRF token mismatch"));
    }
    req.extensions_mut().insert(form);
    Ok(())
}

/// Middleware function verifying CSRF tokens on unsafe methods.
///
/// Must run inside the session middleware.
pub async fn verify_csrf(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    match check(&mut req).await {
        Ok(()) => Ok(next.call(req).await?.map_into_boxed_body()),
        Err(error) => Ok(req.error_response(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    async fn echo(form: Form, token: CsrfToken) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}|{}", form.get("title"), token.as_str().len()))
    }

    async fn token(token: CsrfToken) -> HttpResponse {
        HttpResponse::Ok().body(token.0)
    }

    macro_rules! csrf_app {
        () => {
            actix_test::init_service(
                App::new()
                    .wrap(from_fn(verify_csrf))
                    .wrap(crate::inbound::http::test_utils::test_session_middleware())
                    .route("/token", web::get().to(token))
                    .route("/echo", web::post().to(echo)),
            )
            .await
        };
    }

    #[rstest]
    #[case("abc", "abc", true)]
    #[case("abc", "abd", false)]
    #[case("abc", "ab", false)]
    #[case("abc", "", false)]
    fn compares_tokens_exactly(
        #[case] expected: &str,
        #[case] submitted: &str,
        #[case] matches: bool,
    ) {
        assert_eq!(tokens_match(expected, submitted), matches);
    }

    #[actix_web::test]
    async fn safe_methods_pass_and_expose_the_token() {
        let app = csrf_app!();
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/token").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body.len(), 43);
    }

    #[actix_web::test]
    async fn post_without_token_is_rejected() {
        let app = csrf_app!();
        let req = actix_test::TestRequest::post()
            .uri("/echo")
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("title=hi")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn post_with_matching_token_reaches_handler_with_parsed_form() {
        let app = csrf_app!();
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/token").to_request()).await;
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();
        let token = String::from_utf8(actix_test::read_body(res).await.to_vec()).expect("utf8");

        let req = actix_test::TestRequest::post()
            .uri("/echo")
            .cookie(cookie)
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload(format!("title=hi&csrf_token={token}"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, "hi|43");
    }

    #[actix_web::test]
    async fn header_token_is_accepted() {
        let app = csrf_app!();
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/token").to_request()).await;
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();
        let token = String::from_utf8(actix_test::read_body(res).await.to_vec()).expect("utf8");

        let req = actix_test::TestRequest::post()
            .uri("/echo")
            .cookie(cookie)
            .insert_header((CSRF_HEADER, token))
            .set_payload("title=via-header")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
