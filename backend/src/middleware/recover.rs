//! Panic recovery.
//!
//! A panic anywhere below this layer is logged and answered with a plain
//! `500 Internal Server Error`. The connection is closed afterwards.
//!
//! The request is owned by the inner service while it runs, so the recovered
//! failure travels outward as a [`PanicError`] and the server renders it.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::task::{Context, Poll};

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, ContentType, HeaderValue};
use actix_web::http::{Method, StatusCode, Uri};
use actix_web::{Error, HttpResponse, ResponseError};
use futures_util::FutureExt as _;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use crate::inbound::http::error::reason_body;
use crate::middleware::security_headers::harden;

/// Converts panics in inner services into closing 500 responses.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use snippetbox::middleware::RecoverPanic;
///
/// let app = App::new().wrap(RecoverPanic);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RecoverPanic;

impl<S, B> Transform<S, ServiceRequest> for RecoverPanic
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RecoverPanicMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RecoverPanicMiddleware { service }))
    }
}

/// Service wrapper produced by [`RecoverPanic`].
pub struct RecoverPanicMiddleware<S> {
    service: S,
}

/// A panic caught while serving a request.
#[derive(Debug)]
pub struct PanicError {
    method: Method,
    uri: Uri,
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler panicked while serving {} {}", self.method, self.uri)
    }
}

impl ResponseError for PanicError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let mut response = HttpResponse::build(status)
            .force_close()
            .insert_header((header::CONNECTION, HeaderValue::from_static("close")))
            .insert_header(ContentType::plaintext())
            .body(reason_body(status));
        harden(response.headers_mut());
        response
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn recovered(method: Method, uri: Uri, payload: &(dyn Any + Send)) -> Error {
    error!(
        method = %method,
        uri = %uri,
        panic = panic_message(payload),
        "request handler panicked"
    );
    PanicError { method, uri }.into()
}

impl<S, B> Service<ServiceRequest> for RecoverPanicMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let fut = match panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => return Box::pin(ready(Err(recovered(method, uri, payload.as_ref())))),
        };
        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(recovered(method, uri, payload.as_ref())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::X_FRAME_OPTIONS;
    use actix_web::{App, test as actix_test, web};

    async fn boom() -> HttpResponse {
        panic!("handler exploded")
    }

    #[actix_web::test]
    async fn panics_become_closing_500s() {
        let app = actix_test::init_service(
            App::new().wrap(RecoverPanic).route("/boom", web::get().to(boom)),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/boom").to_request();
        let error = match actix_test::try_call_service(&app, req).await {
            Ok(_) => panic!("a panicking handler must not produce a response"),
            Err(error) => error,
        };
        let res = error.error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers().get(header::CONNECTION).and_then(|v| v.to_str().ok()),
            Some("close")
        );
        assert!(res.headers().contains_key(X_FRAME_OPTIONS));
        let body = actix_web::body::to_bytes(res.into_body())
            .await
            .expect("body collects");
        assert_eq!(body, "Internal Server Error");
    }

    #[actix_web::test]
    async fn healthy_requests_pass_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RecoverPanic)
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("fine") })),
        )
        .await;
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "fine");
    }

    #[test]
    fn panic_messages_are_extracted() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
    }
}
