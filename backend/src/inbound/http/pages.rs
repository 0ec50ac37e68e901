//! Static and listing pages plus the shared redirect helper.
//!
//! ```text
//! GET /       latest snippets
//! GET /about  static page
//! GET /ping   liveness check
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get};

use crate::domain::Error;
use crate::inbound::http::HttpResult;
use crate::inbound::http::render::Renderer;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates::Page;

/// `303 See Other` to `location`.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/")]
pub async fn home(
    state: actix_web::web::Data<HttpState>,
    renderer: Renderer,
) -> HttpResult<HttpResponse> {
    let snippets = state.snippets_query.latest().await?;
    renderer.with_snippets(snippets).render(Page::Home)
}

#[get("/about")]
pub async fn about(renderer: Renderer) -> HttpResult<HttpResponse> {
    renderer.render(Page::About)
}

#[get("/ping")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

/// Fallback for unknown paths and unsupported methods.
pub async fn not_found() -> HttpResult<HttpResponse> {
    Err(Error::not_found("no route matches the request"))
}
