//! Request-bound renderer used by page handlers.

use std::sync::Arc;

use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, Snippet};
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::csrf::CsrfToken;
use crate::inbound::http::forms::Form;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates::{Page, TemplateCache, TemplateData};

/// Collects the shared page data for the current request.
///
/// The flash message is only consumed once a page has rendered, so a handler
/// that redirects or fails leaves it in place.
pub struct Renderer {
    templates: Arc<TemplateCache>,
    session: SessionContext,
    data: TemplateData,
}

impl Renderer {
    #[must_use]
    pub fn with_form(mut self, form: Form) -> Self {
        self.data.form = Some(form);
        self
    }

    #[must_use]
    pub fn with_snippet(mut self, snippet: Snippet) -> Self {
        self.data.snippet = Some(snippet);
        self
    }

    #[must_use]
    pub fn with_snippets(mut self, snippets: Vec<Snippet>) -> Self {
        self.data.snippets = snippets;
        self
    }

    /// Render `page` as a `200 OK` HTML response.
    pub fn render(mut self, page: Page) -> Result<HttpResponse, Error> {
        self.data.flash = self.session.flash()?;
        let body = self.templates.render(page, &self.data)?;
        if self.data.flash.is_some() {
            self.session.clear_flash();
        }
        Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body))
    }
}

fn build(req: &HttpRequest) -> Result<Renderer, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;
    let csrf_token = req
        .extensions()
        .get::<CsrfToken>()
        .map(|token| token.0.clone())
        .unwrap_or_default();
    let CurrentUser(user) = CurrentUser::of(req);
    let session = SessionContext::new(actix_session::SessionExt::get_session(req));

    Ok(Renderer {
        templates: Arc::clone(&state.templates),
        session,
        data: TemplateData::new(csrf_token, None, user),
    })
}

impl FromRequest for Renderer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(build(req))
    }
}
