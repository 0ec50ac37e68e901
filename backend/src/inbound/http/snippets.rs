//! Snippet handlers.
//!
//! ```text
//! GET  /snippet/create   form (login required)
//! POST /snippet/create   create (login required)
//! GET  /snippet/{id}     show
//! ```

use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, post, web};

use crate::domain::{Error, Expiry, NewSnippet, SnippetId};
use crate::inbound::http::HttpResult;
use crate::inbound::http::auth::require_authenticated_user;
use crate::inbound::http::forms::Form;
use crate::inbound::http::pages::see_other;
use crate::inbound::http::render::Renderer;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates::Page;

pub(crate) const SNIPPET_CREATED_FLASH: &str = "Snippet successfully created!";
const TITLE_MAX_CHARS: usize = 100;

#[get("/snippet/create", wrap = "from_fn(require_authenticated_user)")]
pub async fn create_snippet_form(renderer: Renderer) -> HttpResult<HttpResponse> {
    renderer.with_form(Form::new()).render(Page::CreateSnippet)
}

/// Apply the create-snippet rules, returning the command when valid.
fn validate_snippet(form: &mut Form) -> Option<NewSnippet> {
    form.required(&["title", "content", "expires"]);
    form.max_length("title", TITLE_MAX_CHARS);
    form.permitted_values("expires", &Expiry::PERMITTED);
    if !form.valid() {
        return None;
    }
    let expiry = form.get("expires").parse::<Expiry>().ok()?;
    Some(NewSnippet::new(form.get("title"), form.get("content"), expiry))
}

#[post("/snippet/create", wrap = "from_fn(require_authenticated_user)")]
pub async fn create_snippet(
    state: web::Data<HttpState>,
    session: SessionContext,
    renderer: Renderer,
    mut form: Form,
) -> HttpResult<HttpResponse> {
    let Some(snippet) = validate_snippet(&mut form) else {
        return renderer.with_form(form).render(Page::CreateSnippet);
    };

    let id = state.snippets.create(&snippet).await?;
    session.put_flash(SNIPPET_CREATED_FLASH)?;
    Ok(see_other(&format!("/snippet/{id}")))
}

#[get("/snippet/{id}")]
pub async fn show_snippet(
    state: web::Data<HttpState>,
    renderer: Renderer,
    path: web::Path<String>,
) -> HttpResult<HttpResponse> {
    let id = SnippetId::parse(&path.into_inner())
        .map_err(|err| Error::not_found(format!("invalid snippet id: {err}")))?;
    let snippet = state.snippets_query.get(id).await?;
    renderer.with_snippet(snippet).render(Page::ShowSnippet)
}
