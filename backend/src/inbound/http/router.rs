//! Route table.

use actix_web::web;

use crate::inbound::http::{pages, snippets, users};

/// Register every handler. `/snippet/create` precedes `/snippet/{id}` so the
/// literal segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::home)
        .service(pages::about)
        .service(pages::ping)
        .service(snippets::create_snippet_form)
        .service(snippets::create_snippet)
        .service(snippets::show_snippet)
        .service(users::signup_form)
        .service(users::signup)
        .service(users::login_form)
        .service(users::login)
        .service(users::logout);
}
