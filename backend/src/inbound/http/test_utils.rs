//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::templates::TemplateCache;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over `ports` and the embedded templates.
pub fn test_state(ports: HttpStatePorts) -> web::Data<HttpState> {
    let templates = TemplateCache::load().expect("embedded templates parse");
    web::Data::new(HttpState::new(ports, Arc::new(templates)))
}
