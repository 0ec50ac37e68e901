//! Server construction and middleware wiring.

mod config;
mod settings;
mod tls;

pub use config::{BuildMode, ServerConfig, SettingsError, Timeouts, TlsPaths, parse_bind_addr};
pub use settings::{AppSettings, DEFAULT_ADDR};
pub use tls::{TlsError, load_rustls_config};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::inbound::http::auth::resolve_user;
use crate::inbound::http::csrf::verify_csrf;
use crate::inbound::http::pages::not_found;
use crate::inbound::http::router;
use crate::inbound::http::state::HttpState;
use crate::middleware::{RecoverPanic, Trace, security_headers};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";
/// Session lifetime.
pub const SESSION_TTL_HOURS: i64 = 12;

/// Inputs needed to build one application instance.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
}

/// Assemble the application with its full middleware chain.
///
/// Layers run outermost first: panic recovery, security headers, request
/// logging, session, CSRF verification, user resolution.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Strict)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS)),
        )
        .build();

    // `wrap` registers inside-out: the last call is the outermost layer.
    App::new()
        .app_data(http_state)
        .configure(router::configure)
        .default_service(web::to(not_found))
        .wrap(from_fn(resolve_user))
        .wrap(from_fn(verify_csrf))
        .wrap(session)
        .wrap(Trace)
        .wrap(from_fn(security_headers))
        .wrap(RecoverPanic)
}

/// Bind the listener (HTTPS when TLS paths are configured) and start serving.
///
/// # Errors
/// Propagates [`std::io::Error`] when TLS loading, binding or start-up fails.
pub fn create_server(http_state: web::Data<HttpState>, config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        key,
        cookie_secure,
        tls,
        timeouts,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
        })
    })
    .keep_alive(timeouts.idle)
    .client_request_timeout(timeouts.read)
    .client_disconnect_timeout(timeouts.write);

    let server = match tls {
        Some(paths) => {
            let rustls_config =
                load_rustls_config(&paths).map_err(|err| std::io::Error::other(err.to_string()))?;
            info!(addr = %bind_addr, "starting HTTPS server");
            server.bind_rustls_0_23(bind_addr, rustls_config)?
        }
        None => {
            info!(addr = %bind_addr, "starting HTTP server");
            server.bind(bind_addr)?
        }
    };
    Ok(server.run())
}
