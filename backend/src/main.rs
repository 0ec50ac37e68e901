//! Snippetbox entry-point: loads settings, prepares storage and serves HTTP.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig as _;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use snippetbox::domain::{AccountService, SnippetService};
use snippetbox::inbound::http::state::{HttpState, HttpStatePorts};
use snippetbox::inbound::http::templates::TemplateCache;
use snippetbox::outbound::BcryptPasswordHasher;
use snippetbox::outbound::persistence::{
    DbPool, DieselSnippetRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use snippetbox::server::{AppSettings, BuildMode, ServerConfig, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

fn build_state(pool: DbPool) -> Result<web::Data<HttpState>> {
    let templates = TemplateCache::load().wrap_err("template set is invalid")?;

    let snippets = Arc::new(SnippetService::new(Arc::new(DieselSnippetRepository::new(
        pool.clone(),
    ))));
    let accounts = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(BcryptPasswordHasher::default()),
    ));

    let ports = HttpStatePorts {
        snippets: snippets.clone(),
        snippets_query: snippets,
        signup: accounts.clone(),
        login: accounts.clone(),
        users: accounts,
    };
    Ok(web::Data::new(HttpState::new(ports, Arc::new(templates))))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = ServerConfig::from_settings(&settings, BuildMode::from_debug_assertions())?;

    let pool = DbPool::new(PoolConfig::new(config.database_url()))
        .await
        .wrap_err("failed to connect to the database")?;
    run_pending_migrations(config.database_url())
        .await
        .wrap_err("failed to apply migrations")?;

    let http_state = build_state(pool)?;
    create_server(http_state, config)?
        .await
        .wrap_err("server terminated with an error")
}
