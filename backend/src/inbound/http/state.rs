//! Shared HTTP adapter state.
//!
//! Handlers and middleware receive this via `web::Data` so they depend only
//! on domain ports and the template cache.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureAccounts, FixtureSnippets, LoginService, SignupService, SnippetsCommand,
    SnippetsQuery, UsersQuery,
};
use crate::inbound::http::templates::TemplateCache;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub snippets: Arc<dyn SnippetsCommand>,
    pub snippets_query: Arc<dyn SnippetsQuery>,
    pub signup: Arc<dyn SignupService>,
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
}

impl HttpStatePorts {
    /// Ports backed by the in-memory fixtures.
    pub fn fixtures() -> Self {
        Self {
            snippets: Arc::new(FixtureSnippets),
            snippets_query: Arc::new(FixtureSnippets),
            signup: Arc::new(FixtureAccounts),
            login: Arc::new(FixtureAccounts),
            users: Arc::new(FixtureAccounts),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub snippets: Arc<dyn SnippetsCommand>,
    pub snippets_query: Arc<dyn SnippetsQuery>,
    pub signup: Arc<dyn SignupService>,
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub templates: Arc<TemplateCache>,
}

impl HttpState {
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use snippetbox::inbound::http::state::{HttpState, HttpStatePorts};
    /// use snippetbox::inbound::http::templates::TemplateCache;
    ///
    /// let templates = TemplateCache::load().expect("embedded templates are valid");
    /// let state = HttpState::new(HttpStatePorts::fixtures(), Arc::new(templates));
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, templates: Arc<TemplateCache>) -> Self {
        let HttpStatePorts {
            snippets,
            snippets_query,
            signup,
            login,
            users,
        } = ports;
        Self {
            snippets,
            snippets_query,
            signup,
            login,
            users,
            templates,
        }
    }
}
