//! Server-side page rendering with Tera.
//!
//! Templates are embedded at compile time and parsed once into a
//! [`TemplateCache`]. Startup fails if any [`Page`] lacks a template. Pages
//! render into a `String` before a response is built, so a template error
//! never yields a half-written page.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tera::{Context, Tera, Value, try_get_value};
use tracing::error;

use crate::domain::{Error, Snippet};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::forms::Form;

macro_rules! embedded_template {
    ($name:literal) => {
        (
            $name,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $name)),
        )
    };
}

/// Every template shipped with the binary.
const EMBEDDED_TEMPLATES: [(&str, &str); 9] = [
    embedded_template!("base.layout.html"),
    embedded_template!("nav.partial.html"),
    embedded_template!("footer.partial.html"),
    embedded_template!("home.page.html"),
    embedded_template!("about.page.html"),
    embedded_template!("show.page.html"),
    embedded_template!("create.page.html"),
    embedded_template!("signup.page.html"),
    embedded_template!("login.page.html"),
];

/// Renderable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    ShowSnippet,
    CreateSnippet,
    Signup,
    Login,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::About,
        Page::ShowSnippet,
        Page::CreateSnippet,
        Page::Signup,
        Page::Login,
    ];

    pub fn template_name(self) -> &'static str {
        match self {
            Page::Home => "home.page.html",
            Page::About => "about.page.html",
            Page::ShowSnippet => "show.page.html",
            Page::CreateSnippet => "create.page.html",
            Page::Signup => "signup.page.html",
            Page::Login => "login.page.html",
        }
    }
}

/// Errors raised while building the template cache.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to parse templates: {0}")]
    Parse(#[from] tera::Error),
    #[error("no template registered for page {page:?} ({name})")]
    Missing { page: Page, name: &'static str },
}

/// Formats an RFC 3339 timestamp as `02 Jan 2006 at 15:04` in UTC.
fn human_date(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = try_get_value!("human_date", "value", String, value);
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .map_err(|err| tera::Error::msg(format!("human_date expects an RFC 3339 timestamp: {err}")))?;
    Ok(Value::String(
        parsed
            .with_timezone(&Utc)
            .format("%d %b %Y at %H:%M")
            .to_string(),
    ))
}

/// Parsed, immutable template set.
pub struct TemplateCache {
    tera: Tera,
}

impl TemplateCache {
    /// Parse the embedded templates.
    pub fn load() -> Result<Self, TemplateError> {
        Self::from_sources(EMBEDDED_TEMPLATES)
    }

    /// Parse an explicit template set and check every page is present.
    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut tera = Tera::default();
        tera.register_filter("human_date", human_date);
        tera.add_raw_templates(sources)?;

        for page in Page::ALL {
            let name = page.template_name();
            if !tera.get_template_names().any(|known| known == name) {
                return Err(TemplateError::Missing { page, name });
            }
        }
        Ok(Self { tera })
    }

    /// Render `page` with `data` into a complete document.
    pub fn render(&self, page: Page, data: &TemplateData) -> Result<String, Error> {
        let context = Context::from_serialize(data)
            .map_err(|err| Error::internal(format!("failed to build template context: {err}")))?;
        self.tera
            .render(page.template_name(), &context)
            .map_err(|err| {
                error!(page = page.template_name(), error = ?err, "template render failed");
                Error::internal(format!("failed to render {}: {err}", page.template_name()))
            })
    }
}

/// Values shared by every page plus the page payload.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub authenticated_user: Option<AuthenticatedUser>,
    pub csrf_token: String,
    pub form: Option<Form>,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
}

impl TemplateData {
    pub fn new(
        csrf_token: impl Into<String>,
        flash: Option<String>,
        authenticated_user: Option<AuthenticatedUser>,
    ) -> Self {
        Self {
            current_year: Utc::now().year(),
            flash,
            authenticated_user,
            csrf_token: csrf_token.into(),
            form: None,
            snippet: None,
            snippets: Vec::new(),
        }
    }
}
