//! HTTP inbound adapter serving the HTML pages.

pub mod auth;
pub mod csrf;
pub mod error;
pub mod forms;
pub mod pages;
pub mod render;
pub mod router;
pub mod session;
pub mod snippets;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::HttpResult;
