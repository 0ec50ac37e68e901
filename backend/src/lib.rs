//! Snippetbox: a small paste-bin style web application.
//!
//! - [`domain`]: snippets, accounts, services and ports.
//! - [`inbound`]: HTTP handlers, forms, sessions and rendering.
//! - [`outbound`]: PostgreSQL repositories and password hashing.
//! - [`middleware`]: cross-cutting request layers.
//! - [`server`]: settings and application wiring.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
