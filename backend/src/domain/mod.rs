//! Domain primitives, services and ports.
//!
//! Purpose: hold the snippet and account model independent of HTTP and
//! storage. Inbound adapters call services through the driving ports in
//! [`ports`]; services reach storage through the driven ports.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `Snippet`, `SnippetId`, `Expiry`, `NewSnippet`: snippet model.
//! - `User`, `UserId`, `NewUser`, `LoginCredentials`: account model.
//! - `SnippetService`, `AccountService`: use-case implementations.
//! - `TraceId`: request correlation identifier.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod snippet;
pub mod snippet_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError, StoredCredentials};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::snippet::{Expiry, NewSnippet, Snippet, SnippetId, SnippetValidationError};
pub use self::snippet_service::SnippetService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUser, User, UserId, UserValidationError};
