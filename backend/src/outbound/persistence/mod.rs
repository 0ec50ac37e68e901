//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin: they translate between Diesel rows and domain
//! types and map every database failure onto the port's error enum. Rows
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module.

mod diesel_basic_error_mapping;
mod diesel_snippet_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_snippet_repository::DieselSnippetRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
