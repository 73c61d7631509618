//! Database layer
//!
//! SQLite-backed persistence via sqlx. The deployment target is a single-file
//! SQLite database, so there is no multi-driver abstraction here; repositories
//! operate directly on a shared [`sqlx::SqlitePool`].

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};
