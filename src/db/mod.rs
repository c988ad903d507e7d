//! Database module: models, schema and stores for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `UserStore` and `CatalogStore` over a shared pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Book, BookCategory, BookDetail, BookView, CategorySummary, Identity};
pub use schema::SQLITE_INIT;
pub use sqlite::{CatalogStore, SqlitePool, UserStore, connect};
