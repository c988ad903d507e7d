//! SQL DDL for initializing the bookstore database.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `users.username` UNIQUE (creates an index implicitly)
/// - `books.category_id` referencing `book_categories(id)`; deleting a
///   category that still has books is rejected
/// - timestamps stored as RFC3339 text
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS book_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    description TEXT NULL,
    price REAL NOT NULL,
    isbn TEXT NULL,
    stock INTEGER NOT NULL DEFAULT 0,
    cover_url TEXT NULL,
    like_count INTEGER NOT NULL DEFAULT 0,
    category_id INTEGER NOT NULL REFERENCES book_categories(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_category_id ON books(category_id);
"#;
