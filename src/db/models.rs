use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user as seen by the authentication core.
/// The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub price: f64,
    pub isbn: Option<String>,
    pub stock: i64,
    pub cover_url: Option<String>,
    pub like_count: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
}

/// List entry: the book plus the `{id, name}` of its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub category: CategorySummary,
}

/// Single-book response carrying the full category row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub category: BookCategory,
}

/// Row shape of the books/categories join used by listings.
#[derive(Debug, FromRow)]
pub(crate) struct BookListRow {
    #[sqlx(flatten)]
    pub book: Book,
    pub category_name: String,
}

impl From<BookListRow> for BookView {
    fn from(row: BookListRow) -> Self {
        let category = CategorySummary {
            id: row.book.category_id,
            name: row.category_name,
        };
        Self {
            book: row.book,
            category,
        }
    }
}
