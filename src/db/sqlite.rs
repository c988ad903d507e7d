use crate::auth::password::hash_password;
use crate::auth::strategy::IdentityLookup;
use crate::db::models::{Book, BookCategory, BookDetail, BookListRow, BookView, Identity};
use crate::db::schema::SQLITE_INIT;
use crate::error::BookstoreError;
use crate::types::{CreateBook, CreateCategory, UpdateBook, UpdateCategory};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if needed) the database and apply the bundled schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool, BookstoreError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Initialize the schema by executing the bundled DDL.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), BookstoreError> {
    // sqlx::query runs one statement at a time
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

/// Credential store: user records keyed by unique username.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, BookstoreError> {
        let user = sqlx::query_as::<_, Identity>(
            "SELECT id, username, password_hash, email FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Hash `password` and insert a new user. Duplicate usernames are a conflict.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Identity, BookstoreError> {
        let password_hash = hash_password(password.to_string()).await?;
        sqlx::query_as::<_, Identity>(
            r#"INSERT INTO users (username, password_hash, email, created_at)
               VALUES (?, ?, ?, ?)
               RETURNING id, username, password_hash, email"#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(BookstoreError::from)
        .map_err(|e| {
            if e.is_unique_violation() {
                BookstoreError::Conflict(format!("username '{username}' is already taken"))
            } else {
                e
            }
        })
    }
}

impl IdentityLookup for UserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, BookstoreError> {
        UserStore::find_by_username(self, username).await
    }
}

/// Books and categories.
#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

const BOOK_COLUMNS: &str = "id, title, author, description, price, isbn, stock, cover_url, \
                            like_count, category_id, created_at, updated_at";

impl CatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_category(&self, input: &CreateCategory) -> Result<BookCategory, BookstoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_category(&mut *conn, input).await
    }

    pub async fn list_categories(&self) -> Result<Vec<BookCategory>, BookstoreError> {
        let rows = sqlx::query_as::<_, BookCategory>(
            "SELECT id, name, description, created_at, updated_at FROM book_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_category(&self, id: i64) -> Result<BookCategory, BookstoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_category(&mut *conn, id).await
    }

    pub async fn count_categories(&self) -> Result<i64, BookstoreError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM book_categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn update_category(
        &self,
        id: i64,
        input: &UpdateCategory,
    ) -> Result<BookCategory, BookstoreError> {
        let result = sqlx::query(
            r#"UPDATE book_categories SET
                name = COALESCE(?, name),
                description = CASE WHEN ? THEN ? ELSE description END,
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(&input.name)
        .bind(input.description.is_some())
        .bind(input.description.clone().flatten())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BookstoreError::not_found("Category", id));
        }
        self.get_category(id).await
    }

    /// Categories still referenced by books cannot be removed.
    pub async fn delete_category(&self, id: i64) -> Result<(), BookstoreError> {
        let still_has_books =
            || BookstoreError::Conflict(format!("Category with ID {id} still has books"));

        let mut tx = self.pool.begin().await?;
        let (books,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books WHERE category_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if books > 0 {
            return Err(still_has_books());
        }

        let result = sqlx::query("DELETE FROM book_categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(BookstoreError::from)
            .map_err(|e| if e.is_foreign_key_violation() { still_has_books() } else { e })?;
        if result.rows_affected() == 0 {
            return Err(BookstoreError::not_found("Category", id));
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn create_book(&self, input: &CreateBook) -> Result<Book, BookstoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_book(&mut *conn, input).await
    }

    /// Insert categories and then their books in a single transaction, so a
    /// failure leaves the catalog untouched. Each book is paired with an
    /// index into `categories`; its `category_id` is replaced by the id of
    /// that freshly created category.
    pub async fn insert_catalog(
        &self,
        categories: &[CreateCategory],
        books: Vec<(usize, CreateBook)>,
    ) -> Result<(Vec<BookCategory>, Vec<Book>), BookstoreError> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(categories.len());
        for input in categories {
            created.push(insert_category(&mut *tx, input).await?);
        }

        let mut inserted = Vec::with_capacity(books.len());
        for (index, mut input) in books {
            let category = created.get(index).ok_or_else(|| {
                BookstoreError::validation(format!("no category #{index} for '{}'", input.title))
            })?;
            input.category_id = category.id;
            inserted.push(insert_book(&mut *tx, &input).await?);
        }

        tx.commit().await?;
        Ok((created, inserted))
    }

    /// All books ordered by id, each with its category's id and name.
    pub async fn list_books(&self) -> Result<Vec<BookView>, BookstoreError> {
        let rows = sqlx::query_as::<_, BookListRow>(
            r#"SELECT b.id, b.title, b.author, b.description, b.price, b.isbn, b.stock,
                      b.cover_url, b.like_count, b.category_id, b.created_at, b.updated_at,
                      c.name AS category_name
               FROM books b
               JOIN book_categories c ON c.id = b.category_id
               ORDER BY b.id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookView::from).collect())
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, BookstoreError> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BookstoreError::not_found("Book", id))
    }

    pub async fn get_book_detail(&self, id: i64) -> Result<BookDetail, BookstoreError> {
        let book = self.get_book(id).await?;
        let category = self.get_category(book.category_id).await?;
        Ok(BookDetail { book, category })
    }

    pub async fn update_book(&self, id: i64, input: &UpdateBook) -> Result<BookDetail, BookstoreError> {
        if let Some(category_id) = input.category_id {
            self.get_category(category_id).await?;
        }
        let result = sqlx::query(
            r#"UPDATE books SET
                title = COALESCE(?, title),
                author = COALESCE(?, author),
                description = CASE WHEN ? THEN ? ELSE description END,
                price = COALESCE(?, price),
                isbn = CASE WHEN ? THEN ? ELSE isbn END,
                stock = COALESCE(?, stock),
                cover_url = CASE WHEN ? THEN ? ELSE cover_url END,
                like_count = COALESCE(?, like_count),
                category_id = COALESCE(?, category_id),
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.description.is_some())
        .bind(input.description.clone().flatten())
        .bind(input.price)
        .bind(input.isbn.is_some())
        .bind(input.isbn.clone().flatten())
        .bind(input.stock)
        .bind(input.cover_url.is_some())
        .bind(input.cover_url.clone().flatten())
        .bind(input.like_count)
        .bind(input.category_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BookstoreError::not_found("Book", id));
        }
        self.get_book_detail(id).await
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), BookstoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BookstoreError::not_found("Book", id));
        }
        Ok(())
    }

    /// Single-statement increment, so concurrent likes are never lost.
    pub async fn increment_like(&self, id: i64) -> Result<BookDetail, BookstoreError> {
        let result = sqlx::query(
            "UPDATE books SET like_count = like_count + 1, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BookstoreError::not_found("Book", id));
        }
        self.get_book_detail(id).await
    }
}

async fn fetch_category(conn: &mut SqliteConnection, id: i64) -> Result<BookCategory, BookstoreError> {
    sqlx::query_as::<_, BookCategory>(
        "SELECT id, name, description, created_at, updated_at FROM book_categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| BookstoreError::not_found("Category", id))
}

async fn insert_category(
    conn: &mut SqliteConnection,
    input: &CreateCategory,
) -> Result<BookCategory, BookstoreError> {
    let now = Utc::now();
    let category = sqlx::query_as::<_, BookCategory>(
        r#"INSERT INTO book_categories (name, description, created_at, updated_at)
           VALUES (?, ?, ?, ?)
           RETURNING id, name, description, created_at, updated_at"#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(category)
}

async fn insert_book(conn: &mut SqliteConnection, input: &CreateBook) -> Result<Book, BookstoreError> {
    fetch_category(conn, input.category_id).await?;
    let now = Utc::now();
    let book = sqlx::query_as::<_, Book>(&format!(
        r#"INSERT INTO books (
            title, author, description, price, isbn, stock,
            cover_url, like_count, category_id, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {BOOK_COLUMNS}"#
    ))
    .bind(&input.title)
    .bind(&input.author)
    .bind(&input.description)
    .bind(input.price)
    .bind(&input.isbn)
    .bind(input.stock.unwrap_or(0))
    .bind(&input.cover_url)
    .bind(input.like_count.unwrap_or(0))
    .bind(input.category_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(book)
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    // one connection: every in-memory connection is a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_opts)
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
