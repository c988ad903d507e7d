use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use crate::db::{Book, BookDetail, BookView};
use crate::error::BookstoreError;
use crate::router::BookstoreState;
use crate::types::{CreateBook, UpdateBook};

pub async fn list_books(
    State(state): State<BookstoreState>,
) -> Result<Json<Vec<BookView>>, BookstoreError> {
    Ok(Json(state.catalog.list_books().await?))
}

pub async fn get_book(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
) -> Result<Json<BookDetail>, BookstoreError> {
    Ok(Json(state.catalog.get_book_detail(id).await?))
}

pub async fn create_book(
    State(state): State<BookstoreState>,
    body: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), BookstoreError> {
    let Json(input) = body?;
    input.validate()?;
    let book = state.catalog.create_book(&input).await?;
    info!(book_id = book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update_book(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<BookDetail>, BookstoreError> {
    let Json(input) = body?;
    input.validate()?;
    Ok(Json(state.catalog.update_book(id, &input).await?))
}

pub async fn delete_book(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, BookstoreError> {
    state.catalog.delete_book(id).await?;
    info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /books/{id}/like
pub async fn like_book(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
) -> Result<Json<BookDetail>, BookstoreError> {
    Ok(Json(state.catalog.increment_like(id).await?))
}
