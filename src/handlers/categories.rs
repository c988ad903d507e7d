use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::db::BookCategory;
use crate::error::BookstoreError;
use crate::router::BookstoreState;
use crate::types::{CreateCategory, UpdateCategory};

pub async fn list_categories(
    State(state): State<BookstoreState>,
) -> Result<Json<Vec<BookCategory>>, BookstoreError> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn get_category(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
) -> Result<Json<BookCategory>, BookstoreError> {
    Ok(Json(state.catalog.get_category(id).await?))
}

pub async fn create_category(
    State(state): State<BookstoreState>,
    body: Result<Json<CreateCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<BookCategory>), BookstoreError> {
    let Json(input) = body?;
    input.validate()?;
    let category = state.catalog.create_category(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateCategory>, JsonRejection>,
) -> Result<Json<BookCategory>, BookstoreError> {
    let Json(input) = body?;
    input.validate()?;
    Ok(Json(state.catalog.update_category(id, &input).await?))
}

pub async fn delete_category(
    State(state): State<BookstoreState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, BookstoreError> {
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
