//! Handlers for book endpoints.
//!
//! Submissions carry `genres` as a JSON array of genre ids; blanks are
//! ignored and duplicates collapse.

use axum::{
  Json,
  extract::{Path, State},
  response::{IntoResponse, Redirect, Response},
};
use locallib_core::{
  catalog::{BookDetail, BookListItem, Catalog, FormPage},
  derived,
  model::EntityKind,
  store::CatalogStore,
  validate::BookForm,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /catalog/books`: each book with its author resolved.
pub async fn list<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<Vec<BookListItem>>, ApiError> {
  Ok(Json(catalog.list_books().await?))
}

/// `GET /catalog/book/{id}`: author, genres and copies resolved.
pub async fn detail<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<BookDetail>, ApiError> {
  Ok(Json(catalog.book_detail(id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `GET /catalog/book/create`: empty form plus author and genre choices.
pub async fn create_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<FormPage<BookForm>>, ApiError> {
  Ok(Json(catalog.book_create_form().await?))
}

/// `POST /catalog/book/create`
pub async fn create<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Json(form): Json<BookForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.create_book(&form).await?;
  Ok(Redirect::to(&url))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `GET /catalog/book/{id}/update`
pub async fn update_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FormPage<BookForm>>, ApiError> {
  Ok(Json(catalog.book_update_form(id).await?))
}

/// `POST /catalog/book/{id}/update`
pub async fn update<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
  Json(form): Json<BookForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.update_book(id, &form).await?;
  Ok(Redirect::to(&url))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `GET /catalog/book/{id}/delete`: the book and its copies.
pub async fn delete_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  Ok(match catalog.book_delete_form(id).await? {
    Some(prompt) => Json(prompt).into_response(),
    None => Redirect::to(&derived::list_url(EntityKind::Book)).into_response(),
  })
}

/// `POST /catalog/book/{id}/delete`: `409` while copies remain.
pub async fn delete<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
  let url = catalog.delete_book(id).await?;
  Ok(Redirect::to(&url))
}
