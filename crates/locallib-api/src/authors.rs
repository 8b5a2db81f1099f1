//! Handlers for author endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog/authors` | Ordered by family name |
//! | `GET`  | `/catalog/author/create` | Empty form |
//! | `POST` | `/catalog/author/create` | 303 to the new author, 422 if invalid |
//! | `GET`  | `/catalog/author/{id}` | Author with their books |
//! | `GET`  | `/catalog/author/{id}/update` | Prefilled form |
//! | `POST` | `/catalog/author/{id}/update` | 303 to the author, 422 if invalid |
//! | `GET`  | `/catalog/author/{id}/delete` | Author with their books; 303 to the list if gone |
//! | `POST` | `/catalog/author/{id}/delete` | 303 to the list, 409 while books remain |

use axum::{
  Json,
  extract::{Path, State},
  response::{IntoResponse, Redirect, Response},
};
use locallib_core::{
  catalog::{AuthorDetail, Catalog, FormPage},
  derived::{self, AuthorView},
  model::EntityKind,
  store::CatalogStore,
  validate::AuthorForm,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /catalog/authors`
pub async fn list<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<Vec<AuthorView>>, ApiError> {
  Ok(Json(catalog.list_authors().await?))
}

/// `GET /catalog/author/{id}`
pub async fn detail<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<AuthorDetail>, ApiError> {
  Ok(Json(catalog.author_detail(id).await?))
}

/// `GET /catalog/author/create`
pub async fn create_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<FormPage<AuthorForm>>, ApiError> {
  Ok(Json(catalog.author_create_form().await?))
}

/// `POST /catalog/author/create`
pub async fn create<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Json(form): Json<AuthorForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.create_author(&form).await?;
  Ok(Redirect::to(&url))
}

/// `GET /catalog/author/{id}/update`
pub async fn update_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FormPage<AuthorForm>>, ApiError> {
  Ok(Json(catalog.author_update_form(id).await?))
}

/// `POST /catalog/author/{id}/update`
pub async fn update<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
  Json(form): Json<AuthorForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.update_author(id, &form).await?;
  Ok(Redirect::to(&url))
}

/// `GET /catalog/author/{id}/delete`
pub async fn delete_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  Ok(match catalog.author_delete_form(id).await? {
    Some(prompt) => Json(prompt).into_response(),
    None => Redirect::to(&derived::list_url(EntityKind::Author)).into_response(),
  })
}

/// `POST /catalog/author/{id}/delete`
pub async fn delete<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
  let url = catalog.delete_author(id).await?;
  Ok(Redirect::to(&url))
}
