//! Handlers for genre endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog/genres` | Ordered by name |
//! | `GET`  | `/catalog/genre/create` | Empty form |
//! | `POST` | `/catalog/genre/create` | 303 to the new genre, or to an existing one of the same name |
//! | `GET`  | `/catalog/genre/{id}` | Genre with its books |
//! | `GET`  | `/catalog/genre/{id}/update` | Prefilled form |
//! | `POST` | `/catalog/genre/{id}/update` | 303 to the genre, 422 if invalid |
//! | `GET`  | `/catalog/genre/{id}/delete` | 303 to the list if gone |
//! | `POST` | `/catalog/genre/{id}/delete` | 409 while books are tagged with it |

use axum::{
  Json,
  extract::{Path, State},
  response::{IntoResponse, Redirect, Response},
};
use locallib_core::{
  catalog::{Catalog, FormPage, GenreDetail},
  derived::{self, GenreView},
  model::EntityKind,
  store::CatalogStore,
  validate::GenreForm,
};
use uuid::Uuid;

use crate::error::ApiError;

pub async fn list<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<Vec<GenreView>>, ApiError> {
  Ok(Json(catalog.list_genres().await?))
}

pub async fn detail<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GenreDetail>, ApiError> {
  Ok(Json(catalog.genre_detail(id).await?))
}

pub async fn create_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<FormPage<GenreForm>>, ApiError> {
  Ok(Json(catalog.genre_create_form().await?))
}

pub async fn create<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Json(form): Json<GenreForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.create_genre(&form).await?;
  Ok(Redirect::to(&url))
}

pub async fn update_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FormPage<GenreForm>>, ApiError> {
  Ok(Json(catalog.genre_update_form(id).await?))
}

pub async fn update<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
  Json(form): Json<GenreForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.update_genre(id, &form).await?;
  Ok(Redirect::to(&url))
}

pub async fn delete_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  Ok(match catalog.genre_delete_form(id).await? {
    Some(prompt) => Json(prompt).into_response(),
    None => Redirect::to(&derived::list_url(EntityKind::Genre)).into_response(),
  })
}

pub async fn delete<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
  let url = catalog.delete_genre(id).await?;
  Ok(Redirect::to(&url))
}
