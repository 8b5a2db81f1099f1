//! Handlers for book instance endpoints, mounted under
//! `/catalog/bookinstance`.

use axum::{
  Json,
  extract::{Path, State},
  response::{IntoResponse, Redirect, Response},
};
use locallib_core::{
  catalog::{Catalog, FormPage, InstanceDetail, InstanceListItem},
  derived,
  model::EntityKind,
  store::CatalogStore,
  validate::InstanceForm,
};
use uuid::Uuid;

use crate::error::ApiError;

pub async fn list<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<Vec<InstanceListItem>>, ApiError> {
  Ok(Json(catalog.list_instances().await?))
}

pub async fn detail<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<InstanceDetail>, ApiError> {
  Ok(Json(catalog.instance_detail(id).await?))
}

/// The form's choices carry every book plus the four status literals.
pub async fn create_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<FormPage<InstanceForm>>, ApiError> {
  Ok(Json(catalog.instance_create_form().await?))
}

pub async fn create<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Json(form): Json<InstanceForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.create_instance(&form).await?;
  Ok(Redirect::to(&url))
}

pub async fn update_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FormPage<InstanceForm>>, ApiError> {
  Ok(Json(catalog.instance_update_form(id).await?))
}

pub async fn update<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
  Json(form): Json<InstanceForm>,
) -> Result<Redirect, ApiError> {
  let url = catalog.update_instance(id, &form).await?;
  Ok(Redirect::to(&url))
}

pub async fn delete_form<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  Ok(match catalog.instance_delete_form(id).await? {
    Some(prompt) => Json(prompt).into_response(),
    None => Redirect::to(&derived::list_url(EntityKind::BookInstance)).into_response(),
  })
}

/// Copies are never referenced, so this always succeeds.
pub async fn delete<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
  Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
  let url = catalog.delete_instance(id).await?;
  Ok(Redirect::to(&url))
}
