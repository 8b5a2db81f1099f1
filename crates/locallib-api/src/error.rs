//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use locallib_core::{
  catalog::{CatalogError, Rejection},
  integrity::Dependents,
  model::EntityKind,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Rendered as `422` with the sanitized form, violations and choice lists.
  #[error("invalid {} submission", .0.kind)]
  Invalid(Box<Rejection>),

  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: Uuid },

  #[error("{kind} {id} has dependent records")]
  Conflict {
    kind:       EntityKind,
    id:         Uuid,
    dependents: Dependents,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<E> From<CatalogError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(err: CatalogError<E>) -> Self {
    match err {
      CatalogError::Invalid(rejection) => ApiError::Invalid(rejection),
      CatalogError::NotFound { kind, id } => ApiError::NotFound { kind, id },
      CatalogError::IntegrityBlocked { kind, id, dependents } => {
        ApiError::Conflict { kind, id, dependents }
      }
      CatalogError::Store(e) => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Invalid(rejection) => {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(*rejection)).into_response()
      }
      ApiError::NotFound { .. } => (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": self.to_string() })),
      )
        .into_response(),
      ApiError::Conflict { ref dependents, .. } => (
        StatusCode::CONFLICT,
        Json(json!({ "error": self.to_string(), "dependents": dependents })),
      )
        .into_response(),
      ApiError::Store(ref e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": self.to_string() })),
        )
          .into_response()
      }
    }
  }
}
