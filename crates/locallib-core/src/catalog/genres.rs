//! Genre flows.

use serde::Serialize;
use uuid::Uuid;

use super::{Catalog, CatalogError, CatalogResult, DeletePrompt, Form, FormPage};
use crate::{
  derived::{self, BookView, GenreView},
  model::EntityKind,
  store::{BookFilter, CatalogStore},
  validate::{self, GenreForm},
};

const KIND: EntityKind = EntityKind::Genre;

/// A genre together with the books tagged with it.
#[derive(Debug, Clone, Serialize)]
pub struct GenreDetail {
  pub genre: GenreView,
  pub books: Vec<BookView>,
}

impl<S: CatalogStore> Catalog<S> {
  pub async fn list_genres(&self) -> CatalogResult<Vec<GenreView>, S> {
    let genres = self.store.list_genres().await.map_err(CatalogError::Store)?;
    Ok(genres.into_iter().map(GenreView::from).collect())
  }

  pub async fn genre_detail(&self, id: Uuid) -> CatalogResult<GenreDetail, S> {
    let genre = self
      .store
      .get_genre(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    let filter = BookFilter { genre: Some(id), ..Default::default() };
    let books = self.store.find_books(filter).await.map_err(CatalogError::Store)?;

    Ok(GenreDetail {
      genre: genre.into(),
      books: books.into_iter().map(BookView::from).collect(),
    })
  }

  pub async fn genre_create_form(&self) -> CatalogResult<FormPage<GenreForm>, S> {
    Ok(FormPage {
      id:      None,
      form:    GenreForm::default(),
      choices: self.choices(KIND).await?,
    })
  }

  /// Creating a genre whose name already exists (ignoring case) creates
  /// nothing and returns the existing genre's URL.
  pub async fn create_genre(&self, form: &GenreForm) -> CatalogResult<String, S> {
    let fields = match validate::validate_genre(form) {
      Ok(fields) => fields,
      Err(invalid) => return Err(self.reject(KIND, invalid, Form::Genre).await),
    };

    if let Some(existing) = self
      .store
      .find_genre_by_name(&fields.name)
      .await
      .map_err(CatalogError::Store)?
    {
      tracing::debug!(genre_id = %existing.id, "genre already exists");
      return Ok(derived::url(KIND, existing.id));
    }

    let genre = self.store.create_genre(fields).await.map_err(CatalogError::Store)?;
    tracing::info!(genre_id = %genre.id, "genre created");
    Ok(derived::url(KIND, genre.id))
  }

  pub async fn genre_update_form(&self, id: Uuid) -> CatalogResult<FormPage<GenreForm>, S> {
    let genre = self
      .store
      .get_genre(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    Ok(FormPage {
      id:      Some(id),
      form:    GenreForm::from(&genre),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn update_genre(&self, id: Uuid, form: &GenreForm) -> CatalogResult<String, S> {
    let fields = match validate::validate_genre(form) {
      Ok(fields) => fields,
      Err(invalid) => return Err(self.reject(KIND, invalid, Form::Genre).await),
    };

    let genre = self
      .store
      .update_genre(id, fields)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;
    tracing::info!(genre_id = %genre.id, "genre updated");
    Ok(derived::url(KIND, genre.id))
  }

  pub async fn genre_delete_form(
    &self,
    id: Uuid,
  ) -> CatalogResult<Option<DeletePrompt<GenreView>>, S> {
    let Some(genre) = self.store.get_genre(id).await.map_err(CatalogError::Store)? else {
      return Ok(None);
    };
    let dependents = self.dependents(KIND, id).await?;
    Ok(Some(DeletePrompt { record: genre.into(), dependents }))
  }

  /// Delete a genre that no book is tagged with.
  pub async fn delete_genre(&self, id: Uuid) -> CatalogResult<String, S> {
    self.guard_delete(KIND, id).await?;
    if self.store.delete_genre(id).await.map_err(CatalogError::Store)? {
      tracing::info!(genre_id = %id, "genre deleted");
    }
    Ok(derived::list_url(KIND))
  }
}
