//! Author flows.

use serde::Serialize;
use uuid::Uuid;

use super::{
  Catalog, CatalogError, CatalogResult, DeletePrompt, Form, FormPage,
};
use crate::{
  derived::{self, AuthorView, BookView},
  model::EntityKind,
  store::{BookFilter, CatalogStore},
  validate::{self, AuthorForm},
};

const KIND: EntityKind = EntityKind::Author;

/// An author together with the books they wrote.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
  pub author: AuthorView,
  pub books:  Vec<BookView>,
}

impl<S: CatalogStore> Catalog<S> {
  pub async fn list_authors(&self) -> CatalogResult<Vec<AuthorView>, S> {
    let authors = self.store.list_authors().await.map_err(CatalogError::Store)?;
    Ok(authors.into_iter().map(AuthorView::from).collect())
  }

  pub async fn author_detail(&self, id: Uuid) -> CatalogResult<AuthorDetail, S> {
    let author = self
      .store
      .get_author(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    let filter = BookFilter { author: Some(id), ..Default::default() };
    let books = self.store.find_books(filter).await.map_err(CatalogError::Store)?;

    Ok(AuthorDetail {
      author: author.into(),
      books:  books.into_iter().map(BookView::from).collect(),
    })
  }

  pub async fn author_create_form(&self) -> CatalogResult<FormPage<AuthorForm>, S> {
    Ok(FormPage {
      id:      None,
      form:    AuthorForm::default(),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn create_author(&self, form: &AuthorForm) -> CatalogResult<String, S> {
    let fields = match validate::validate_author(form) {
      Ok(fields) => fields,
      Err(invalid) => return Err(self.reject(KIND, invalid, Form::Author).await),
    };

    let author = self
      .store
      .create_author(fields)
      .await
      .map_err(CatalogError::Store)?;
    tracing::info!(author_id = %author.id, "author created");
    Ok(derived::url(KIND, author.id))
  }

  pub async fn author_update_form(&self, id: Uuid) -> CatalogResult<FormPage<AuthorForm>, S> {
    let author = self
      .store
      .get_author(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    Ok(FormPage {
      id:      Some(id),
      form:    AuthorForm::from(&author),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn update_author(&self, id: Uuid, form: &AuthorForm) -> CatalogResult<String, S> {
    let fields = match validate::validate_author(form) {
      Ok(fields) => fields,
      Err(invalid) => return Err(self.reject(KIND, invalid, Form::Author).await),
    };

    let author = self
      .store
      .update_author(id, fields)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;
    tracing::info!(author_id = %author.id, "author updated");
    Ok(derived::url(KIND, author.id))
  }

  /// `None` when the author is already gone; the caller should return to the
  /// author list.
  pub async fn author_delete_form(
    &self,
    id: Uuid,
  ) -> CatalogResult<Option<DeletePrompt<AuthorView>>, S> {
    let Some(author) = self.store.get_author(id).await.map_err(CatalogError::Store)? else {
      return Ok(None);
    };
    let dependents = self.dependents(KIND, id).await?;
    Ok(Some(DeletePrompt { record: author.into(), dependents }))
  }

  /// Delete an author that no book references.
  pub async fn delete_author(&self, id: Uuid) -> CatalogResult<String, S> {
    self.guard_delete(KIND, id).await?;
    if self.store.delete_author(id).await.map_err(CatalogError::Store)? {
      tracing::info!(author_id = %id, "author deleted");
    }
    Ok(derived::list_url(KIND))
  }
}
