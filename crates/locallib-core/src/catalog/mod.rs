//! Catalog operations: the create/read/update/delete flows for every entity
//! kind, composed from the store, the validator, the derived-field calculator
//! and the integrity guard.
//!
//! | Flow | Author | Genre | Book | BookInstance |
//! |------|--------|-------|------|--------------|
//! | list | [`Catalog::list_authors`] | [`Catalog::list_genres`] | [`Catalog::list_books`] | [`Catalog::list_instances`] |
//! | detail | [`Catalog::author_detail`] | [`Catalog::genre_detail`] | [`Catalog::book_detail`] | [`Catalog::instance_detail`] |
//! | create form | [`Catalog::author_create_form`] | [`Catalog::genre_create_form`] | [`Catalog::book_create_form`] | [`Catalog::instance_create_form`] |
//! | create | [`Catalog::create_author`] | [`Catalog::create_genre`] | [`Catalog::create_book`] | [`Catalog::create_instance`] |
//! | update form | [`Catalog::author_update_form`] | [`Catalog::genre_update_form`] | [`Catalog::book_update_form`] | [`Catalog::instance_update_form`] |
//! | update | [`Catalog::update_author`] | [`Catalog::update_genre`] | [`Catalog::update_book`] | [`Catalog::update_instance`] |
//! | delete form | [`Catalog::author_delete_form`] | [`Catalog::genre_delete_form`] | [`Catalog::book_delete_form`] | [`Catalog::instance_delete_form`] |
//! | delete | [`Catalog::delete_author`] | [`Catalog::delete_genre`] | [`Catalog::delete_book`] | [`Catalog::delete_instance`] |
//!
//! Successful writes return the canonical URL of the record; deletes return
//! the URL of the collection. No step is retried and nothing spans store
//! calls: two concurrent updates of one record are last-write-wins.

mod authors;
mod books;
mod genres;
mod instances;

pub use authors::AuthorDetail;
pub use books::{BookDetail, BookListItem};
pub use genres::GenreDetail;
pub use instances::{InstanceDetail, InstanceListItem};

use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator as _;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  integrity::{self, Dependents},
  model::{EntityKind, Reference, Status},
  store::CatalogStore,
  validate::{AuthorForm, BookForm, GenreForm, InstanceForm, Invalid, Violation},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failure of a catalog operation. `E` is the store's error type.
#[derive(Debug, Error)]
pub enum CatalogError<E: std::error::Error + 'static> {
  /// The submission failed validation; nothing was written.
  #[error("invalid {} submission ({} violation(s))", .0.kind, .0.errors.len())]
  Invalid(Box<Rejection>),

  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: Uuid },

  /// Delete refused while dependents exist.
  #[error("{kind} {id} is still referenced by {} record(s)", .dependents.len())]
  IntegrityBlocked {
    kind:       EntityKind,
    id:         Uuid,
    dependents: Dependents,
  },

  #[error("store error: {0}")]
  Store(#[source] E),
}

pub type CatalogResult<T, S> =
  Result<T, CatalogError<<S as CatalogStore>::Error>>;

// ─── Forms ───────────────────────────────────────────────────────────────────

/// A submitted form of any kind, as echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Form {
  Author(AuthorForm),
  Genre(GenreForm),
  Book(BookForm),
  Instance(InstanceForm),
}

/// Options for the selectable fields of a form. Only the lists relevant to
/// the form's kind are filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormChoices {
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub authors:  Vec<Reference>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub genres:   Vec<Reference>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub books:    Vec<Reference>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub statuses: Vec<Status>,
}

/// Everything needed to render a create or update form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormPage<F> {
  /// `None` on create forms.
  pub id:      Option<Uuid>,
  pub form:    F,
  pub choices: FormChoices,
}

/// A rejected create/update: redisplay `form` with `errors` inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
  pub kind:    EntityKind,
  pub form:    Form,
  pub errors:  Vec<Violation>,
  pub choices: FormChoices,
}

/// Delete confirmation: the record plus whatever still references it.
#[derive(Debug, Clone, Serialize)]
pub struct DeletePrompt<T> {
  pub record:     T,
  pub dependents: Dependents,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Record counts shown on the catalog home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub books:               u64,
  pub instances:           u64,
  pub instances_available: u64,
  pub authors:             u64,
  pub genres:              u64,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// The catalog's operation surface over a [`CatalogStore`].
///
/// Cloning is cheap: the store is reference-counted.
pub struct Catalog<S> {
  store: Arc<S>,
}

impl<S> Clone for Catalog<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: CatalogStore> Catalog<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// `GET /catalog`: counts of every kind, plus available copies.
  pub async fn summary(&self) -> CatalogResult<Summary, S> {
    let store = &*self.store;
    Ok(Summary {
      books:               store.count(EntityKind::Book).await.map_err(CatalogError::Store)?,
      instances:           store
        .count(EntityKind::BookInstance)
        .await
        .map_err(CatalogError::Store)?,
      instances_available: store
        .count_instances_with_status(Status::Available)
        .await
        .map_err(CatalogError::Store)?,
      authors:             store.count(EntityKind::Author).await.map_err(CatalogError::Store)?,
      genres:              store.count(EntityKind::Genre).await.map_err(CatalogError::Store)?,
    })
  }

  // ── Shared steps ──────────────────────────────────────────────────────

  /// Choice lists for the form of `kind`.
  async fn choices(&self, kind: EntityKind) -> CatalogResult<FormChoices, S> {
    let mut choices = FormChoices::default();
    match kind {
      EntityKind::Author | EntityKind::Genre => {}
      EntityKind::Book => {
        choices.authors = self.references(EntityKind::Author).await?;
        choices.genres = self.references(EntityKind::Genre).await?;
      }
      EntityKind::BookInstance => {
        choices.books = self.references(EntityKind::Book).await?;
        choices.statuses = Status::iter().collect();
      }
    }
    Ok(choices)
  }

  async fn references(&self, kind: EntityKind) -> CatalogResult<Vec<Reference>, S> {
    self.store.references(kind).await.map_err(CatalogError::Store)
  }

  /// Build the error for a rejected submission, re-fetching the form's
  /// choice lists so it can be redisplayed.
  async fn reject<F>(
    &self,
    kind: EntityKind,
    invalid: Invalid<F>,
    wrap: fn(F) -> Form,
  ) -> CatalogError<S::Error> {
    tracing::debug!(
      %kind,
      violations = invalid.violations.len(),
      "submission rejected"
    );
    let choices = match self.choices(kind).await {
      Ok(choices) => choices,
      Err(e) => return e,
    };
    CatalogError::Invalid(Box::new(Rejection {
      kind,
      form: wrap(invalid.form),
      errors: invalid.violations,
      choices,
    }))
  }

  async fn dependents(&self, kind: EntityKind, id: Uuid) -> CatalogResult<Dependents, S> {
    integrity::dependents(&*self.store, kind, id)
      .await
      .map_err(CatalogError::Store)
  }

  /// Refuse the delete of `(kind, id)` while anything references it.
  async fn guard_delete(&self, kind: EntityKind, id: Uuid) -> CatalogResult<(), S> {
    let dependents = self.dependents(kind, id).await?;
    if !dependents.is_empty() {
      tracing::warn!(
        %kind,
        %id,
        dependents = dependents.len(),
        "delete blocked by dependent records"
      );
      return Err(CatalogError::IntegrityBlocked { kind, id, dependents });
    }
    Ok(())
  }
}

/// Stable-sort `violations` by the position of their field in `order`.
fn in_field_order(violations: &mut [Violation], order: &[&str]) {
  violations.sort_by_key(|v| order.iter().position(|f| *f == v.field));
}
