//! Referential integrity guard for deletes.
//!
//! Authors and genres are referenced by books; books are referenced by their
//! instances. A record with at least one dependent must not be deleted.
//!
//! The check and the delete are separate store round trips, and the store
//! contract promises nothing between them: a dependent created in that window
//! is not seen here. Whether the delete then orphans it or fails is up to the
//! backend; the SQLite store's foreign keys make it fail.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  model::{Book, BookInstance, EntityKind},
  store::{BookFilter, CatalogStore, InstanceFilter},
};

/// The records that currently reference a record under consideration for
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum Dependents {
  None,
  Books(Vec<Book>),
  Instances(Vec<BookInstance>),
}

impl Dependents {
  pub fn len(&self) -> usize {
    match self {
      Self::None => 0,
      Self::Books(books) => books.len(),
      Self::Instances(instances) => instances.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Collect the dependents of the record `(kind, id)`.
///
/// Book instances have no dependents and are always deletable.
pub async fn dependents<S: CatalogStore>(
  store: &S,
  kind: EntityKind,
  id: Uuid,
) -> Result<Dependents, S::Error> {
  let dependents = match kind {
    EntityKind::Author => {
      let filter = BookFilter { author: Some(id), ..Default::default() };
      Dependents::Books(store.find_books(filter).await?)
    }
    EntityKind::Genre => {
      let filter = BookFilter { genre: Some(id), ..Default::default() };
      Dependents::Books(store.find_books(filter).await?)
    }
    EntityKind::Book => {
      let filter = InstanceFilter { book: Some(id), ..Default::default() };
      Dependents::Instances(store.find_instances(filter).await?)
    }
    EntityKind::BookInstance => Dependents::None,
  };

  if dependents.is_empty() {
    Ok(Dependents::None)
  } else {
    Ok(dependents)
  }
}
