//! The `CatalogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `locallib-store-sqlite`).
//! Higher layers ([`crate::catalog`], `locallib-api`) depend on this
//! abstraction, not on any concrete backend.
//!
//! Records reference each other by id only. A read never resolves references
//! on its own; callers that need the referenced record fetch it explicitly.

use std::future::Future;

use uuid::Uuid;

use crate::model::{
  Author, AuthorFields, Book, BookFields, BookInstance, EntityKind, Genre,
  GenreFields, InstanceFields, Reference, Status,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`CatalogStore::find_books`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookFilter {
  /// Only books written by this author.
  pub author: Option<Uuid>,
  /// Only books tagged with this genre.
  pub genre:  Option<Uuid>,
}

/// Parameters for [`CatalogStore::find_instances`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceFilter {
  /// Only copies of this book.
  pub book:   Option<Uuid>,
  pub status: Option<Status>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a catalog store backend.
///
/// Each method is atomic for its own records only; nothing spans calls. Ids
/// are assigned by the store on create. Updates replace the full stored field
/// set. List results are ordered by their display label.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Authors ───────────────────────────────────────────────────────────

  fn create_author(
    &self,
    fields: AuthorFields,
  ) -> impl Future<Output = Result<Author, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_author(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Author>, Self::Error>> + Send + '_;

  /// All authors, ordered by family name then first name.
  fn list_authors(
    &self,
  ) -> impl Future<Output = Result<Vec<Author>, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn update_author(
    &self,
    id: Uuid,
    fields: AuthorFields,
  ) -> impl Future<Output = Result<Option<Author>, Self::Error>> + Send + '_;

  /// Returns `false` if there was nothing to delete.
  fn delete_author(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Genres ────────────────────────────────────────────────────────────

  fn create_genre(
    &self,
    fields: GenreFields,
  ) -> impl Future<Output = Result<Genre, Self::Error>> + Send + '_;

  fn get_genre(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Genre>, Self::Error>> + Send + '_;

  /// Case-insensitive exact match on the genre name.
  fn find_genre_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Genre>, Self::Error>> + Send + 'a;

  fn list_genres(
    &self,
  ) -> impl Future<Output = Result<Vec<Genre>, Self::Error>> + Send + '_;

  fn update_genre(
    &self,
    id: Uuid,
    fields: GenreFields,
  ) -> impl Future<Output = Result<Option<Genre>, Self::Error>> + Send + '_;

  fn delete_genre(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Books ─────────────────────────────────────────────────────────────

  /// Writes the book and its genre links in one transaction.
  fn create_book(
    &self,
    fields: BookFields,
  ) -> impl Future<Output = Result<Book, Self::Error>> + Send + '_;

  fn get_book(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  fn find_books(
    &self,
    filter: BookFilter,
  ) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + '_;

  fn update_book(
    &self,
    id: Uuid,
    fields: BookFields,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  /// Also removes the book's genre links.
  fn delete_book(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Book instances ────────────────────────────────────────────────────

  fn create_instance(
    &self,
    fields: InstanceFields,
  ) -> impl Future<Output = Result<BookInstance, Self::Error>> + Send + '_;

  fn get_instance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<BookInstance>, Self::Error>> + Send + '_;

  fn find_instances(
    &self,
    filter: InstanceFilter,
  ) -> impl Future<Output = Result<Vec<BookInstance>, Self::Error>> + Send + '_;

  fn update_instance(
    &self,
    id: Uuid,
    fields: InstanceFields,
  ) -> impl Future<Output = Result<Option<BookInstance>, Self::Error>> + Send + '_;

  fn delete_instance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Projections ───────────────────────────────────────────────────────

  /// Id + display label for every record of `kind`, ordered by label.
  ///
  /// Authors are labelled by full name, genres by name, books by title and
  /// instances by imprint.
  fn references(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<Vec<Reference>, Self::Error>> + Send + '_;

  /// Number of stored records of `kind`.
  fn count(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_instances_with_status(
    &self,
    status: Status,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
