//! Book flows.
//!
//! A book's author and genres must exist when the book is written. The check
//! is a plain read before the write, not a transaction.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::{
  Catalog, CatalogError, CatalogResult, DeletePrompt, Form, FormPage, in_field_order,
};
use crate::{
  derived::{self, AuthorView, BookView, GenreView, InstanceView},
  model::{BookFields, EntityKind},
  store::{BookFilter, CatalogStore, InstanceFilter},
  validate::{self, BookForm, Invalid, Violation},
};

const KIND: EntityKind = EntityKind::Book;

/// A row of the book list: the book with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BookListItem {
  pub book:   BookView,
  pub author: Option<AuthorView>,
}

/// A book with its author, genres and copies resolved.
///
/// References that no longer resolve are left out rather than failing the
/// read.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
  pub book:      BookView,
  pub author:    Option<AuthorView>,
  pub genres:    Vec<GenreView>,
  pub instances: Vec<InstanceView>,
}

impl<S: CatalogStore> Catalog<S> {
  pub async fn list_books(&self) -> CatalogResult<Vec<BookListItem>, S> {
    let books = self
      .store
      .find_books(BookFilter::default())
      .await
      .map_err(CatalogError::Store)?;
    let authors: HashMap<Uuid, AuthorView> = self
      .store
      .list_authors()
      .await
      .map_err(CatalogError::Store)?
      .into_iter()
      .map(|a| (a.id, AuthorView::from(a)))
      .collect();

    Ok(
      books
        .into_iter()
        .map(|book| BookListItem {
          author: authors.get(&book.author).cloned(),
          book:   book.into(),
        })
        .collect(),
    )
  }

  pub async fn book_detail(&self, id: Uuid) -> CatalogResult<BookDetail, S> {
    let book = self
      .store
      .get_book(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    let author = self
      .store
      .get_author(book.author)
      .await
      .map_err(CatalogError::Store)?
      .map(AuthorView::from);

    let mut genres = Vec::with_capacity(book.genres.len());
    for genre_id in &book.genres {
      if let Some(genre) = self.store.get_genre(*genre_id).await.map_err(CatalogError::Store)? {
        genres.push(GenreView::from(genre));
      }
    }

    let filter = InstanceFilter { book: Some(id), ..Default::default() };
    let instances = self
      .store
      .find_instances(filter)
      .await
      .map_err(CatalogError::Store)?;

    Ok(BookDetail {
      book: book.into(),
      author,
      genres,
      instances: instances.into_iter().map(InstanceView::from).collect(),
    })
  }

  pub async fn book_create_form(&self) -> CatalogResult<FormPage<BookForm>, S> {
    Ok(FormPage {
      id:      None,
      form:    BookForm::default(),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn create_book(&self, form: &BookForm) -> CatalogResult<String, S> {
    let fields = self.validated_book(form).await?;
    let book = self.store.create_book(fields).await.map_err(CatalogError::Store)?;
    tracing::info!(book_id = %book.id, author_id = %book.author, "book created");
    Ok(derived::url(KIND, book.id))
  }

  pub async fn book_update_form(&self, id: Uuid) -> CatalogResult<FormPage<BookForm>, S> {
    let book = self
      .store
      .get_book(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    Ok(FormPage {
      id:      Some(id),
      form:    BookForm::from(&book),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn update_book(&self, id: Uuid, form: &BookForm) -> CatalogResult<String, S> {
    let fields = self.validated_book(form).await?;
    let book = self
      .store
      .update_book(id, fields)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;
    tracing::info!(book_id = %book.id, "book updated");
    Ok(derived::url(KIND, book.id))
  }

  pub async fn book_delete_form(
    &self,
    id: Uuid,
  ) -> CatalogResult<Option<DeletePrompt<BookView>>, S> {
    let Some(book) = self.store.get_book(id).await.map_err(CatalogError::Store)? else {
      return Ok(None);
    };
    let dependents = self.dependents(KIND, id).await?;
    Ok(Some(DeletePrompt { record: book.into(), dependents }))
  }

  /// Delete a book that has no copies.
  pub async fn delete_book(&self, id: Uuid) -> CatalogResult<String, S> {
    self.guard_delete(KIND, id).await?;
    if self.store.delete_book(id).await.map_err(CatalogError::Store)? {
      tracing::info!(book_id = %id, "book deleted");
    }
    Ok(derived::list_url(KIND))
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  /// Validate the form and check that its author and genres exist.
  ///
  /// References are looked up whenever they parse as ids, even if other
  /// fields failed, so one rejection carries every violation.
  async fn validated_book(&self, form: &BookForm) -> CatalogResult<BookFields, S> {
    let (fields, form, mut violations) = match validate::validate_book(form) {
      Ok(fields) => {
        let form = echo(&fields);
        (Some(fields), form, Vec::new())
      }
      Err(invalid) => (None, invalid.form, invalid.violations),
    };

    if let Ok(author) = Uuid::parse_str(&form.author)
      && self
        .store
        .get_author(author)
        .await
        .map_err(CatalogError::Store)?
        .is_none()
    {
      violations.push(Violation {
        field:   "author",
        message: "Author not found.".to_owned(),
      });
    }

    let mut checked = Vec::with_capacity(form.genres.len());
    for genre_id in form.genres.iter().filter_map(|g| Uuid::parse_str(g).ok()) {
      if checked.contains(&genre_id) {
        continue;
      }
      checked.push(genre_id);
      if self.store.get_genre(genre_id).await.map_err(CatalogError::Store)?.is_none() {
        violations.push(Violation {
          field:   "genres",
          message: format!("Genre {genre_id} not found."),
        });
      }
    }

    match fields {
      Some(fields) if violations.is_empty() => Ok(fields),
      _ => {
        in_field_order(&mut violations, FIELD_ORDER);
        let invalid = Invalid { form, violations };
        Err(self.reject(KIND, invalid, Form::Book).await)
      }
    }
  }
}

const FIELD_ORDER: &[&str] = &["title", "author", "summary", "isbn", "genres"];

/// The sanitized form corresponding to already-validated fields.
fn echo(fields: &BookFields) -> BookForm {
  BookForm {
    title:   fields.title.clone(),
    author:  fields.author.to_string(),
    summary: fields.summary.clone(),
    isbn:    fields.isbn.clone(),
    genres:  fields.genres.iter().map(Uuid::to_string).collect(),
  }
}
