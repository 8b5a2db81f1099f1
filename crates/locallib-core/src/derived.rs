//! Derived display fields: computed from stored fields on every read, never
//! persisted.
//!
//! Date fallbacks differ by field meaning: an unknown birth date renders as an
//! empty string, an unknown death date as `"present"`.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Author, Book, BookInstance, EntityKind, Genre};

/// Fallback for an unset date of death.
pub const PRESENT: &str = "present";

// ─── Primitives ──────────────────────────────────────────────────────────────

/// `"{family_name}, {first_name}"`, or `""` unless both names are present.
pub fn full_name(author: &Author) -> String {
  if author.first_name.is_empty() || author.family_name.is_empty() {
    String::new()
  } else {
    format!("{}, {}", author.family_name, author.first_name)
  }
}

/// Canonical path of a record, e.g. `/catalog/author/{id}`.
pub fn url(kind: EntityKind, id: Uuid) -> String {
  format!("/catalog/{kind}/{id}")
}

/// Path of the collection listing all records of `kind`.
pub fn list_url(kind: EntityKind) -> String {
  format!("/catalog/{}", kind.collection())
}

/// Medium-length human date, e.g. `Oct 18, 2026`.
pub fn formatted_date(date: NaiveDate) -> String {
  date.format("%b %-d, %Y").to_string()
}

pub fn date_of_birth_formatted(author: &Author) -> String {
  author.date_of_birth.map(formatted_date).unwrap_or_default()
}

pub fn date_of_death_formatted(author: &Author) -> String {
  author
    .date_of_death
    .map(formatted_date)
    .unwrap_or_else(|| PRESENT.to_owned())
}

/// `"{formatted birth} - {formatted death}"`.
pub fn lifespan(author: &Author) -> String {
  format!(
    "{} - {}",
    date_of_birth_formatted(author),
    date_of_death_formatted(author)
  )
}

/// `yyyy-MM-dd`, as expected by date inputs on edit forms.
pub fn date_picker_value(date: Option<NaiveDate>) -> Option<String> {
  date.map(|d| d.format("%Y-%m-%d").to_string())
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// An [`Author`] bundled with its derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
  #[serde(flatten)]
  pub author:                   Author,
  pub name:                     String,
  pub url:                      String,
  pub lifespan:                 String,
  pub date_of_birth_formatted:  String,
  pub date_of_death_formatted:  String,
  pub date_of_birth_datepicker: Option<String>,
  pub date_of_death_datepicker: Option<String>,
}

impl From<Author> for AuthorView {
  fn from(author: Author) -> Self {
    Self {
      name: full_name(&author),
      url: url(EntityKind::Author, author.id),
      lifespan: lifespan(&author),
      date_of_birth_formatted: date_of_birth_formatted(&author),
      date_of_death_formatted: date_of_death_formatted(&author),
      date_of_birth_datepicker: date_picker_value(author.date_of_birth),
      date_of_death_datepicker: date_picker_value(author.date_of_death),
      author,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenreView {
  #[serde(flatten)]
  pub genre: Genre,
  pub url:   String,
}

impl From<Genre> for GenreView {
  fn from(genre: Genre) -> Self {
    Self { url: url(EntityKind::Genre, genre.id), genre }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookView {
  #[serde(flatten)]
  pub book: Book,
  pub url:  String,
}

impl From<Book> for BookView {
  fn from(book: Book) -> Self {
    Self { url: url(EntityKind::Book, book.id), book }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
  #[serde(flatten)]
  pub instance:            BookInstance,
  pub url:                 String,
  pub due_back_formatted:  String,
  pub due_back_datepicker: Option<String>,
}

impl From<BookInstance> for InstanceView {
  fn from(instance: BookInstance) -> Self {
    Self {
      url: url(EntityKind::BookInstance, instance.id),
      due_back_formatted: instance
        .due_back
        .map(formatted_date)
        .unwrap_or_default(),
      due_back_datepicker: date_picker_value(instance.due_back),
      instance,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn author(first: &str, family: &str) -> Author {
    Author {
      id:            Uuid::nil(),
      first_name:    first.into(),
      family_name:   family.into(),
      date_of_birth: None,
      date_of_death: None,
    }
  }

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn full_name_needs_both_parts() {
    assert_eq!(full_name(&author("J.R.R.", "Tolkien")), "Tolkien, J.R.R.");
    assert_eq!(full_name(&author("", "Tolkien")), "");
    assert_eq!(full_name(&author("J.R.R.", "")), "");
    assert_eq!(full_name(&author("", "")), "");
  }

  #[test]
  fn urls_are_path_style() {
    let id = Uuid::new_v4();
    assert_eq!(url(EntityKind::Author, id), format!("/catalog/author/{id}"));
    assert_eq!(
      url(EntityKind::BookInstance, id),
      format!("/catalog/bookinstance/{id}")
    );
    assert_eq!(list_url(EntityKind::Genre), "/catalog/genres");
  }

  #[test]
  fn date_fallbacks_differ_by_field() {
    let a = author("J.R.R.", "Tolkien");
    assert_eq!(date_of_birth_formatted(&a), "");
    assert_eq!(date_of_death_formatted(&a), "present");
    assert_eq!(lifespan(&a), " - present");
  }

  #[test]
  fn lifespan_formats_both_dates() {
    let mut a = author("J.R.R.", "Tolkien");
    a.date_of_birth = Some(ymd(1892, 1, 3));
    a.date_of_death = Some(ymd(1973, 9, 2));
    assert_eq!(lifespan(&a), "Jan 3, 1892 - Sep 2, 1973");
  }

  #[test]
  fn date_picker_value_is_iso() {
    assert_eq!(date_picker_value(Some(ymd(2026, 3, 7))).as_deref(), Some("2026-03-07"));
    assert_eq!(date_picker_value(None), None);
  }

  #[test]
  fn author_view_carries_derived_fields() {
    let mut a = author("Ursula", "Le Guin");
    a.date_of_birth = Some(ymd(1929, 10, 21));
    let view = AuthorView::from(a);
    assert_eq!(view.name, "Le Guin, Ursula");
    assert_eq!(view.lifespan, "Oct 21, 1929 - present");
    assert_eq!(view.date_of_birth_datepicker.as_deref(), Some("1929-10-21"));
    assert_eq!(view.date_of_death_datepicker, None);
  }
}
