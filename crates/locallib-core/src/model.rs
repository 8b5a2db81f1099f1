//! Catalog records: the four entity kinds and their canonical field sets.
//!
//! A record is what the store hands back: an id plus the stored fields.
//! References between records are plain UUIDs; resolving them into the
//! referenced record is always an explicit read (see [`crate::catalog`]).
//! Display values such as full names and URLs are never stored here; they are
//! computed on demand by [`crate::derived`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The four record kinds held by the catalog.
///
/// The lowercase string form doubles as the URL path segment
/// (`/catalog/bookinstance/{id}`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Author,
  Genre,
  Book,
  BookInstance,
}

impl EntityKind {
  /// The plural collection segment used by list URLs.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Author => "authors",
      Self::Genre => "genres",
      Self::Book => "books",
      Self::BookInstance => "bookinstances",
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Circulation status of a physical copy. No other value is persistable.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Status {
  #[default]
  Maintenance,
  Available,
  Loaned,
  Reserved,
}

impl Status {
  /// Exact, case-sensitive match against the four literals.
  pub fn parse(value: &str) -> Result<Self> {
    value
      .parse()
      .map_err(|_| Error::UnknownStatus(value.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Author ──────────────────────────────────────────────────────────────────

/// Canonical, validated author fields: the input to store writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorFields {
  pub first_name:    String,
  pub family_name:   String,
  pub date_of_birth: Option<NaiveDate>,
  pub date_of_death: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  pub id:            Uuid,
  pub first_name:    String,
  pub family_name:   String,
  pub date_of_birth: Option<NaiveDate>,
  pub date_of_death: Option<NaiveDate>,
}

impl Author {
  pub fn from_fields(id: Uuid, fields: AuthorFields) -> Self {
    Self {
      id,
      first_name: fields.first_name,
      family_name: fields.family_name,
      date_of_birth: fields.date_of_birth,
      date_of_death: fields.date_of_death,
    }
  }
}

// ─── Genre ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreFields {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
  pub id:   Uuid,
  pub name: String,
}

impl Genre {
  pub fn from_fields(id: Uuid, fields: GenreFields) -> Self {
    Self { id, name: fields.name }
  }
}

// ─── Book ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
  pub title:   String,
  /// Must name an existing [`Author`] at write time.
  pub author:  Uuid,
  pub summary: String,
  pub isbn:    String,
  /// A set: no duplicates, order of first submission preserved.
  pub genres:  Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
  pub id:      Uuid,
  pub title:   String,
  pub author:  Uuid,
  pub summary: String,
  pub isbn:    String,
  pub genres:  Vec<Uuid>,
}

impl Book {
  pub fn from_fields(id: Uuid, fields: BookFields) -> Self {
    Self {
      id,
      title: fields.title,
      author: fields.author,
      summary: fields.summary,
      isbn: fields.isbn,
      genres: fields.genres,
    }
  }
}

// ─── BookInstance ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceFields {
  /// Must name an existing [`Book`] at write time.
  pub book:     Uuid,
  pub imprint:  String,
  pub status:   Status,
  pub due_back: Option<NaiveDate>,
}

/// A physical copy of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
  pub id:       Uuid,
  pub book:     Uuid,
  pub imprint:  String,
  pub status:   Status,
  pub due_back: Option<NaiveDate>,
}

impl BookInstance {
  pub fn from_fields(id: Uuid, fields: InstanceFields) -> Self {
    Self {
      id,
      book: fields.book,
      imprint: fields.imprint,
      status: fields.status,
      due_back: fields.due_back,
    }
  }
}

// ─── Reference ───────────────────────────────────────────────────────────────

/// An id/label projection of a record, used to populate selectable form
/// fields (e.g. the author picker on the book form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
  pub id:    Uuid,
  pub label: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parse_is_exact() {
    assert_eq!(Status::parse("Loaned").unwrap(), Status::Loaned);
    assert!(Status::parse("loaned").is_err());
    assert!(Status::parse("Borrowed").is_err());
    assert!(Status::parse(" Loaned").is_err());
  }

  #[test]
  fn status_string_forms_match_literals() {
    assert_eq!(Status::Maintenance.as_str(), "Maintenance");
    assert_eq!(Status::Reserved.to_string(), "Reserved");
    assert_eq!(
      serde_json::to_string(&Status::Available).unwrap(),
      "\"Available\""
    );
  }

  #[test]
  fn kind_segments() {
    assert_eq!(EntityKind::BookInstance.to_string(), "bookinstance");
    assert_eq!(EntityKind::Author.collection(), "authors");
  }
}
