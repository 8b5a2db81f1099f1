//! Encoding and decoding helpers between catalog records and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `yyyy-mm-dd` strings. UUIDs are stored as
//! hyphenated lowercase strings. Status is stored as its enum literal.

use chrono::NaiveDate;
use locallib_core::model::{Author, Book, BookInstance, Genre, Status};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(s: Status) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<Status> { Ok(Status::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `authors` row.
pub struct RawAuthor {
  pub author_id:     String,
  pub first_name:    String,
  pub family_name:   String,
  pub date_of_birth: Option<String>,
  pub date_of_death: Option<String>,
}

impl RawAuthor {
  pub const COLUMNS: &'static str =
    "author_id, first_name, family_name, date_of_birth, date_of_death";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      author_id:     row.get(0)?,
      first_name:    row.get(1)?,
      family_name:   row.get(2)?,
      date_of_birth: row.get(3)?,
      date_of_death: row.get(4)?,
    })
  }

  pub fn into_author(self) -> Result<Author> {
    Ok(Author {
      id:            decode_uuid(&self.author_id)?,
      first_name:    self.first_name,
      family_name:   self.family_name,
      date_of_birth: decode_opt_date(self.date_of_birth)?,
      date_of_death: decode_opt_date(self.date_of_death)?,
    })
  }
}

/// Raw strings read directly from a `genres` row.
pub struct RawGenre {
  pub genre_id: String,
  pub name:     String,
}

impl RawGenre {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { genre_id: row.get(0)?, name: row.get(1)? })
  }

  pub fn into_genre(self) -> Result<Genre> {
    Ok(Genre { id: decode_uuid(&self.genre_id)?, name: self.name })
  }
}

/// A `books` row plus its `book_genres` ids in position order.
pub struct RawBook {
  pub book_id:   String,
  pub title:     String,
  pub author_id: String,
  pub summary:   String,
  pub isbn:      String,
  pub genre_ids: Vec<String>,
}

impl RawBook {
  pub const COLUMNS: &'static str = "book_id, title, author_id, summary, isbn";

  /// Reads the `books` columns; `genre_ids` is filled in separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:   row.get(0)?,
      title:     row.get(1)?,
      author_id: row.get(2)?,
      summary:   row.get(3)?,
      isbn:      row.get(4)?,
      genre_ids: Vec::new(),
    })
  }

  pub fn into_book(self) -> Result<Book> {
    Ok(Book {
      id:      decode_uuid(&self.book_id)?,
      title:   self.title,
      author:  decode_uuid(&self.author_id)?,
      summary: self.summary,
      isbn:    self.isbn,
      genres:  self
        .genre_ids
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
    })
  }
}

/// Raw strings read directly from a `book_instances` row.
pub struct RawInstance {
  pub instance_id: String,
  pub book_id:     String,
  pub imprint:     String,
  pub status:      String,
  pub due_back:    Option<String>,
}

impl RawInstance {
  pub const COLUMNS: &'static str = "instance_id, book_id, imprint, status, due_back";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      instance_id: row.get(0)?,
      book_id:     row.get(1)?,
      imprint:     row.get(2)?,
      status:      row.get(3)?,
      due_back:    row.get(4)?,
    })
  }

  pub fn into_instance(self) -> Result<BookInstance> {
    Ok(BookInstance {
      id:       decode_uuid(&self.instance_id)?,
      book:     decode_uuid(&self.book_id)?,
      imprint:  self.imprint,
      status:   decode_status(&self.status)?,
      due_back: decode_opt_date(self.due_back)?,
    })
  }
}
