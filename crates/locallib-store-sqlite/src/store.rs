//! [`SqliteStore`]: the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use locallib_core::{
  derived,
  model::{
    Author, AuthorFields, Book, BookFields, BookInstance, EntityKind, Genre,
    GenreFields, InstanceFields, Reference, Status,
  },
  store::{BookFilter, CatalogStore, InstanceFilter},
};

use crate::{
  encode::{
    decode_uuid, encode_date, encode_status, encode_uuid, RawAuthor, RawBook,
    RawGenre, RawInstance,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a two-column `(id, label)` projection query.
  async fn project(&self, sql: &'static str) -> Result<Vec<Reference>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, label)| -> Result<Reference> {
        Ok(Reference { id: decode_uuid(&id)?, label })
      })
      .collect()
  }

  /// Delete the row of `table` whose `column` equals `id`.
  async fn delete_row(&self, table: &'static str, column: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE {column} = ?1"),
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

/// Genre ids linked to `book_id`, in submission order.
fn load_genre_ids(conn: &rusqlite::Connection, book_id: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare_cached(
    "SELECT genre_id FROM book_genres WHERE book_id = ?1 ORDER BY position",
  )?;
  let ids = stmt
    .query_map(rusqlite::params![book_id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(ids)
}

fn insert_genre_links(
  conn:      &rusqlite::Connection,
  book_id:   &str,
  genre_ids: &[String],
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "INSERT INTO book_genres (book_id, genre_id, position) VALUES (?1, ?2, ?3)",
  )?;
  for (position, genre_id) in genre_ids.iter().enumerate() {
    stmt.execute(rusqlite::params![book_id, genre_id, position as i64])?;
  }
  Ok(())
}

fn table_of(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Author => "authors",
    EntityKind::Genre => "genres",
    EntityKind::Book => "books",
    EntityKind::BookInstance => "book_instances",
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = crate::Error;

  // ── Authors ───────────────────────────────────────────────────────────────

  async fn create_author(&self, fields: AuthorFields) -> Result<Author> {
    let author = Author::from_fields(Uuid::new_v4(), fields);

    let id_str      = encode_uuid(author.id);
    let first_name  = author.first_name.clone();
    let family_name = author.family_name.clone();
    let born        = author.date_of_birth.map(encode_date);
    let died        = author.date_of_death.map(encode_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO authors (author_id, first_name, family_name, date_of_birth, date_of_death)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, first_name, family_name, born, died],
        )?;
        Ok(())
      })
      .await?;

    Ok(author)
  }

  async fn get_author(&self, id: Uuid) -> Result<Option<Author>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAuthor> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM authors WHERE author_id = ?1", RawAuthor::COLUMNS),
            rusqlite::params![id_str],
            RawAuthor::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAuthor::into_author).transpose()
  }

  async fn list_authors(&self) -> Result<Vec<Author>> {
    let raws: Vec<RawAuthor> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM authors
           ORDER BY family_name COLLATE NOCASE, first_name COLLATE NOCASE",
          RawAuthor::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawAuthor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuthor::into_author).collect()
  }

  async fn update_author(&self, id: Uuid, fields: AuthorFields) -> Result<Option<Author>> {
    let id_str      = encode_uuid(id);
    let first_name  = fields.first_name.clone();
    let family_name = fields.family_name.clone();
    let born        = fields.date_of_birth.map(encode_date);
    let died        = fields.date_of_death.map(encode_date);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE authors
           SET first_name = ?2, family_name = ?3, date_of_birth = ?4, date_of_death = ?5
           WHERE author_id = ?1",
          rusqlite::params![id_str, first_name, family_name, born, died],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| Author::from_fields(id, fields)))
  }

  async fn delete_author(&self, id: Uuid) -> Result<bool> {
    self.delete_row("authors", "author_id", id).await
  }

  // ── Genres ────────────────────────────────────────────────────────────────

  async fn create_genre(&self, fields: GenreFields) -> Result<Genre> {
    let genre = Genre::from_fields(Uuid::new_v4(), fields);

    let id_str = encode_uuid(genre.id);
    let name   = genre.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO genres (genre_id, name) VALUES (?1, ?2)",
          rusqlite::params![id_str, name],
        )?;
        Ok(())
      })
      .await?;

    Ok(genre)
  }

  async fn get_genre(&self, id: Uuid) -> Result<Option<Genre>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGenre> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT genre_id, name FROM genres WHERE genre_id = ?1",
            rusqlite::params![id_str],
            RawGenre::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGenre::into_genre).transpose()
  }

  async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
    let name = name.to_owned();

    let raw: Option<RawGenre> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT genre_id, name FROM genres
             WHERE name = ?1 COLLATE NOCASE
             ORDER BY rowid LIMIT 1",
            rusqlite::params![name],
            RawGenre::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGenre::into_genre).transpose()
  }

  async fn list_genres(&self) -> Result<Vec<Genre>> {
    let raws: Vec<RawGenre> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT genre_id, name FROM genres ORDER BY name COLLATE NOCASE")?;
        let rows = stmt
          .query_map([], RawGenre::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGenre::into_genre).collect()
  }

  async fn update_genre(&self, id: Uuid, fields: GenreFields) -> Result<Option<Genre>> {
    let id_str = encode_uuid(id);
    let name   = fields.name.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE genres SET name = ?2 WHERE genre_id = ?1",
          rusqlite::params![id_str, name],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| Genre::from_fields(id, fields)))
  }

  async fn delete_genre(&self, id: Uuid) -> Result<bool> {
    self.delete_row("genres", "genre_id", id).await
  }

  // ── Books ─────────────────────────────────────────────────────────────────

  async fn create_book(&self, fields: BookFields) -> Result<Book> {
    let book = Book::from_fields(Uuid::new_v4(), fields);

    let id_str     = encode_uuid(book.id);
    let title      = book.title.clone();
    let author_str = encode_uuid(book.author);
    let summary    = book.summary.clone();
    let isbn       = book.isbn.clone();
    let genre_ids: Vec<String> = book.genres.iter().copied().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO books (book_id, title, author_id, summary, isbn)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, title, author_str, summary, isbn],
        )?;
        insert_genre_links(&tx, &id_str, &genre_ids)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(book)
  }

  async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {} FROM books WHERE book_id = ?1", RawBook::COLUMNS),
            rusqlite::params![id_str],
            RawBook::from_row,
          )
          .optional()?;
        let Some(mut raw) = raw else { return Ok(None) };
        raw.genre_ids = load_genre_ids(conn, &raw.book_id)?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn find_books(&self, filter: BookFilter) -> Result<Vec<Book>> {
    let author_str = filter.author.map(encode_uuid);
    let genre_str  = filter.genre.map(encode_uuid);

    let raws: Vec<RawBook> = self
      .conn
      .call(move |conn| {
        let mut rows = {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM books b
             WHERE (?1 IS NULL OR b.author_id = ?1)
               AND (?2 IS NULL OR EXISTS (
                     SELECT 1 FROM book_genres bg
                     WHERE bg.book_id = b.book_id AND bg.genre_id = ?2))
             ORDER BY b.title COLLATE NOCASE, b.book_id",
            RawBook::COLUMNS
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![author_str, genre_str], RawBook::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };
        for raw in &mut rows {
          raw.genre_ids = load_genre_ids(conn, &raw.book_id)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }

  async fn update_book(&self, id: Uuid, fields: BookFields) -> Result<Option<Book>> {
    let id_str     = encode_uuid(id);
    let title      = fields.title.clone();
    let author_str = encode_uuid(fields.author);
    let summary    = fields.summary.clone();
    let isbn       = fields.isbn.clone();
    let genre_ids: Vec<String> = fields.genres.iter().copied().map(encode_uuid).collect();

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE books SET title = ?2, author_id = ?3, summary = ?4, isbn = ?5
           WHERE book_id = ?1",
          rusqlite::params![id_str, title, author_str, summary, isbn],
        )?;
        if changed == 0 {
          return Ok(false);
        }
        tx.execute(
          "DELETE FROM book_genres WHERE book_id = ?1",
          rusqlite::params![id_str],
        )?;
        insert_genre_links(&tx, &id_str, &genre_ids)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(updated.then(|| Book::from_fields(id, fields)))
  }

  async fn delete_book(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM book_genres WHERE book_id = ?1",
          rusqlite::params![id_str],
        )?;
        let changed = tx.execute(
          "DELETE FROM books WHERE book_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Book instances ────────────────────────────────────────────────────────

  async fn create_instance(&self, fields: InstanceFields) -> Result<BookInstance> {
    let instance = BookInstance::from_fields(Uuid::new_v4(), fields);

    let id_str   = encode_uuid(instance.id);
    let book_str = encode_uuid(instance.book);
    let imprint  = instance.imprint.clone();
    let status   = encode_status(instance.status);
    let due_back = instance.due_back.map(encode_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO book_instances (instance_id, book_id, imprint, status, due_back)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, book_str, imprint, status, due_back],
        )?;
        Ok(())
      })
      .await?;

    Ok(instance)
  }

  async fn get_instance(&self, id: Uuid) -> Result<Option<BookInstance>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawInstance> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM book_instances WHERE instance_id = ?1",
              RawInstance::COLUMNS
            ),
            rusqlite::params![id_str],
            RawInstance::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawInstance::into_instance).transpose()
  }

  async fn find_instances(&self, filter: InstanceFilter) -> Result<Vec<BookInstance>> {
    let book_str = filter.book.map(encode_uuid);
    let status   = filter.status.map(encode_status);

    let raws: Vec<RawInstance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM book_instances
           WHERE (?1 IS NULL OR book_id = ?1)
             AND (?2 IS NULL OR status = ?2)
           ORDER BY imprint COLLATE NOCASE, instance_id",
          RawInstance::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![book_str, status], RawInstance::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInstance::into_instance).collect()
  }

  async fn update_instance(
    &self,
    id:     Uuid,
    fields: InstanceFields,
  ) -> Result<Option<BookInstance>> {
    let id_str   = encode_uuid(id);
    let book_str = encode_uuid(fields.book);
    let imprint  = fields.imprint.clone();
    let status   = encode_status(fields.status);
    let due_back = fields.due_back.map(encode_date);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE book_instances
           SET book_id = ?2, imprint = ?3, status = ?4, due_back = ?5
           WHERE instance_id = ?1",
          rusqlite::params![id_str, book_str, imprint, status, due_back],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| BookInstance::from_fields(id, fields)))
  }

  async fn delete_instance(&self, id: Uuid) -> Result<bool> {
    self.delete_row("book_instances", "instance_id", id).await
  }

  // ── Projections ───────────────────────────────────────────────────────────

  async fn references(&self, kind: EntityKind) -> Result<Vec<Reference>> {
    let sql = match kind {
      EntityKind::Author => {
        let mut refs: Vec<Reference> = self
          .list_authors()
          .await?
          .iter()
          .map(|a| Reference { id: a.id, label: derived::full_name(a) })
          .collect();
        refs.sort_by_cached_key(|r| r.label.to_lowercase());
        return Ok(refs);
      }
      EntityKind::Genre => {
        "SELECT genre_id, name FROM genres ORDER BY name COLLATE NOCASE"
      }
      EntityKind::Book => {
        "SELECT book_id, title FROM books ORDER BY title COLLATE NOCASE"
      }
      EntityKind::BookInstance => {
        "SELECT instance_id, imprint FROM book_instances ORDER BY imprint COLLATE NOCASE"
      }
    };
    self.project(sql).await
  }

  async fn count(&self, kind: EntityKind) -> Result<u64> {
    let table = table_of(kind);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
      })
      .await?;

    Ok(n as u64)
  }

  async fn count_instances_with_status(&self, status: Status) -> Result<u64> {
    let status = encode_status(status);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM book_instances WHERE status = ?1",
          rusqlite::params![status],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(n as u64)
  }
}
