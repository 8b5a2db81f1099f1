//! SQL schema for the LocalLib SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS authors (
    author_id     TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL CHECK (length(first_name) > 0),
    family_name   TEXT NOT NULL CHECK (length(family_name) > 0),
    date_of_birth TEXT,            -- yyyy-mm-dd or NULL
    date_of_death TEXT             -- yyyy-mm-dd or NULL
);

CREATE TABLE IF NOT EXISTS genres (
    genre_id TEXT PRIMARY KEY,
    name     TEXT NOT NULL CHECK (length(name) > 0)
);

CREATE TABLE IF NOT EXISTS books (
    book_id   TEXT PRIMARY KEY,
    title     TEXT NOT NULL CHECK (length(title) > 0),
    author_id TEXT NOT NULL REFERENCES authors(author_id),
    summary   TEXT NOT NULL DEFAULT '',
    isbn      TEXT NOT NULL DEFAULT ''
);

-- Genre set of a book; `position` keeps submission order.
CREATE TABLE IF NOT EXISTS book_genres (
    book_id  TEXT NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    genre_id TEXT NOT NULL REFERENCES genres(genre_id),
    position INTEGER NOT NULL,
    PRIMARY KEY (book_id, genre_id)
);

CREATE TABLE IF NOT EXISTS book_instances (
    instance_id TEXT PRIMARY KEY,
    book_id     TEXT NOT NULL REFERENCES books(book_id),
    imprint     TEXT NOT NULL CHECK (length(imprint) > 0),
    status      TEXT NOT NULL
                CHECK (status IN ('Maintenance', 'Available', 'Loaned', 'Reserved')),
    due_back    TEXT             -- yyyy-mm-dd or NULL
);

CREATE INDEX IF NOT EXISTS books_author_idx       ON books(author_id);
CREATE INDEX IF NOT EXISTS book_genres_genre_idx  ON book_genres(genre_id);
CREATE INDEX IF NOT EXISTS instances_book_idx     ON book_instances(book_id);
CREATE INDEX IF NOT EXISTS instances_status_idx   ON book_instances(status);

PRAGMA user_version = 1;
";
