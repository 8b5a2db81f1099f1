//! Field validation and sanitization for inbound form data.
//!
//! Every form field runs through the same pipeline, in order:
//!
//! 1. trim surrounding whitespace
//! 2. presence / length checks
//! 3. type or format checks (ISO-8601 dates, record ids)
//! 4. enumerated-value membership
//! 5. HTML-escape for safe downstream rendering
//!
//! A field stops at its first failing check, but all fields are always
//! visited, so a single pass reports every offending field. Whether or not the
//! form is valid, the sanitized form is kept so the caller can redisplay it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::model::{
  Author, AuthorFields, Book, BookFields, BookInstance, Genre, GenreFields,
  InstanceFields, Status,
};

/// Maximum length, in characters, of an author's first or family name.
pub const MAX_NAME_CHARS: usize = 100;

// ─── Outcome types ───────────────────────────────────────────────────────────

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
  /// The form field the message refers to, e.g. `"family_name"`.
  pub field:   &'static str,
  pub message: String,
}

/// A rejected submission: the sanitized form plus every violation found, in
/// field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invalid<F> {
  pub form:       F,
  pub violations: Vec<Violation>,
}

impl<F> Invalid<F> {
  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.violations.iter().map(|v| v.field)
  }
}

// ─── Forms ───────────────────────────────────────────────────────────────────

/// Untrusted author input. Absent and `null` fields deserialize as empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorForm {
  #[serde(deserialize_with = "null_as_empty")]
  pub first_name:    String,
  #[serde(deserialize_with = "null_as_empty")]
  pub family_name:   String,
  #[serde(deserialize_with = "null_as_empty")]
  pub date_of_birth: String,
  #[serde(deserialize_with = "null_as_empty")]
  pub date_of_death: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreForm {
  #[serde(deserialize_with = "null_as_empty")]
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookForm {
  #[serde(deserialize_with = "null_as_empty")]
  pub title:   String,
  #[serde(deserialize_with = "null_as_empty")]
  pub author:  String,
  #[serde(deserialize_with = "null_as_empty")]
  pub summary: String,
  #[serde(deserialize_with = "null_as_empty")]
  pub isbn:    String,
  #[serde(deserialize_with = "null_as_empty")]
  pub genres:  Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceForm {
  #[serde(deserialize_with = "null_as_empty")]
  pub book:     String,
  #[serde(deserialize_with = "null_as_empty")]
  pub imprint:  String,
  #[serde(deserialize_with = "null_as_empty")]
  pub status:   String,
  #[serde(deserialize_with = "null_as_empty")]
  pub due_back: String,
}

/// Treat an explicit `null` like a missing field.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Prefill ─────────────────────────────────────────────────────────────────

// Stored text is already escaped; prefilled forms carry the unescaped text so
// that resubmitting an unchanged form stores the same value again.

impl From<&Author> for AuthorForm {
  fn from(a: &Author) -> Self {
    Self {
      first_name:    unescape_html(&a.first_name),
      family_name:   unescape_html(&a.family_name),
      date_of_birth: a.date_of_birth.map(iso_date).unwrap_or_default(),
      date_of_death: a.date_of_death.map(iso_date).unwrap_or_default(),
    }
  }
}

impl From<&Genre> for GenreForm {
  fn from(g: &Genre) -> Self { Self { name: unescape_html(&g.name) } }
}

impl From<&Book> for BookForm {
  fn from(b: &Book) -> Self {
    Self {
      title:   unescape_html(&b.title),
      author:  b.author.to_string(),
      summary: unescape_html(&b.summary),
      isbn:    unescape_html(&b.isbn),
      genres:  b.genres.iter().map(Uuid::to_string).collect(),
    }
  }
}

impl From<&BookInstance> for InstanceForm {
  fn from(i: &BookInstance) -> Self {
    Self {
      book:     i.book.to_string(),
      imprint:  unescape_html(&i.imprint),
      status:   i.status.as_str().to_owned(),
      due_back: i.due_back.map(iso_date).unwrap_or_default(),
    }
  }
}

fn iso_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── Field pipeline ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Checker {
  violations: Vec<Violation>,
}

impl Checker {
  /// Start the pipeline for one field; trimming happens here.
  fn field<'c>(&'c mut self, name: &'static str, raw: &str) -> Field<'c> {
    Field {
      name,
      value: raw.trim().to_owned(),
      failed: false,
      checker: self,
    }
  }

  fn reject(&mut self, field: &'static str, message: impl Into<String>) {
    self.violations.push(Violation { field, message: message.into() });
  }
}

struct Field<'c> {
  name:    &'static str,
  value:   String,
  failed:  bool,
  checker: &'c mut Checker,
}

impl Field<'_> {
  fn fail(&mut self, message: &str) {
    if !self.failed {
      self.failed = true;
      self.checker.reject(self.name, message);
    }
  }

  fn required(mut self, message: &str) -> Self {
    if self.value.is_empty() {
      self.fail(message);
    }
    self
  }

  fn max_chars(mut self, max: usize, message: &str) -> Self {
    if self.value.chars().count() > max {
      self.fail(message);
    }
    self
  }

  /// Finish a free-text field.
  fn text(self) -> String { escape_html(&self.value) }

  /// Finish an optional ISO-8601 date. Empty input means "no date".
  fn date(mut self, message: &str) -> (String, Option<NaiveDate>) {
    let parsed = if self.failed || self.value.is_empty() {
      None
    } else {
      let parsed = parse_iso_date(&self.value);
      if parsed.is_none() {
        self.fail(message);
      }
      parsed
    };
    (self.text(), parsed)
  }

  /// Finish a record-id reference.
  fn id(mut self, message: &str) -> (String, Option<Uuid>) {
    let parsed = if self.failed || self.value.is_empty() {
      None
    } else {
      let parsed = Uuid::parse_str(&self.value).ok();
      if parsed.is_none() {
        self.fail(message);
      }
      parsed
    };
    (self.text(), parsed)
  }

  /// Finish a field that must be exactly one of the [`Status`] literals.
  fn status(mut self, message: &str) -> (String, Option<Status>) {
    let parsed = if self.failed {
      None
    } else {
      let parsed = Status::parse(&self.value).ok();
      if parsed.is_none() {
        self.fail(message);
      }
      parsed
    };
    (self.text(), parsed)
  }
}

// ─── Entity rules ────────────────────────────────────────────────────────────

pub fn validate_author(form: &AuthorForm) -> Result<AuthorFields, Invalid<AuthorForm>> {
  let mut check = Checker::default();

  let first_name = check
    .field("first_name", &form.first_name)
    .required("First name must be specified.")
    .max_chars(MAX_NAME_CHARS, "First name must be at most 100 characters.")
    .text();
  let family_name = check
    .field("family_name", &form.family_name)
    .required("Family name must be specified.")
    .max_chars(MAX_NAME_CHARS, "Family name must be at most 100 characters.")
    .text();
  let (date_of_birth_text, date_of_birth) = check
    .field("date_of_birth", &form.date_of_birth)
    .date("Invalid date of birth.");
  let (date_of_death_text, date_of_death) = check
    .field("date_of_death", &form.date_of_death)
    .date("Invalid date of death.");

  if let (Some(born), Some(died)) = (date_of_birth, date_of_death)
    && died < born
  {
    check.reject(
      "date_of_death",
      "Date of death must not be before date of birth.",
    );
  }

  if check.violations.is_empty() {
    Ok(AuthorFields { first_name, family_name, date_of_birth, date_of_death })
  } else {
    Err(Invalid {
      form:       AuthorForm {
        first_name,
        family_name,
        date_of_birth: date_of_birth_text,
        date_of_death: date_of_death_text,
      },
      violations: check.violations,
    })
  }
}

pub fn validate_genre(form: &GenreForm) -> Result<GenreFields, Invalid<GenreForm>> {
  let mut check = Checker::default();

  let name = check
    .field("name", &form.name)
    .required("Genre name must be specified.")
    .max_chars(MAX_NAME_CHARS, "Genre name must be at most 100 characters.")
    .text();

  if check.violations.is_empty() {
    Ok(GenreFields { name })
  } else {
    Err(Invalid { form: GenreForm { name }, violations: check.violations })
  }
}

pub fn validate_book(form: &BookForm) -> Result<BookFields, Invalid<BookForm>> {
  let mut check = Checker::default();

  let title = check
    .field("title", &form.title)
    .required("Title must be specified.")
    .text();
  let (author_text, author) = check
    .field("author", &form.author)
    .required("Author must be specified.")
    .id("Author must be a valid author id.");
  let summary = check.field("summary", &form.summary).text();
  let isbn = check.field("isbn", &form.isbn).text();

  let mut genre_texts = Vec::with_capacity(form.genres.len());
  let mut genres = Vec::with_capacity(form.genres.len());
  for raw in form.genres.iter().filter(|g| !g.trim().is_empty()) {
    let (text, id) = check.field("genres", raw).id("Invalid genre id.");
    if let Some(id) = id
      && !genres.contains(&id)
    {
      genres.push(id);
    }
    genre_texts.push(text);
  }

  let form = BookForm {
    title,
    author: author_text,
    summary,
    isbn,
    genres: genre_texts,
  };

  match author {
    Some(author) if check.violations.is_empty() => Ok(BookFields {
      title: form.title,
      author,
      summary: form.summary,
      isbn: form.isbn,
      genres,
    }),
    _ => Err(Invalid { form, violations: check.violations }),
  }
}

pub fn validate_instance(
  form: &InstanceForm,
) -> Result<InstanceFields, Invalid<InstanceForm>> {
  let mut check = Checker::default();

  let (book_text, book) = check
    .field("book", &form.book)
    .required("Book must be specified.")
    .id("Book must be a valid book id.");
  let imprint = check
    .field("imprint", &form.imprint)
    .required("Imprint must be specified.")
    .text();
  let (status_text, status) = check
    .field("status", &form.status)
    .required("Status must be specified.")
    .status("Invalid status value.");
  let (due_back_text, due_back) = check
    .field("due_back", &form.due_back)
    .date("Invalid date.");

  let form = InstanceForm {
    book: book_text,
    imprint,
    status: status_text,
    due_back: due_back_text,
  };

  match (book, status) {
    (Some(book), Some(status)) if check.violations.is_empty() => {
      Ok(InstanceFields { book, imprint: form.imprint, status, due_back })
    }
    _ => Err(Invalid { form, violations: check.violations }),
  }
}

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Parse an ISO-8601 calendar date. Date-times are accepted and truncated to
/// the calendar date they name.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(d);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.date_naive());
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
    .ok()
    .map(|dt| dt.date())
}

/// Replace the characters significant to HTML with entities.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      '/' => out.push_str("&#x2F;"),
      '\\' => out.push_str("&#x5C;"),
      '`' => out.push_str("&#96;"),
      other => out.push(other),
    }
  }
  out
}

/// Inverse of [`escape_html`].
pub fn unescape_html(s: &str) -> String {
  s.replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#x27;", "'")
    .replace("&#x2F;", "/")
    .replace("&#x5C;", "\\")
    .replace("&#96;", "`")
    .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn author_form(first: &str, family: &str) -> AuthorForm {
    AuthorForm {
      first_name: first.into(),
      family_name: family.into(),
      ..Default::default()
    }
  }

  fn instance_form(status: &str) -> InstanceForm {
    InstanceForm {
      book:     Uuid::new_v4().to_string(),
      imprint:  "Allen & Unwin, 1937".into(),
      status:   status.into(),
      due_back: String::new(),
    }
  }

  // ── Author ──────────────────────────────────────────────────────────────

  #[test]
  fn author_fields_are_trimmed() {
    let fields = validate_author(&author_form("  J.R.R. ", "\tTolkien\n")).unwrap();
    assert_eq!(fields.first_name, "J.R.R.");
    assert_eq!(fields.family_name, "Tolkien");
    assert_eq!(fields.date_of_birth, None);
    assert_eq!(fields.date_of_death, None);
  }

  #[test]
  fn empty_family_name_only_flags_family_name() {
    let invalid = validate_author(&author_form("J.R.R.", "   ")).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["family_name"]);
    assert_eq!(invalid.form.first_name, "J.R.R.");
    assert_eq!(invalid.form.family_name, "");
  }

  #[test]
  fn all_violations_are_collected() {
    let mut form = author_form("", "");
    form.date_of_birth = "not a date".into();
    let invalid = validate_author(&form).unwrap_err();
    assert_eq!(
      invalid.fields().collect::<Vec<_>>(),
      ["first_name", "family_name", "date_of_birth"]
    );
  }

  #[test]
  fn names_longer_than_limit_are_rejected() {
    let long = "x".repeat(MAX_NAME_CHARS + 1);
    let invalid = validate_author(&author_form(&long, "Tolkien")).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["first_name"]);

    let exact = "é".repeat(MAX_NAME_CHARS);
    assert!(validate_author(&author_form(&exact, "Tolkien")).is_ok());
  }

  #[test]
  fn author_dates_parse() {
    let mut form = author_form("John", "Tolkien");
    form.date_of_birth = "1892-01-03".into();
    form.date_of_death = "1973-09-02T00:00:00Z".into();
    let fields = validate_author(&form).unwrap();
    assert_eq!(fields.date_of_birth, NaiveDate::from_ymd_opt(1892, 1, 3));
    assert_eq!(fields.date_of_death, NaiveDate::from_ymd_opt(1973, 9, 2));
  }

  #[test]
  fn death_before_birth_is_rejected() {
    let mut form = author_form("John", "Tolkien");
    form.date_of_birth = "1973-09-02".into();
    form.date_of_death = "1892-01-03".into();
    let invalid = validate_author(&form).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["date_of_death"]);
  }

  #[test]
  fn markup_is_escaped_in_sanitized_output() {
    let fields = validate_author(&author_form("<b>Ann</b>", "O'Brien")).unwrap();
    assert_eq!(fields.first_name, "&lt;b&gt;Ann&lt;&#x2F;b&gt;");
    assert_eq!(fields.family_name, "O&#x27;Brien");
  }

  #[test]
  fn escape_round_trips() {
    let raw = r#"Tom & "Jerry" <'/\`>"#;
    assert_eq!(unescape_html(&escape_html(raw)), raw);
  }

  // ── Genre ───────────────────────────────────────────────────────────────

  #[test]
  fn genre_name_required() {
    let invalid = validate_genre(&GenreForm { name: "  ".into() }).unwrap_err();
    assert_eq!(invalid.violations[0].field, "name");
    assert_eq!(
      validate_genre(&GenreForm { name: " Fantasy ".into() }).unwrap().name,
      "Fantasy"
    );
  }

  // ── Book ────────────────────────────────────────────────────────────────

  #[test]
  fn book_requires_title_and_author() {
    let invalid = validate_book(&BookForm::default()).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["title", "author"]);
  }

  #[test]
  fn book_author_must_be_an_id() {
    let form = BookForm {
      title: "The Hobbit".into(),
      author: "tolkien".into(),
      ..Default::default()
    };
    let invalid = validate_book(&form).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["author"]);
    assert_eq!(invalid.form.title, "The Hobbit");
  }

  #[test]
  fn book_genres_are_deduplicated_and_blank_entries_skipped() {
    let genre = Uuid::new_v4();
    let form = BookForm {
      title:   "The Hobbit".into(),
      author:  Uuid::new_v4().to_string(),
      summary: String::new(),
      isbn:    "9780261102217".into(),
      genres:  vec![genre.to_string(), " ".into(), format!(" {genre} ")],
    };
    let fields = validate_book(&form).unwrap();
    assert_eq!(fields.genres, vec![genre]);
  }

  #[test]
  fn bad_genre_id_is_reported() {
    let form = BookForm {
      title:  "The Hobbit".into(),
      author: Uuid::new_v4().to_string(),
      genres: vec!["fantasy".into()],
      ..Default::default()
    };
    let invalid = validate_book(&form).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["genres"]);
  }

  // ── BookInstance ────────────────────────────────────────────────────────

  #[test]
  fn every_status_literal_is_accepted_after_trimming() {
    for (raw, expected) in [
      ("Maintenance", Status::Maintenance),
      (" Available", Status::Available),
      ("Loaned ", Status::Loaned),
      ("\tReserved\n", Status::Reserved),
    ] {
      assert_eq!(validate_instance(&instance_form(raw)).unwrap().status, expected);
    }
  }

  #[test]
  fn other_status_strings_are_rejected() {
    for raw in ["Borrowed", "loaned", "LOANED", "Loaned!", "Avail able"] {
      let invalid = validate_instance(&instance_form(raw)).unwrap_err();
      assert_eq!(invalid.fields().collect::<Vec<_>>(), ["status"], "{raw}");
      assert_eq!(invalid.violations[0].message, "Invalid status value.");
    }
  }

  #[test]
  fn missing_status_is_distinct_from_invalid_status() {
    let invalid = validate_instance(&instance_form("  ")).unwrap_err();
    assert_eq!(invalid.violations[0].field, "status");
    assert_eq!(invalid.violations[0].message, "Status must be specified.");
  }

  #[test]
  fn due_back_is_optional() {
    let fields = validate_instance(&instance_form("Available")).unwrap();
    assert_eq!(fields.due_back, None);
    assert_eq!(fields.imprint, "Allen &amp; Unwin, 1937");
  }

  #[test]
  fn due_back_must_be_iso_date() {
    let mut form = instance_form("Loaned");
    form.due_back = "next tuesday".into();
    let invalid = validate_instance(&form).unwrap_err();
    assert_eq!(invalid.fields().collect::<Vec<_>>(), ["due_back"]);
    assert_eq!(invalid.form.due_back, "next tuesday");

    form.due_back = "2026-11-01T09:30:00+02:00".into();
    assert_eq!(
      validate_instance(&form).unwrap().due_back,
      NaiveDate::from_ymd_opt(2026, 11, 1)
    );
  }

  #[test]
  fn null_fields_read_as_empty() {
    let form: AuthorForm = serde_json::from_str(
      r#"{"first_name":"Jane","family_name":"Austen","date_of_birth":null,"date_of_death":null}"#,
    )
    .unwrap();
    assert_eq!(form.date_of_birth, "");
    let fields = validate_author(&form).unwrap();
    assert_eq!(fields.date_of_birth, None);
    assert_eq!(fields.date_of_death, None);

    let form: BookForm =
      serde_json::from_str(r#"{"title":"Emma","summary":null,"genres":null}"#).unwrap();
    assert_eq!(form.summary, "");
    assert!(form.genres.is_empty());
  }
}
