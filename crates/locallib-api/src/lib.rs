//! JSON HTTP API for the LocalLib catalog.
//!
//! Exposes an axum [`Router`] over a [`Catalog`] backed by any
//! [`CatalogStore`]. Successful writes answer `303 See Other` with the
//! record's URL in `Location`; failures are mapped by [`ApiError`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = locallib_api::api_router(Catalog::new(Arc::new(store)));
//! ```

pub mod authors;
pub mod books;
pub mod error;
pub mod genres;
pub mod instances;

use axum::{Json, Router, extract::State, routing::get};
use locallib_core::{
  catalog::{Catalog, Summary},
  store::CatalogStore,
};

pub use error::ApiError;

/// Build the `/catalog` router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(catalog: Catalog<S>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    .route("/catalog", get(summary::<S>))
    // Authors
    .route("/catalog/authors", get(authors::list::<S>))
    .route(
      "/catalog/author/create",
      get(authors::create_form::<S>).post(authors::create::<S>),
    )
    .route("/catalog/author/{id}", get(authors::detail::<S>))
    .route(
      "/catalog/author/{id}/update",
      get(authors::update_form::<S>).post(authors::update::<S>),
    )
    .route(
      "/catalog/author/{id}/delete",
      get(authors::delete_form::<S>).post(authors::delete::<S>),
    )
    // Genres
    .route("/catalog/genres", get(genres::list::<S>))
    .route(
      "/catalog/genre/create",
      get(genres::create_form::<S>).post(genres::create::<S>),
    )
    .route("/catalog/genre/{id}", get(genres::detail::<S>))
    .route(
      "/catalog/genre/{id}/update",
      get(genres::update_form::<S>).post(genres::update::<S>),
    )
    .route(
      "/catalog/genre/{id}/delete",
      get(genres::delete_form::<S>).post(genres::delete::<S>),
    )
    // Books
    .route("/catalog/books", get(books::list::<S>))
    .route(
      "/catalog/book/create",
      get(books::create_form::<S>).post(books::create::<S>),
    )
    .route("/catalog/book/{id}", get(books::detail::<S>))
    .route(
      "/catalog/book/{id}/update",
      get(books::update_form::<S>).post(books::update::<S>),
    )
    .route(
      "/catalog/book/{id}/delete",
      get(books::delete_form::<S>).post(books::delete::<S>),
    )
    // Book instances
    .route("/catalog/bookinstances", get(instances::list::<S>))
    .route(
      "/catalog/bookinstance/create",
      get(instances::create_form::<S>).post(instances::create::<S>),
    )
    .route("/catalog/bookinstance/{id}", get(instances::detail::<S>))
    .route(
      "/catalog/bookinstance/{id}/update",
      get(instances::update_form::<S>).post(instances::update::<S>),
    )
    .route(
      "/catalog/bookinstance/{id}/delete",
      get(instances::delete_form::<S>).post(instances::delete::<S>),
    )
    .with_state(catalog)
}

/// `GET /catalog`: record counts for the home page.
pub async fn summary<S: CatalogStore>(
  State(catalog): State<Catalog<S>>,
) -> Result<Json<Summary>, ApiError> {
  Ok(Json(catalog.summary().await?))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use locallib_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_catalog() -> Catalog<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Catalog::new(Arc::new(store))
  }

  async fn get_raw(catalog: &Catalog<SqliteStore>, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    api_router(catalog.clone()).oneshot(req).await.unwrap()
  }

  async fn post_json(catalog: &Catalog<SqliteStore>, uri: &str, body: Value) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    api_router(catalog.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn location(resp: &Response) -> String {
    resp
      .headers()
      .get(header::LOCATION)
      .expect("Location header")
      .to_str()
      .unwrap()
      .to_owned()
  }

  /// Create an author through the API and return its canonical URL.
  async fn create_author(catalog: &Catalog<SqliteStore>) -> String {
    let resp = post_json(
      catalog,
      "/catalog/author/create",
      json!({
        "first_name": "John",
        "family_name": "Tolkien",
        "date_of_birth": "1892-01-03",
        "date_of_death": "1973-09-02",
      }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    location(&resp)
  }

  fn id_of(url: &str) -> String { url.rsplit('/').next().unwrap().to_owned() }

  // ── Summary ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn summary_of_empty_catalog_is_all_zero() {
    let catalog = make_catalog().await;
    let resp = get_raw(&catalog, "/catalog").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await,
      json!({
        "books": 0,
        "instances": 0,
        "instances_available": 0,
        "authors": 0,
        "genres": 0,
      })
    );
  }

  // ── Authors ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_author_redirects_to_detail() {
    let catalog = make_catalog().await;
    let url = create_author(&catalog).await;
    assert!(url.starts_with("/catalog/author/"), "location: {url}");

    let resp = get_raw(&catalog, &url).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["author"]["name"], "Tolkien, John");
    assert_eq!(body["author"]["lifespan"], "Jan 3, 1892 - Sep 2, 1973");
    assert_eq!(body["author"]["date_of_birth_datepicker"], "1892-01-03");
    assert_eq!(body["books"], json!([]));
  }

  #[tokio::test]
  async fn invalid_author_returns_422_with_echo() {
    let catalog = make_catalog().await;
    let resp = post_json(
      &catalog,
      "/catalog/author/create",
      json!({ "first_name": "Jane", "family_name": "" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(resp).await;
    assert_eq!(body["form"]["first_name"], "Jane");
    assert_eq!(body["errors"][0]["field"], "family_name");
    assert_eq!(body["errors"][0]["message"], "Family name must be specified.");
  }

  #[tokio::test]
  async fn null_dates_are_treated_as_blank() {
    let catalog = make_catalog().await;
    let resp = post_json(
      &catalog,
      "/catalog/author/create",
      json!({
        "first_name": "Jane",
        "family_name": "Austen",
        "date_of_birth": null,
        "date_of_death": null,
      }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_json(get_raw(&catalog, &location(&resp)).await).await;
    assert_eq!(body["author"]["name"], "Austen, Jane");
    assert_eq!(body["author"]["date_of_birth_datepicker"], Value::Null);
  }

  #[tokio::test]
  async fn unknown_author_is_404() {
    let catalog = make_catalog().await;
    let resp = get_raw(&catalog, &format!("/catalog/author/{}", Uuid::new_v4())).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_form_of_missing_record_redirects_to_list() {
    let catalog = make_catalog().await;
    let resp = get_raw(&catalog, &format!("/catalog/author/{}/delete", Uuid::new_v4())).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/catalog/authors");
  }

  #[tokio::test]
  async fn author_with_books_cannot_be_deleted() {
    let catalog = make_catalog().await;
    let author_url = create_author(&catalog).await;
    let author_id = id_of(&author_url);

    let resp = post_json(
      &catalog,
      "/catalog/book/create",
      json!({ "title": "The Hobbit", "author": author_id }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let book_url = location(&resp);

    let resp = post_json(&catalog, &format!("{author_url}/delete"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["dependents"]["kind"], "books");
    assert_eq!(body["dependents"]["records"][0]["title"], "The Hobbit");

    let resp = post_json(&catalog, &format!("{book_url}/delete"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/catalog/books");

    let resp = post_json(&catalog, &format!("{author_url}/delete"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/catalog/authors");
    assert_eq!(get_raw(&catalog, &author_url).await.status(), StatusCode::NOT_FOUND);
  }

  // ── Genres ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn duplicate_genre_redirects_to_existing() {
    let catalog = make_catalog().await;
    let first = post_json(&catalog, "/catalog/genre/create", json!({ "name": "Fantasy" })).await;
    let second = post_json(&catalog, "/catalog/genre/create", json!({ "name": "FANTASY" })).await;
    assert_eq!(location(&first), location(&second));

    let resp = get_raw(&catalog, "/catalog/genres").await;
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn update_missing_genre_is_404() {
    let catalog = make_catalog().await;
    let resp = post_json(
      &catalog,
      &format!("/catalog/genre/{}/update", Uuid::new_v4()),
      json!({ "name": "Poetry" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Books ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn book_create_form_offers_authors_and_genres() {
    let catalog = make_catalog().await;
    create_author(&catalog).await;
    post_json(&catalog, "/catalog/genre/create", json!({ "name": "Fantasy" })).await;

    let resp = get_raw(&catalog, "/catalog/book/create").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["choices"]["authors"][0]["label"], "Tolkien, John");
    assert_eq!(body["choices"]["genres"][0]["label"], "Fantasy");
  }

  // ── Book instances ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn instance_status_is_checked_and_stored_verbatim() {
    let catalog = make_catalog().await;
    let author_id = id_of(&create_author(&catalog).await);
    let resp = post_json(
      &catalog,
      "/catalog/book/create",
      json!({ "title": "The Hobbit", "author": author_id }),
    )
    .await;
    let book_id = id_of(&location(&resp));

    let resp = post_json(
      &catalog,
      "/catalog/bookinstance/create",
      json!({ "book": book_id, "imprint": "Allen & Unwin", "status": "Borrowed" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "status");
    assert_eq!(
      body["choices"]["statuses"],
      json!(["Maintenance", "Available", "Loaned", "Reserved"])
    );

    let resp = post_json(
      &catalog,
      "/catalog/bookinstance/create",
      json!({
        "book": book_id,
        "imprint": "Allen & Unwin",
        "status": "Loaned",
        "due_back": "2024-03-09",
      }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = get_raw(&catalog, &location(&resp)).await;
    let body = body_json(resp).await;
    assert_eq!(body["instance"]["status"], "Loaned");
    assert_eq!(body["instance"]["due_back_datepicker"], "2024-03-09");
    assert_eq!(body["instance"]["due_back_formatted"], "Mar 9, 2024");
    assert_eq!(body["book"]["title"], "The Hobbit");

    let resp = get_raw(&catalog, "/catalog").await;
    let body = body_json(resp).await;
    assert_eq!(body["instances"], 1);
    assert_eq!(body["instances_available"], 0);
  }
}
