//! Runtime wiring for the LocalLib server: configuration and the assembled
//! application router.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use locallib_core::{catalog::Catalog, store::CatalogStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LOCALLIB_*` environment variables. Missing keys take their defaults.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       3000,
      store_path: PathBuf::from("locallib.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The catalog API over `store`, with request tracing.
pub fn app<S>(store: S) -> Router
where
  S: CatalogStore + 'static,
{
  let catalog = Catalog::new(Arc::new(store));
  locallib_api::api_router(catalog).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use locallib_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn empty_sources_yield_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.address(), "127.0.0.1:3000");
  }

  #[test]
  fn file_values_override_defaults() {
    let toml = "port = 8080\nstore_path = \"/var/lib/locallib.db\"\n";
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/locallib.db"));
  }

  #[tokio::test]
  async fn app_serves_the_catalog() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let req = Request::builder().uri("/catalog").body(Body::empty()).unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
