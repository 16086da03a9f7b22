//! HTTP server assembly for the tank gauging API.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store
//! and serves [`router`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Json, Router,
  extract::State,
  http::StatusCode,
  routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tankgauge_core::{service::GaugingService, store::TankStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TANKGAUGE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("tankgauge.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// `GET /health` plus the API mounted under `/api`, with request tracing.
pub fn router<S>(service: Arc<GaugingService<S>>) -> Router
where
  S: TankStore + 'static,
{
  Router::new()
    .route("/health", get(health::<S>))
    .with_state(service.clone())
    .nest("/api", tankgauge_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}

/// `GET /health`: 200 while the store answers, 503 otherwise.
async fn health<S>(State(svc): State<Arc<GaugingService<S>>>) -> (StatusCode, Json<Value>)
where
  S: TankStore + 'static,
{
  let (status, health, database) = match svc.tanks().await {
    Ok(_) => (StatusCode::OK, "healthy", "connected"),
    Err(e) => {
      tracing::warn!(error = %e, "health check could not reach the store");
      (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    }
  };
  (
    status,
    Json(json!({
      "status":   health,
      "database": database,
      "version":  env!("CARGO_PKG_VERSION"),
    })),
  )
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
