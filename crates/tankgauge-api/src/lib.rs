//! JSON REST API for tank gauging.
//!
//! Exposes an axum [`Router`] backed by a [`GaugingService`] over any
//! [`TankStore`]. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tankgauge_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod gauging;
pub mod strapping;
pub mod tanks;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use tankgauge_core::{service::GaugingService, store::TankStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<GaugingService<S>>) -> Router<()>
where
  S: TankStore + 'static,
{
  Router::new()
    // Tanks
    .route("/tanks", get(tanks::list::<S>).post(tanks::create::<S>))
    .route("/tanks/{id}", get(tanks::get_one::<S>))
    .route("/tanks/{id}/volume", get(tanks::volume::<S>))
    // Strapping
    .route(
      "/tanks/{id}/strapping-table",
      get(strapping::get_table::<S>)
        .post(strapping::add_entry::<S>)
        .put(strapping::replace::<S>)
        .delete(strapping::clear::<S>),
    )
    .route(
      "/tanks/{id}/strapping-table/{height}",
      delete(strapping::remove_entry::<S>),
    )
    .route(
      "/tanks/{id}/strapping-table.csv",
      get(strapping::export_csv::<S>).put(strapping::import_csv::<S>),
    )
    // Gauging
    .route("/tanks/{id}/gauging", post(gauging::submit::<S>))
    .route("/tanks/{id}/gauging-history", get(gauging::history::<S>))
    .route("/tanks/{id}/gauging-history.csv", get(gauging::history_csv::<S>))
    .with_state(service)
}

// ─── Integration tests ────────────────────────────────────────────────────────
