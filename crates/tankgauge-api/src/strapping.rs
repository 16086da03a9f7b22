//! Handlers for `/tanks/:id/strapping-table` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tanks/:id/strapping-table` | The table, entries ascending |
//! | `POST`   | `/tanks/:id/strapping-table` | Body: `{"height":..,"volume":..}`; returns 201 + table |
//! | `PUT`    | `/tanks/:id/strapping-table` | Body: `[{"height":..,"volume":..}, ..]`; replaces every entry |
//! | `DELETE` | `/tanks/:id/strapping-table` | Removes every entry; 204 |
//! | `DELETE` | `/tanks/:id/strapping-table/:height` | Returns the removed entry |
//! | `GET`    | `/tanks/:id/strapping-table.csv` | `text/csv` export |
//! | `PUT`    | `/tanks/:id/strapping-table.csv` | Replaces the table from a CSV body |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde::Deserialize;
use tankgauge_core::{
  service::GaugingService,
  store::TankStore,
  strapping::{StrappingEntry, StrappingTable},
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

pub(crate) const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// `GET /tanks/:id/strapping-table`
pub async fn get_table<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StrappingTable>, ApiError>
where
  S: TankStore + 'static,
{
  Ok(Json(svc.strapping_table(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EntryBody {
  pub height: f64,
  pub volume: f64,
}

/// `POST /tanks/:id/strapping-table`
pub async fn add_entry<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<EntryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TankStore + 'static,
{
  let table = svc.add_strapping_entry(id, body.height, body.volume).await?;
  Ok((StatusCode::CREATED, Json(table)))
}

/// `PUT /tanks/:id/strapping-table`: all-or-nothing, like the CSV import.
pub async fn replace<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<Vec<EntryBody>>,
) -> Result<Json<StrappingTable>, ApiError>
where
  S: TankStore + 'static,
{
  let pairs = body.into_iter().map(|e| (e.height, e.volume)).collect();
  Ok(Json(svc.replace_strapping_table(id, pairs).await?))
}

/// `DELETE /tanks/:id/strapping-table/:height`
pub async fn remove_entry<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath((id, height)): ApiPath<(Uuid, f64)>,
) -> Result<Json<StrappingEntry>, ApiError>
where
  S: TankStore + 'static,
{
  Ok(Json(svc.remove_strapping_entry(id, height).await?))
}

/// `DELETE /tanks/:id/strapping-table`
pub async fn clear<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TankStore + 'static,
{
  svc.clear_strapping_table(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── CSV ──────────────────────────────────────────────────────────────────────

/// `GET /tanks/:id/strapping-table.csv`
pub async fn export_csv<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TankStore + 'static,
{
  let table = svc.strapping_table(id).await?;
  Ok((
    [(header::CONTENT_TYPE, CSV_CONTENT_TYPE)],
    tankgauge_csv::write_strapping_csv(&table),
  ))
}

/// `PUT /tanks/:id/strapping-table.csv`: the stored table is left as it was
/// if any row is rejected.
pub async fn import_csv<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  body: String,
) -> Result<Json<StrappingTable>, ApiError>
where
  S: TankStore + 'static,
{
  let pairs = tankgauge_csv::parse_strapping_csv(&body)?;
  Ok(Json(svc.replace_strapping_table(id, pairs).await?))
}
