//! Handlers for gauging submission and history.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tanks/:id/gauging` | Body: [`ReadingInput`]; returns 201 + `{record, tank}` |
//! | `GET`  | `/tanks/:id/gauging-history` | Newest first; optional `?limit=` |
//! | `GET`  | `/tanks/:id/gauging-history.csv` | Same order, as `text/csv` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tankgauge_core::{
  gauging::{GaugingRecord, ReadingInput},
  service::GaugingService,
  store::TankStore,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
  strapping::CSV_CONTENT_TYPE,
  tanks::TankView,
};

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub record: GaugingRecord,
  pub tank:   TankView,
}

/// `POST /tanks/:id/gauging`
pub async fn submit<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(reading): ApiJson<ReadingInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TankStore + 'static,
{
  let outcome = svc.submit_reading(id, reading).await?;
  Ok((
    StatusCode::CREATED,
    Json(SubmitResponse {
      record: outcome.record,
      tank:   outcome.updated_tank.into(),
    }),
  ))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub limit: Option<usize>,
}

/// `GET /tanks/:id/gauging-history[?limit=<n>]`
pub async fn history<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<HistoryParams>,
) -> Result<Json<Vec<GaugingRecord>>, ApiError>
where
  S: TankStore + 'static,
{
  Ok(Json(svc.history(id, params.limit).await?))
}

/// `GET /tanks/:id/gauging-history.csv[?limit=<n>]`
pub async fn history_csv<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<HistoryParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TankStore + 'static,
{
  let records = svc.history(id, params.limit).await?;
  Ok((
    [(header::CONTENT_TYPE, CSV_CONTENT_TYPE)],
    tankgauge_csv::write_gauging_csv(&records),
  ))
}
