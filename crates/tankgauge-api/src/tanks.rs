//! Handlers for `/tanks` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tanks` | Ordered by tank number |
//! | `POST` | `/tanks` | Body: [`NewTank`]; returns 201 + the tank |
//! | `GET`  | `/tanks/:id` | 404 if not found |
//! | `GET`  | `/tanks/:id/volume` | `?level=<feet>` required |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tankgauge_core::{
  Error,
  service::GaugingService,
  store::TankStore,
  strapping::VolumeLookup,
  tank::{NewTank, Tank},
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

/// A tank together with its derived utilization percentage.
#[derive(Debug, Serialize)]
pub struct TankView {
  #[serde(flatten)]
  pub tank:        Tank,
  pub utilization: f64,
}

impl From<Tank> for TankView {
  fn from(tank: Tank) -> Self {
    Self {
      utilization: tank.utilization(),
      tank,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /tanks`
pub async fn list<S>(
  State(svc): State<Arc<GaugingService<S>>>,
) -> Result<Json<Vec<TankView>>, ApiError>
where
  S: TankStore + 'static,
{
  let tanks = svc.tanks().await?;
  Ok(Json(tanks.into_iter().map(TankView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /tanks`
pub async fn create<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiJson(body): ApiJson<NewTank>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TankStore + 'static,
{
  let tank = svc.create_tank(body).await?;
  Ok((StatusCode::CREATED, Json(TankView::from(tank))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tanks/:id`
pub async fn get_one<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TankView>, ApiError>
where
  S: TankStore + 'static,
{
  Ok(Json(svc.tank(id).await?.into()))
}

// ─── Volume lookup ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VolumeParams {
  pub level: Option<f64>,
}

/// `GET /tanks/:id/volume?level=<feet>`
pub async fn volume<S>(
  State(svc): State<Arc<GaugingService<S>>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<VolumeParams>,
) -> Result<Json<VolumeLookup>, ApiError>
where
  S: TankStore + 'static,
{
  let level = params
    .level
    .ok_or_else(|| ApiError::BadRequest(Error::MissingLevel.to_string()))?;
  Ok(Json(svc.lookup_volume(id, level).await?))
}
