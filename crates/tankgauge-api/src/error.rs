//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tankgauge_core::{ErrorKind, service::ServiceError};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// A stored table or record that the engine could not compute with.
  #[error("computation error: {0}")]
  Computation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ServiceError> for ApiError {
  fn from(e: ServiceError) -> Self {
    match e {
      ServiceError::Core(core) => match core.kind() {
        ErrorKind::Validation => ApiError::BadRequest(core.to_string()),
        ErrorKind::NotFound => ApiError::NotFound(core.to_string()),
        ErrorKind::Conflict => ApiError::Conflict(core.to_string()),
        ErrorKind::Computation => ApiError::Computation(core.to_string()),
      },
      ServiceError::Store(source) => ApiError::Store(source),
    }
  }
}

impl From<tankgauge_csv::Error> for ApiError {
  fn from(e: tankgauge_csv::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Computation(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    if status.is_server_error() {
      tracing::error!(error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use tankgauge_core::Error;
  use uuid::Uuid;

  use super::*;

  fn status(e: impl Into<ApiError>) -> StatusCode { e.into().into_response().status() }

  #[test]
  fn core_kinds_map_to_statuses() {
    let e = |c: Error| ServiceError::from(c);
    assert_eq!(status(e(Error::EmptyObserver)), StatusCode::BAD_REQUEST);
    assert_eq!(status(e(Error::DuplicateHeight(3.0))), StatusCode::BAD_REQUEST);
    assert_eq!(
      status(e(Error::TankNotFound(Uuid::new_v4()))),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      status(e(Error::DuplicateTank(Uuid::new_v4()))),
      StatusCode::CONFLICT
    );
    assert_eq!(
      status(e(Error::UnsortedTable { index: 2 })),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn csv_errors_are_bad_requests() {
    assert_eq!(status(tankgauge_csv::Error::Empty), StatusCode::BAD_REQUEST);
  }
}
