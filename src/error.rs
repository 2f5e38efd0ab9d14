//! Error types for the experience server

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("User not found")]
  UserNotFound,

  #[error("JSON error: {0}")]
  Json(#[from] json::Error),

  #[error("Invalid settings: {0}")]
  InvalidSettings(String),

  #[error("Bad request: {0}")]
  BadRequest(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::UserNotFound => StatusCode::NOT_FOUND,
      Error::InvalidSettings(_) | Error::BadRequest(_) => {
        StatusCode::BAD_REQUEST
      }
      Error::Database(_) | Error::Json(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    if status.is_server_error() {
      tracing::error!("{self}");
    }

    let body = json::json!({
      "success": false,
      "error": self.to_string(),
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
