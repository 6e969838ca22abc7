//! Route gateway for the `sensorgrid` API.
//!
//! Merges the per-concern subrouters and owns the translation of
//! [`StoreError`] values into HTTP responses, so individual handlers can
//! simply return `Result<Json<T>, StoreError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::StoreError;

mod health;
mod topology;
mod value_types;
mod values;

// ---

pub fn router(pool: SqlitePool) -> Router {
    // ---
    Router::new()
        .merge(value_types::router())
        .merge(values::router())
        .merge(topology::router())
        .merge(health::router())
        .with_state(pool)
}

// ---

/// JSON body returned for every failed request.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for StoreError {
    // ---
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            StoreError::ReferentialIntegrity(_) => StatusCode::BAD_REQUEST,
            StoreError::DuplicateMeasurement { .. } => StatusCode::CONFLICT,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("store failure: {self}");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
