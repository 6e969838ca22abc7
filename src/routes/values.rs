//! Measurement endpoints: ingestion and filtered reads.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::Value;
use crate::store;

// ---

pub fn router() -> Router<SqlitePool> {
    // ---
    Router::new()
        .route("/value", get(get_values).post(post_value))
        .route("/value/by-device", get(get_values_by_device))
}

// ---

/// Query parameters for `GET /value`. All filters are optional and combine
/// conjunctively; `start`/`end` are inclusive unix-second bounds.
#[derive(Debug, Deserialize)]
struct ValuesQuery {
    type_id: Option<i64>,
    start: Option<i64>,
    end: Option<i64>,
}

/// Request body for `POST /value`: one measurement as reported by a sensor.
#[derive(Debug, Deserialize)]
struct NewValue {
    time: i64,
    value_type_id: i64,
    value: f64,
    device_id: i64,
}

/// Query parameters for `GET /value/by-device`; exactly one of the two
/// identifiers must be supplied.
#[derive(Debug, Deserialize)]
struct DeviceValuesQuery {
    device_id: Option<i64>,
    device_name: Option<String>,
}

// ---

async fn get_values(
    State(pool): State<SqlitePool>,
    Query(params): Query<ValuesQuery>,
) -> Result<Json<Vec<Value>>, StoreError> {
    // ---
    debug!("GET /value - {:?}", params);

    let values = store::list_values(&pool, params.type_id, params.start, params.end).await?;
    Ok(Json(values))
}

async fn post_value(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewValue>,
) -> Result<StatusCode, StoreError> {
    // ---
    info!(
        "POST /value - time={} type={} device={}",
        body.time, body.value_type_id, body.device_id
    );

    store::add_value(&pool, body.time, body.value_type_id, body.value, body.device_id).await?;
    Ok(StatusCode::CREATED)
}

async fn get_values_by_device(
    State(pool): State<SqlitePool>,
    Query(params): Query<DeviceValuesQuery>,
) -> Result<Json<Vec<Value>>, StoreError> {
    // ---
    debug!("GET /value/by-device - {:?}", params);

    let values =
        store::get_values_by_device(&pool, params.device_id, params.device_name.as_deref())
            .await?;
    Ok(Json(values))
}
