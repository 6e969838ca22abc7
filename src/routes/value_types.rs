//! Value-type metadata endpoints.
//!
//! `PUT /type/{id}` exposes the store's upsert: it updates the named fields
//! of an existing row, or creates the row under the given id if it does not
//! exist yet (this table accepts caller-supplied primary keys).

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreError;
use crate::models::ValueType;
use crate::store;

// ---

pub fn router() -> Router<SqlitePool> {
    // ---
    Router::new()
        .route("/type", get(list_types))
        .route("/type/{id}", get(get_type).put(put_type))
}

// ---

/// Request body for `PUT /type/{id}`. Omitted fields keep their stored
/// value (or receive a placeholder if the row is new).
#[derive(Debug, Deserialize)]
struct ValueTypePatch {
    type_name: Option<String>,
    type_unit: Option<String>,
}

async fn list_types(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ValueType>>, StoreError> {
    // ---
    let types = store::list_value_types(&pool).await?;
    Ok(Json(types))
}

async fn get_type(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<ValueType>, StoreError> {
    // ---
    let value_type = store::get_value_type(&pool, id).await?;
    Ok(Json(value_type))
}

async fn put_type(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(patch): Json<ValueTypePatch>,
) -> Result<Json<ValueType>, StoreError> {
    // ---
    info!("PUT /type/{id} - {:?}", patch);

    let value_type = store::upsert_value_type(
        &pool,
        Some(id),
        patch.type_name.as_deref(),
        patch.type_unit.as_deref(),
    )
    .await?;

    Ok(Json(value_type))
}
