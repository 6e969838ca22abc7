//! Location hierarchy endpoints: locations, cities and devices.
//!
//! Creation endpoints return the inserted row with its assigned id; a
//! request referencing a missing parent (city for a device, location for a
//! city) is rejected by the store's foreign keys and surfaces as 400.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreError;
use crate::models::{City, Device, Location};
use crate::store;

// ---

pub fn router() -> Router<SqlitePool> {
    // ---
    Router::new()
        .route("/location", post(create_location).get(list_locations))
        .route("/location/{id}/cities", get(get_cities_by_location))
        .route("/city", post(create_city).get(list_cities))
        .route("/city/{id}/devices", get(get_devices_by_city))
        .route("/device", post(create_device).get(list_devices))
}

// ---

#[derive(Debug, Deserialize)]
struct NewLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewCity {
    name: String,
    location_id: i64,
}

#[derive(Debug, Deserialize)]
struct NewDevice {
    name: String,
    description: String,
    city_id: i64,
}

// ---

async fn create_location(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewLocation>,
) -> Result<Json<Location>, StoreError> {
    // ---
    info!("POST /location - {}", body.name);

    let location = store::create_location(&pool, &body.name).await?;
    Ok(Json(location))
}

async fn list_locations(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Location>>, StoreError> {
    // ---
    let locations = store::list_locations(&pool).await?;
    Ok(Json(locations))
}

async fn get_cities_by_location(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<City>>, StoreError> {
    // ---
    let cities = store::get_cities_by_location(&pool, id).await?;
    Ok(Json(cities))
}

async fn create_city(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewCity>,
) -> Result<Json<City>, StoreError> {
    // ---
    info!("POST /city - {} (location {})", body.name, body.location_id);

    let city = store::create_city(&pool, &body.name, body.location_id).await?;
    Ok(Json(city))
}

async fn list_cities(State(pool): State<SqlitePool>) -> Result<Json<Vec<City>>, StoreError> {
    // ---
    let cities = store::list_cities(&pool).await?;
    Ok(Json(cities))
}

async fn get_devices_by_city(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Device>>, StoreError> {
    // ---
    let devices = store::get_devices_by_city(&pool, id).await?;
    Ok(Json(devices))
}

async fn create_device(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewDevice>,
) -> Result<Json<Device>, StoreError> {
    // ---
    info!("POST /device - {} (city {})", body.name, body.city_id);

    let device = store::create_device(&pool, &body.name, &body.description, body.city_id).await?;
    Ok(Json(device))
}

async fn list_devices(State(pool): State<SqlitePool>) -> Result<Json<Vec<Device>>, StoreError> {
    // ---
    let devices = store::list_devices(&pool).await?;
    Ok(Json(devices))
}
