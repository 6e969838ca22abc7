//! Core read/write operations of the measurement store.
//!
//! Every operation takes the pool explicitly and completes its transaction
//! before returning; no session is held across calls. Writes that violate a
//! constraint roll back in full and surface a typed [`StoreError`].

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::StoreError;
use crate::models::{City, Device, Location, Value, ValueType};

// ---

/// Map a write failure onto the store's error vocabulary.
///
/// Foreign-key and uniqueness violations become [`StoreError::ReferentialIntegrity`]
/// tagged with the table that was written; anything else passes through as a
/// driver error.
fn constraint_error(err: sqlx::Error, table: &'static str) -> StoreError {
    // ---
    match err {
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation() || db.is_unique_violation() =>
        {
            debug!("constraint violation on {table}: {}", db.message());
            StoreError::ReferentialIntegrity(table)
        }
        other => StoreError::Database(other),
    }
}

// ---

/// Add or update a value type (create-or-update keyed by id).
///
/// - Without `id`, a new row is created with a store-assigned id.
/// - With `id`, the existing row is updated in place, or a new row is
///   created under that id (this is the one table that accepts
///   caller-supplied primary keys).
/// - A non-empty `name` overwrites the stored name; a row that still has no
///   name gets the placeholder `TYPE_<id>`. Same rule for `unit` with
///   `UNIT_<id>`.
///
/// Repeated calls with the same arguments converge to the same row state.
pub async fn upsert_value_type(
    pool: &SqlitePool,
    id: Option<i64>,
    name: Option<&str>,
    unit: Option<&str>,
) -> Result<ValueType, StoreError> {
    // ---
    let mut tx = pool.begin().await?;
    let value_type = upsert_value_type_on(&mut tx, id, name, unit).await?;
    tx.commit().await?;
    Ok(value_type)
}

/// Upsert a value type on an existing connection or transaction.
///
/// Split out so measurement ingestion can run the upsert inside its own
/// transaction and keep the whole write atomic.
async fn upsert_value_type_on(
    conn: &mut SqliteConnection,
    id: Option<i64>,
    name: Option<&str>,
    unit: Option<&str>,
) -> Result<ValueType, StoreError> {
    // ---
    let existing = match id {
        Some(id) => {
            sqlx::query_as::<_, ValueType>(
                "SELECT id, type_name, type_unit FROM value_type WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        }
        None => None,
    };

    let (row_id, stored_name, stored_unit) = match existing {
        Some(vt) => (vt.id, vt.type_name, vt.type_unit),
        None => {
            // Fresh row: empty metadata now, placeholders filled in below
            // once the id is known.
            let row_id = match id {
                Some(id) => {
                    sqlx::query(
                        "INSERT INTO value_type (id, type_name, type_unit) VALUES ($1, '', '')",
                    )
                    .bind(id)
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| constraint_error(e, "value_type"))?;
                    id
                }
                None => {
                    let row: (i64,) = sqlx::query_as(
                        "INSERT INTO value_type (type_name, type_unit) VALUES ('', '') RETURNING id",
                    )
                    .fetch_one(&mut *conn)
                    .await?;
                    row.0
                }
            };
            (row_id, String::new(), String::new())
        }
    };

    let type_name = match name {
        Some(n) if !n.is_empty() => n.to_string(),
        _ if !stored_name.is_empty() => stored_name,
        _ => format!("TYPE_{row_id}"),
    };
    let type_unit = match unit {
        Some(u) if !u.is_empty() => u.to_string(),
        _ if !stored_unit.is_empty() => stored_unit,
        _ => format!("UNIT_{row_id}"),
    };

    sqlx::query("UPDATE value_type SET type_name = $1, type_unit = $2 WHERE id = $3")
        .bind(&type_name)
        .bind(&type_unit)
        .bind(row_id)
        .execute(&mut *conn)
        .await?;

    Ok(ValueType {
        id: row_id,
        type_name,
        type_unit,
    })
}

// ---

/// Record a single measurement.
///
/// The referenced value type is materialized via the upsert (id only, so a
/// brand-new type gets placeholder metadata) in the same transaction as the
/// `value` insert. A collision on the `(time, value_type_id, device_id)`
/// triple fails with [`StoreError::DuplicateMeasurement`] and rolls the
/// whole write back; an unresolved `device_id` fails with
/// [`StoreError::ReferentialIntegrity`].
///
/// `time` and `value` are stored as given; no range validation is applied.
pub async fn add_value(
    pool: &SqlitePool,
    time: i64,
    value_type_id: i64,
    value: f64,
    device_id: i64,
) -> Result<(), StoreError> {
    // ---
    let mut tx = pool.begin().await?;
    let value_type = upsert_value_type_on(&mut tx, Some(value_type_id), None, None).await?;

    let inserted = sqlx::query(
        "INSERT INTO value (time, value, value_type_id, device_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(time)
    .bind(value)
    .bind(value_type.id)
    .bind(device_id)
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {
            tx.commit().await?;
            debug!(
                time,
                value_type_id, device_id, "measurement recorded"
            );
            Ok(())
        }
        // Dropping the transaction rolls back the value-type upsert along
        // with the failed insert.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(StoreError::DuplicateMeasurement {
                time,
                value_type_id,
                device_id,
            })
        }
        Err(err) => Err(constraint_error(err, "value")),
    }
}

// ---

/// Get all configured value types.
pub async fn list_value_types(pool: &SqlitePool) -> Result<Vec<ValueType>, StoreError> {
    // ---
    let types =
        sqlx::query_as::<_, ValueType>("SELECT id, type_name, type_unit FROM value_type")
            .fetch_all(pool)
            .await?;
    Ok(types)
}

/// Get one value type by primary key.
pub async fn get_value_type(pool: &SqlitePool, id: i64) -> Result<ValueType, StoreError> {
    // ---
    sqlx::query_as::<_, ValueType>(
        "SELECT id, type_name, type_unit FROM value_type WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("value type"))
}

/// Get measurements, optionally filtered, ordered ascending by time.
///
/// Filters apply conjunctively: `value_type_id` restricts to one type (via
/// a join on `value_type`), `start`/`end` bound the timestamp. Both bounds
/// are inclusive. Omitted filters are unconstrained.
pub async fn list_values(
    pool: &SqlitePool,
    value_type_id: Option<i64>,
    start: Option<i64>,
    end: Option<i64>,
) -> Result<Vec<Value>, StoreError> {
    // ---
    let mut sql = String::from(
        "SELECT v.id, v.time, v.value, v.value_type_id, v.device_id FROM value v",
    );
    if value_type_id.is_some() {
        sql.push_str(" JOIN value_type vt ON vt.id = v.value_type_id");
    }
    sql.push_str(" WHERE 1=1");

    let mut param_count = 0;

    if value_type_id.is_some() {
        param_count += 1;
        sql.push_str(&format!(" AND vt.id = ${param_count}"));
    }

    if start.is_some() {
        param_count += 1;
        sql.push_str(&format!(" AND v.time >= ${param_count}"));
    }

    if end.is_some() {
        param_count += 1;
        sql.push_str(&format!(" AND v.time <= ${param_count}"));
    }

    sql.push_str(" ORDER BY v.time ASC");

    let mut query = sqlx::query_as::<_, Value>(&sql);
    if let Some(type_id) = value_type_id {
        query = query.bind(type_id);
    }
    if let Some(start) = start {
        query = query.bind(start);
    }
    if let Some(end) = end {
        query = query.bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Get measurements for one device, addressed by id or by name.
///
/// Exactly one identifier is required; with neither the call fails with
/// [`StoreError::InvalidArgument`]. When both are given the id wins. A name
/// that matches no device fails with [`StoreError::NotFound`].
pub async fn get_values_by_device(
    pool: &SqlitePool,
    device_id: Option<i64>,
    device_name: Option<&str>,
) -> Result<Vec<Value>, StoreError> {
    // ---
    let device_id = match (device_id, device_name) {
        (Some(id), _) => id,
        (None, Some(name)) => get_device_by_name(pool, name).await?.id,
        (None, None) => {
            return Err(StoreError::InvalidArgument(
                "either device_id or device_name must be provided",
            ));
        }
    };

    let values = sqlx::query_as::<_, Value>(
        "SELECT id, time, value, value_type_id, device_id FROM value WHERE device_id = $1",
    )
    .bind(device_id)
    .fetch_all(pool)
    .await?;

    Ok(values)
}

/// Look up a device by its (non-unique, first match wins) name.
pub async fn get_device_by_name(pool: &SqlitePool, name: &str) -> Result<Device, StoreError> {
    // ---
    sqlx::query_as::<_, Device>(
        "SELECT id, name, description, city_id FROM device WHERE name = $1 LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("device"))
}

// ---

/// Register a new device in a city.
pub async fn create_device(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    city_id: i64,
) -> Result<Device, StoreError> {
    // ---
    sqlx::query_as::<_, Device>(
        r#"
        INSERT INTO device (name, description, city_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, city_id
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(city_id)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_error(e, "device"))
}

pub async fn list_devices(pool: &SqlitePool) -> Result<Vec<Device>, StoreError> {
    // ---
    let devices =
        sqlx::query_as::<_, Device>("SELECT id, name, description, city_id FROM device")
            .fetch_all(pool)
            .await?;
    Ok(devices)
}

/// Devices in one city; an unknown or empty city yields an empty list, not
/// an error.
pub async fn get_devices_by_city(
    pool: &SqlitePool,
    city_id: i64,
) -> Result<Vec<Device>, StoreError> {
    // ---
    let devices = sqlx::query_as::<_, Device>(
        "SELECT id, name, description, city_id FROM device WHERE city_id = $1",
    )
    .bind(city_id)
    .fetch_all(pool)
    .await?;
    Ok(devices)
}

// ---

/// Create a new location.
pub async fn create_location(pool: &SqlitePool, name: &str) -> Result<Location, StoreError> {
    // ---
    let location = sqlx::query_as::<_, Location>(
        "INSERT INTO location (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(location)
}

/// Create a new city under an existing location.
pub async fn create_city(
    pool: &SqlitePool,
    name: &str,
    location_id: i64,
) -> Result<City, StoreError> {
    // ---
    sqlx::query_as::<_, City>(
        "INSERT INTO city (name, location_id) VALUES ($1, $2) RETURNING id, name, location_id",
    )
    .bind(name)
    .bind(location_id)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_error(e, "city"))
}

pub async fn list_locations(pool: &SqlitePool) -> Result<Vec<Location>, StoreError> {
    // ---
    let locations = sqlx::query_as::<_, Location>("SELECT id, name FROM location")
        .fetch_all(pool)
        .await?;
    Ok(locations)
}

pub async fn list_cities(pool: &SqlitePool) -> Result<Vec<City>, StoreError> {
    // ---
    let cities = sqlx::query_as::<_, City>("SELECT id, name, location_id FROM city")
        .fetch_all(pool)
        .await?;
    Ok(cities)
}

/// Cities in one location; unknown locations yield an empty list.
pub async fn get_cities_by_location(
    pool: &SqlitePool,
    location_id: i64,
) -> Result<Vec<City>, StoreError> {
    // ---
    let cities = sqlx::query_as::<_, City>(
        "SELECT id, name, location_id FROM city WHERE location_id = $1",
    )
    .bind(location_id)
    .fetch_all(pool)
    .await?;
    Ok(cities)
}
