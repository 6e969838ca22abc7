//! Row types for the sensor measurement store.
//!
//! One struct per table; fields mirror the column layout exactly so the
//! query layer can materialize rows eagerly with [`sqlx::FromRow`] instead
//! of traversing relationships lazily.

use serde::{Deserialize, Serialize};

// ---

/// A coarse geographic grouping; owns zero or more cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

/// A city inside one location; owns zero or more devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub location_id: i64,
}

/// A physical sensor/reporting unit, located in exactly one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub city_id: i64,
}

/// Metadata describing a class of measurement, independent of any single
/// reading.
///
/// Unlike every other table, `value_type` accepts caller-supplied primary
/// keys: sensors reference types by a fixed external id and the row is
/// materialized on first use. This asymmetry is intentional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ValueType {
    pub id: i64,
    pub type_name: String,
    pub type_unit: String,
}

/// One timestamped measurement, linked to exactly one value type and one
/// device. `time` is unix seconds. Immutable once written; the
/// `(time, value_type_id, device_id)` triple is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Value {
    pub id: i64,
    pub time: i64,
    pub value: f64,
    pub value_type_id: i64,
    pub device_id: i64,
}
