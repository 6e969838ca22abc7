//! Store-level integration tests against an in-memory SQLite database.

use anyhow::Result;
use sqlx::SqlitePool;

use sensorgrid::{schema, store, StoreError};

// ---

/// Fresh in-memory database with the schema applied.
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
async fn test_pool() -> Result<SqlitePool> {
    // ---
    let pool = schema::connect_pool("sqlite::memory:", 1).await?;
    schema::create_schema(&pool).await?;
    Ok(pool)
}

/// Minimal hierarchy fixture: one location, one city, one device.
/// Returns the device id.
async fn seed_device(pool: &SqlitePool) -> Result<i64> {
    // ---
    let location = store::create_location(pool, "Alpine").await?;
    let city = store::create_city(pool, "Innsbruck", location.id).await?;
    let device = store::create_device(pool, "rooftop-a", "weather mast", city.id).await?;
    Ok(device.id)
}

// ---

#[tokio::test]
async fn added_value_is_returned_by_time_range_query() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    let device_id = seed_device(&pool).await?;

    store::add_value(&pool, 1_700_000_000, 1, 21.5, device_id).await?;

    let values = store::list_values(&pool, Some(1), Some(1_700_000_000), Some(1_700_000_000))
        .await?;

    assert_eq!(values.len(), 1);
    assert_eq!(values[0].time, 1_700_000_000);
    assert_eq!(values[0].value, 21.5);
    assert_eq!(values[0].value_type_id, 1);
    assert_eq!(values[0].device_id, device_id);

    Ok(())
}

#[tokio::test]
async fn duplicate_measurement_is_rejected_and_not_stored_twice() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    let device_id = seed_device(&pool).await?;

    store::add_value(&pool, 100, 1, 1.0, device_id).await?;
    let second = store::add_value(&pool, 100, 1, 2.0, device_id).await;

    assert!(matches!(
        second,
        Err(StoreError::DuplicateMeasurement {
            time: 100,
            value_type_id: 1,
            ..
        })
    ));

    // Exactly one row survives, with the first value.
    let values = store::list_values(&pool, Some(1), None, None).await?;
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, 1.0);

    Ok(())
}

#[tokio::test]
async fn failed_ingest_leaves_no_orphan_value_type() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    // Device 42 does not exist, so the whole transaction must roll back,
    // including the freshly upserted value type.
    let result = store::add_value(&pool, 100, 99, 1.0, 42).await;
    assert!(matches!(result, Err(StoreError::ReferentialIntegrity(_))));

    let lookup = store::get_value_type(&pool, 99).await;
    assert!(matches!(lookup, Err(StoreError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn upsert_placeholders_converge() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let first = store::upsert_value_type(&pool, Some(7), None, None).await?;
    let second = store::upsert_value_type(&pool, Some(7), None, None).await?;

    for vt in [&first, &second] {
        assert_eq!(vt.id, 7);
        assert_eq!(vt.type_name, "TYPE_7");
        assert_eq!(vt.type_unit, "UNIT_7");
    }

    Ok(())
}

#[tokio::test]
async fn upsert_partial_updates_preserve_other_fields() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    store::upsert_value_type(&pool, Some(7), Some("Temp"), None).await?;
    let updated = store::upsert_value_type(&pool, Some(7), None, Some("C")).await?;

    assert_eq!(updated.type_name, "Temp");
    assert_eq!(updated.type_unit, "C");

    // And the stored row agrees with the returned one.
    let stored = store::get_value_type(&pool, 7).await?;
    assert_eq!(stored, updated);

    Ok(())
}

#[tokio::test]
async fn upsert_treats_empty_strings_as_unset() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let vt = store::upsert_value_type(&pool, Some(8), Some(""), Some("")).await?;
    assert_eq!(vt.type_name, "TYPE_8");
    assert_eq!(vt.type_unit, "UNIT_8");

    Ok(())
}

#[tokio::test]
async fn upsert_without_id_assigns_one() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let vt = store::upsert_value_type(&pool, None, Some("Humidity"), Some("%")).await?;
    assert_eq!(vt.type_name, "Humidity");
    assert_eq!(vt.type_unit, "%");

    let stored = store::get_value_type(&pool, vt.id).await?;
    assert_eq!(stored, vt);

    Ok(())
}

#[tokio::test]
async fn time_range_filter_is_inclusive_and_ordered() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    let device_id = seed_device(&pool).await?;

    // Insert out of order on purpose; the query must sort by time.
    for time in [250, 50, 200, 100, 150] {
        store::add_value(&pool, time, 1, time as f64, device_id).await?;
    }

    let values = store::list_values(&pool, None, Some(100), Some(200)).await?;
    let times: Vec<i64> = values.iter().map(|v| v.time).collect();

    assert_eq!(times, vec![100, 150, 200]);

    Ok(())
}

#[tokio::test]
async fn type_filter_restricts_to_one_type() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    let device_id = seed_device(&pool).await?;

    store::add_value(&pool, 100, 1, 21.5, device_id).await?;
    store::add_value(&pool, 100, 2, 55.0, device_id).await?;

    let values = store::list_values(&pool, Some(2), None, None).await?;

    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value_type_id, 2);

    Ok(())
}

#[tokio::test]
async fn values_by_device_requires_an_identifier() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let result = store::get_values_by_device(&pool, None, None).await;
    assert!(matches!(result, Err(StoreError::InvalidArgument(_))));

    Ok(())
}

#[tokio::test]
async fn values_by_unknown_device_name_is_not_found() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    seed_device(&pool).await?;

    let result = store::get_values_by_device(&pool, None, Some("ghost")).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn values_by_device_resolves_name_and_prefers_id() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    let device_id = seed_device(&pool).await?;

    store::add_value(&pool, 100, 1, 1.0, device_id).await?;

    let by_name = store::get_values_by_device(&pool, None, Some("rooftop-a")).await?;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].device_id, device_id);

    // When both identifiers are given, the id wins and the name is ignored.
    let both = store::get_values_by_device(&pool, Some(device_id), Some("ghost")).await?;
    assert_eq!(both.len(), 1);

    Ok(())
}

#[tokio::test]
async fn devices_by_city_without_devices_is_empty_not_an_error() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let location = store::create_location(&pool, "Alpine").await?;
    let city = store::create_city(&pool, "Innsbruck", location.id).await?;

    let devices = store::get_devices_by_city(&pool, city.id).await?;
    assert!(devices.is_empty());

    // Same for a city id that does not exist at all.
    let devices = store::get_devices_by_city(&pool, 999).await?;
    assert!(devices.is_empty());

    Ok(())
}

#[tokio::test]
async fn city_with_unknown_location_is_rejected() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let result = store::create_city(&pool, "Atlantis", 999).await;
    assert!(matches!(result, Err(StoreError::ReferentialIntegrity(_))));

    // Nothing was inserted.
    let cities = store::list_cities(&pool).await?;
    assert!(cities.is_empty());

    Ok(())
}

#[tokio::test]
async fn device_with_unknown_city_is_rejected() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let result = store::create_device(&pool, "orphan", "no city", 999).await;
    assert!(matches!(result, Err(StoreError::ReferentialIntegrity(_))));

    let devices = store::list_devices(&pool).await?;
    assert!(devices.is_empty());

    Ok(())
}

#[tokio::test]
async fn missing_value_type_lookup_is_not_found() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let result = store::get_value_type(&pool, 12345).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn cities_by_location_lists_only_that_location() -> Result<()> {
    // ---
    let pool = test_pool().await?;

    let alpine = store::create_location(&pool, "Alpine").await?;
    let coastal = store::create_location(&pool, "Coastal").await?;
    store::create_city(&pool, "Innsbruck", alpine.id).await?;
    store::create_city(&pool, "Trieste", coastal.id).await?;

    let cities = store::get_cities_by_location(&pool, alpine.id).await?;
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].name, "Innsbruck");

    assert!(store::get_cities_by_location(&pool, 999).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn ingestion_backfills_placeholder_metadata() -> Result<()> {
    // ---
    let pool = test_pool().await?;
    let device_id = seed_device(&pool).await?;

    store::add_value(&pool, 100, 3, 0.5, device_id).await?;

    // The type was created with id-only upsert, so it carries placeholders
    // until a later metadata update names it.
    let vt = store::get_value_type(&pool, 3).await?;
    assert_eq!(vt.type_name, "TYPE_3");
    assert_eq!(vt.type_unit, "UNIT_3");

    let named = store::upsert_value_type(&pool, Some(3), Some("Pressure"), Some("hPa")).await?;
    assert_eq!(named.type_name, "Pressure");

    Ok(())
}
