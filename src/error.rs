//! Error types surfaced by the store operations.

use thiserror::Error;

/// Failure modes of the persistence layer.
///
/// Every variant is reported synchronously to the immediate caller; nothing
/// is retried internally and no partial write survives a failed operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lookup by id or name found no row.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller supplied a parameter combination that cannot be resolved.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A measurement with the same (time, value_type_id, device_id) triple
    /// is already recorded. Callers should treat this as "already stored",
    /// not as a fatal condition.
    #[error("measurement at time {time} for type {value_type_id} on device {device_id} already recorded")]
    DuplicateMeasurement {
        time: i64,
        value_type_id: i64,
        device_id: i64,
    },

    /// A foreign key in a write did not resolve, or some other store
    /// constraint was violated. The triggering transaction is rolled back
    /// in full.
    #[error("referential integrity violation on {0}")]
    ReferentialIntegrity(&'static str),

    /// Any other failure reported by the store driver.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
