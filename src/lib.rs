//! `sensorgrid` — backend service for recording and querying time-stamped
//! sensor measurements.
//!
//! The crate is organized around an explicit persistence core:
//! - [`models`] – row types for the five tables
//!   (Location → City → Device, ValueType, Value)
//! - [`schema`] – pool construction and idempotent schema bootstrap
//! - [`store`] – the read/write operations (metadata upsert, measurement
//!   ingestion, query layer), each threaded through an explicit pool handle
//! - [`routes`] – the thin axum layer translating HTTP calls and store
//!   errors to wire responses
//!
//! `main.rs` owns the store lifecycle: it loads [`config::Config`], opens
//! the pool, applies the schema and serves the router.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;

pub use config::Config;
pub use error::StoreError;
pub use models::{City, Device, Location, Value, ValueType};
