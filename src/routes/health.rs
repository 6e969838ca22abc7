//! Service self-description and health endpoints.
//!
//! `/health` is used by container orchestrators and CI pipelines to verify
//! that the service is running and able to respond to HTTP requests; it is
//! deliberately lightweight and does not touch the database. `/` returns a
//! static description of the API entry points for interactive discovery.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON response body for the root endpoint.
#[derive(Serialize)]
struct ApiDescription {
    description: &'static str,
    value_type_link: &'static str,
    value_link: &'static str,
}

/// Handle `GET /health`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Handle `GET /`.
async fn index() -> Json<ApiDescription> {
    Json(ApiDescription {
        description: "sensorgrid measurement API",
        value_type_link: "/type",
        value_link: "/value",
    })
}

/// Create a subrouter containing the `/` and `/health` routes.
///
/// This router is generic over the application state so it can merge
/// cleanly with the gateway router, regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}
