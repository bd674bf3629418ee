use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use sea_orm::DatabaseConnection;

/// Handler for `GET /healthz`: liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`: 200 when the database answers a ping, 503 otherwise.
///
/// Mount on any router whose state implements `FromRef` for `Arc<DatabaseConnection>`.
pub async fn readyz(State(db): State<Arc<DatabaseConnection>>) -> StatusCode {
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
