//! Health check endpoints
//!
//! - /health, /healthz - liveness probe (is the service running?)
//! - /ready, /readyz - readiness probe (can we reach MongoDB?)
//! - /version - build info for deployment verification
//!
//! Dev mode runs without MongoDB, so readiness is forced healthy there.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::{json_response, FullBody};
use crate::server::AppState;

/// Health response body
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Current timestamp
    pub timestamp: String,
    /// Operating mode
    pub mode: String,
    /// Node identifier
    pub node_id: String,
    /// Whether MongoDB is configured and connected
    pub database: DatabaseHealth,
}

/// Database connection health details
#[derive(Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub name: String,
}

fn build_health_response(state: &AppState, db_connected: bool) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development".to_string()
        } else {
            "production".to_string()
        },
        node_id: state.args.node_id.to_string(),
        database: DatabaseHealth {
            connected: db_connected,
            name: state.args.mongodb_db.clone(),
        },
    }
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: Arc<AppState>) -> Response<FullBody> {
    let response = build_health_response(&state, state.mongo.is_some());
    json_response(StatusCode::OK, &response)
}

/// Handle readiness probe (/ready, /readyz)
///
/// Pings MongoDB; 503 when the store is unreachable outside dev mode.
pub async fn readiness_check(state: Arc<AppState>) -> Response<FullBody> {
    let db_connected = match &state.mongo {
        Some(mongo) => mongo.ping().await.is_ok(),
        None => false,
    };

    let is_ready = db_connected || state.args.dev_mode;
    let response = build_health_response(&state, db_connected);

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<FullBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "union-office",
    };
    json_response(StatusCode::OK, &response)
}
