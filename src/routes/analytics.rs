//! Public analytics route
//!
//! Serves the dashboard's 30-day window. Never errors: the service falls
//! back to deterministic mock data when the store is empty or offline.

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use crate::routes::{json_response, FullBody};
use crate::server::AppState;
use crate::services::AnalyticsService;

/// GET /api/analytics - last 30 daily snapshots, newest first
pub async fn handle_analytics(_req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let analytics = AnalyticsService::new(state.mongo.as_ref()).await;
    analytics.record_visit().await;
    let snapshots = analytics.get_recent().await;
    json_response(StatusCode::OK, &snapshots)
}
