//! Admin route for transaction journal reporting

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use crate::routes::{
    json_response, query_param, require_admin, require_mongo, service_error_response, FullBody,
};
use crate::server::AppState;
use crate::services::JournalService;

/// GET /api/transactions?limit= - newest-first journal entries
pub async fn handle_transactions(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(&req, &state) {
        return resp;
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let journal = match JournalService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    let limit = query_param(req.uri().query(), "limit")
        .and_then(|l| l.parse::<i64>().ok())
        .map(|l| l.clamp(1, 500))
        .unwrap_or(100);

    match journal.list_recent(limit).await {
        Ok(entries) => json_response(StatusCode::OK, &entries),
        Err(e) => service_error_response(&e),
    }
}
