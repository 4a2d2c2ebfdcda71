//! Settings routes
//!
//! GET is public (the site header needs the union name); PUT is admin-only.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::routes::{
    error_response, json_response, read_json, require_admin, require_mongo,
    service_error_response, FullBody,
};
use crate::server::AppState;
use crate::services::{SettingsPatch, SettingsService};

/// Handler for /api/settings
pub async fn handle_settings_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let settings = match SettingsService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    match req.method().clone() {
        Method::GET => match settings.get().await {
            Ok(doc) => json_response(StatusCode::OK, &doc),
            Err(e) => service_error_response(&e),
        },

        Method::PUT => {
            if let Err(resp) = require_admin(&req, &state) {
                return resp;
            }
            let patch: SettingsPatch = match read_json(req).await {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            match settings.update(patch).await {
                Ok(updated) => json_response(StatusCode::OK, &updated),
                Err(e) => service_error_response(&e),
            }
        }

        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None),
    }
}
