//! HTTP routes for the union office service

pub mod analytics;
pub mod certificate_types;
pub mod certificates;
pub mod citizens;
pub mod health;
pub mod holding_tax;
pub mod notifications;
pub mod public;
pub mod settings;
pub mod transactions;

pub use analytics::handle_analytics;
pub use certificate_types::handle_certificate_types_request;
pub use certificates::handle_certificates_request;
pub use citizens::handle_citizens_request;
pub use health::{health_check, readiness_check, version_info};
pub use holding_tax::handle_holding_tax_request;
pub use notifications::handle_notifications_request;
pub use public::{handle_apply_certificate, handle_verify};
pub use settings::handle_settings_request;
pub use transactions::handle_transactions;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::server::AppState;
use crate::types::OfficeError;

/// Response body type used by all handlers
pub type FullBody = Full<Bytes>;

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

pub fn error_response(status: StatusCode, error: &str, code: Option<&str>) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
            details: None,
        },
    )
}

/// Map a service error to its HTTP response.
///
/// Internal detail stays in the server log; the caller gets the public
/// message and a machine code.
pub fn service_error_response(err: &OfficeError) -> Response<FullBody> {
    match err {
        OfficeError::Database(detail) | OfficeError::Internal(detail) => {
            error!("Request failed: {}", detail);
        }
        _ => {}
    }
    error_response(err.status_code(), &err.public_message(), Some(err.code()))
}

/// Collect and parse a JSON request body
pub async fn read_json<T: DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, Response<FullBody>> {
    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Invalid body",
                Some("INVALID_BODY"),
            ))
        }
    };

    serde_json::from_slice(&body_bytes).map_err(|e| {
        json_response(
            StatusCode::BAD_REQUEST,
            &ErrorResponse {
                error: "Invalid JSON".to_string(),
                code: Some("INVALID_JSON".to_string()),
                details: Some(e.to_string()),
            },
        )
    })
}

/// Require the admin API key on staff endpoints.
///
/// Dev mode skips the check entirely, mirroring how the service runs without
/// MongoDB locally.
pub fn require_admin(
    req: &Request<Incoming>,
    state: &AppState,
) -> Result<(), Response<FullBody>> {
    let presented = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    if state.args.admin_key_matches(presented) {
        return Ok(());
    }

    if presented.is_none() {
        Err(error_response(
            StatusCode::UNAUTHORIZED,
            "API key required",
            Some("NO_API_KEY"),
        ))
    } else {
        Err(error_response(
            StatusCode::FORBIDDEN,
            "Invalid API key",
            Some("FORBIDDEN"),
        ))
    }
}

/// Get the Mongo client or fail with 503
pub fn require_mongo(state: &Arc<AppState>) -> Result<crate::db::MongoClient, Response<FullBody>> {
    match &state.mongo {
        Some(m) => Ok(m.clone()),
        None => Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database not available",
            Some("DB_UNAVAILABLE"),
        )),
    }
}

/// Pull one query parameter out of a raw query string
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some(name) {
            let value = parts.next().unwrap_or("");
            let decoded = value.replace('+', " ");
            return Some(decoded);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_extraction() {
        assert_eq!(
            query_param(Some("certNo=CRT-CHA-AB12CD34"), "certNo").as_deref(),
            Some("CRT-CHA-AB12CD34")
        );
        assert_eq!(
            query_param(Some("page=2&limit=10"), "limit").as_deref(),
            Some("10")
        );
        assert_eq!(query_param(Some("certNo="), "certNo").as_deref(), Some(""));
        assert_eq!(query_param(Some("other=1"), "certNo"), None);
        assert_eq!(query_param(None, "certNo"), None);
    }
}
