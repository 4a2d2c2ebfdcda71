//! Admin routes for certificate records
//!
//! Listing, status transitions and fee payment.

use bson::oid::ObjectId;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::schemas::CertificateStatus;
use crate::routes::{
    error_response, json_response, query_param, read_json, require_admin, require_mongo,
    service_error_response, FullBody,
};
use crate::server::AppState;
use crate::services::RecordsService;

#[derive(Deserialize)]
struct StatusRequest {
    status: CertificateStatus,
}

/// Handler for /api/certificates and subpaths
pub async fn handle_certificates_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(&req, &state) {
        return resp;
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let records = match RecordsService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    let subpath = path
        .strip_prefix("/api/certificates")
        .unwrap_or("")
        .trim_start_matches('/');
    let method = req.method().clone();

    match (method, subpath) {
        // GET /api/certificates?status=Pending&page=1&limit=20
        (Method::GET, "") => {
            let query = req.uri().query();
            let status = match query_param(query, "status") {
                Some(s) => match serde_json::from_value(serde_json::Value::String(s.clone())) {
                    Ok(parsed) => Some(parsed),
                    Err(_) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            &format!("Unknown status \"{s}\""),
                            Some("INVALID_STATUS"),
                        )
                    }
                },
                None => None,
            };
            let page = query_param(query, "page")
                .and_then(|p| p.parse().ok())
                .unwrap_or(1u32);
            let limit = query_param(query, "limit")
                .and_then(|l| l.parse().ok())
                .unwrap_or(20u32);

            match records.list_certificates(status, page, limit).await {
                Ok(list) => json_response(StatusCode::OK, &list),
                Err(e) => service_error_response(&e),
            }
        }

        // PUT /api/certificates/{id}/status
        (Method::PUT, p) if p.ends_with("/status") => {
            let id_str = p.strip_suffix("/status").unwrap_or("");
            let id = match parse_id(id_str) {
                Ok(o) => o,
                Err(resp) => return resp,
            };
            let body: StatusRequest = match read_json(req).await {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            match records.transition_status(id, body.status).await {
                Ok(updated) => json_response(StatusCode::OK, &updated),
                Err(e) => service_error_response(&e),
            }
        }

        // POST /api/certificates/{id}/payment
        (Method::POST, p) if p.ends_with("/payment") => {
            let id_str = p.strip_suffix("/payment").unwrap_or("");
            let id = match parse_id(id_str) {
                Ok(o) => o,
                Err(resp) => return resp,
            };
            match records.record_fee_payment(id).await {
                Ok(updated) => json_response(StatusCode::OK, &updated),
                Err(e) => service_error_response(&e),
            }
        }

        // GET /api/certificates/{id}
        (Method::GET, id_str) if !id_str.contains('/') => {
            let id = match parse_id(id_str) {
                Ok(o) => o,
                Err(resp) => return resp,
            };
            match records.get_certificate(id).await {
                Ok(record) => json_response(StatusCode::OK, &record),
                Err(e) => service_error_response(&e),
            }
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

fn parse_id(id_str: &str) -> Result<ObjectId, Response<FullBody>> {
    let id_str = id_str.trim_end_matches('/');
    ObjectId::parse_str(id_str).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid certificate ID",
            Some("INVALID_ID"),
        )
    })
}
