//! Admin routes for the certificate type catalog

use bson::oid::ObjectId;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::db::schemas::CertificateTypeDoc;
use crate::routes::{
    error_response, json_response, read_json, require_admin, require_mongo,
    service_error_response, FullBody,
};
use crate::server::AppState;
use crate::services::{CatalogService, TypePatch};

#[derive(Serialize)]
struct DeleteResponse {
    message: String,
}

/// Handler for /api/certificate-types and /api/certificate-types/{id}
pub async fn handle_certificate_types_request(
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

    let catalog = match CatalogService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    let subpath = path
        .strip_prefix("/api/certificate-types")
        .unwrap_or("")
        .trim_start_matches('/');
    let method = req.method().clone();

    match (method, subpath) {
        (Method::GET, "") => match catalog.list_types().await {
            Ok(types) => json_response(StatusCode::OK, &types),
            Err(e) => service_error_response(&e),
        },

        (Method::POST, "") => {
            let body: CertificateTypeDoc = match read_json(req).await {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            match catalog.create_type(body).await {
                Ok(created) => json_response(StatusCode::CREATED, &created),
                Err(e) => service_error_response(&e),
            }
        }

        (method, id_str) if !id_str.is_empty() && !id_str.contains('/') => {
            let id = match ObjectId::parse_str(id_str) {
                Ok(o) => o,
                Err(_) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        "Invalid certificate type ID",
                        Some("INVALID_ID"),
                    )
                }
            };

            match method {
                Method::GET => match catalog.get_type(id).await {
                    Ok(t) => json_response(StatusCode::OK, &t),
                    Err(e) => service_error_response(&e),
                },
                Method::PUT => {
                    let patch: TypePatch = match read_json(req).await {
                        Ok(p) => p,
                        Err(resp) => return resp,
                    };
                    match catalog.update_type(id, patch).await {
                        Ok(updated) => json_response(StatusCode::OK, &updated),
                        Err(e) => service_error_response(&e),
                    }
                }
                Method::DELETE => match catalog.delete_type(id).await {
                    Ok(()) => json_response(
                        StatusCode::OK,
                        &DeleteResponse {
                            message: "Certificate type deleted".to_string(),
                        },
                    ),
                    Err(e) => service_error_response(&e),
                },
                _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None),
            }
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}
