//! Admin routes for the citizen registry

use bson::{doc, oid::ObjectId};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::db::schemas::{CitizenDoc, CITIZEN_COLLECTION};
use crate::routes::{
    error_response, json_response, query_param, read_json, require_admin, require_mongo,
    service_error_response, FullBody,
};
use crate::server::AppState;
use crate::types::OfficeError;

/// Handler for /api/citizens and /api/citizens/{id}
pub async fn handle_citizens_request(
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

    let citizens = match mongo.collection::<CitizenDoc>(CITIZEN_COLLECTION).await {
        Ok(c) => c,
        Err(e) => return service_error_response(&e),
    };

    let subpath = path
        .strip_prefix("/api/citizens")
        .unwrap_or("")
        .trim_start_matches('/');
    let method = req.method().clone();

    match (method, subpath) {
        // GET /api/citizens?village=&ward=
        (Method::GET, "") => {
            let query = req.uri().query();
            let mut filter = doc! {};
            if let Some(village) = query_param(query, "village") {
                filter.insert("village", village);
            }
            if let Some(ward) = query_param(query, "ward").and_then(|w| w.parse::<i32>().ok()) {
                filter.insert("ward_no", ward);
            }
            match citizens.find_many(filter).await {
                Ok(list) => json_response(StatusCode::OK, &list),
                Err(e) => service_error_response(&e),
            }
        }

        // POST /api/citizens - register a resident
        (Method::POST, "") => {
            let citizen: CitizenDoc = match read_json(req).await {
                Ok(c) => c,
                Err(resp) => return resp,
            };
            if citizen.name.trim().is_empty() {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "name is required",
                    Some("VALIDATION_ERROR"),
                );
            }

            let mut citizen = citizen;
            citizen._id = None;
            match citizens.insert_one(citizen.clone()).await {
                Ok(id) => {
                    citizen._id = Some(id);
                    json_response(StatusCode::CREATED, &citizen)
                }
                Err(OfficeError::Conflict(_)) => service_error_response(&OfficeError::Conflict(
                    "a citizen with that national ID already exists".to_string(),
                )),
                Err(e) => service_error_response(&e),
            }
        }

        // GET /api/citizens/{id}
        (Method::GET, id_str) if !id_str.contains('/') => {
            let id = match ObjectId::parse_str(id_str) {
                Ok(o) => o,
                Err(_) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        "Invalid citizen ID",
                        Some("INVALID_ID"),
                    )
                }
            };
            match citizens.find_one(doc! { "_id": id }).await {
                Ok(Some(citizen)) => json_response(StatusCode::OK, &citizen),
                Ok(None) => error_response(
                    StatusCode::NOT_FOUND,
                    "Citizen not found",
                    Some("NOT_FOUND"),
                ),
                Err(e) => service_error_response(&e),
            }
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}
