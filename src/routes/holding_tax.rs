//! Admin routes for the holding tax ledger

use bson::oid::ObjectId;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::routes::{
    error_response, json_response, query_param, read_json, require_admin, require_mongo,
    service_error_response, FullBody,
};
use crate::server::AppState;
use crate::services::{TaxPaymentRequest, TaxService};

/// Handler for /api/holding-tax and subpaths
pub async fn handle_holding_tax_request(
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

    let tax = match TaxService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    let subpath = path
        .strip_prefix("/api/holding-tax")
        .unwrap_or("")
        .trim_start_matches('/');
    let method = req.method().clone();

    match (method, subpath) {
        // POST /api/holding-tax - record a payment
        (Method::POST, "") => {
            let payment: TaxPaymentRequest = match read_json(req).await {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            match tax.record_payment(payment).await {
                Ok(recorded) => json_response(StatusCode::CREATED, &recorded),
                Err(e) => service_error_response(&e),
            }
        }

        // GET /api/holding-tax?citizenId= - list payments
        (Method::GET, "") => {
            let citizen_id = match query_param(req.uri().query(), "citizenId") {
                Some(raw) => match ObjectId::parse_str(&raw) {
                    Ok(id) => Some(id),
                    Err(_) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            "Invalid citizen ID",
                            Some("INVALID_ID"),
                        )
                    }
                },
                None => None,
            };
            match tax.list_payments(citizen_id).await {
                Ok(payments) => json_response(StatusCode::OK, &payments),
                Err(e) => service_error_response(&e),
            }
        }

        // GET /api/holding-tax/receipt/{receiptNo}
        (Method::GET, p) if p.starts_with("receipt/") => {
            let receipt_no = p.strip_prefix("receipt/").unwrap_or("");
            if receipt_no.is_empty() {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Receipt number required",
                    Some("MISSING_RECEIPT"),
                );
            }
            match tax.get_by_receipt(receipt_no).await {
                Ok(payment) => json_response(StatusCode::OK, &payment),
                Err(e) => service_error_response(&e),
            }
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}
