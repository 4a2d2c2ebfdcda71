//! Public endpoints: certificate application intake and verification
//!
//! These run without authentication. The intake path is the security
//! boundary where caller-supplied status and payment fields are discarded;
//! the verify path exposes only the public citizen subset.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use crate::routes::{
    error_response, json_response, query_param, read_json, require_mongo, service_error_response,
    ErrorResponse, FullBody,
};
use crate::server::AppState;
use crate::services::{ApplicationPayload, IntakeService, VerificationService};
use crate::types::OfficeError;

/// POST /api/public/apply/certificate
pub async fn handle_apply_certificate(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let payload: ApplicationPayload = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let intake = match IntakeService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    match intake.submit_application(payload).await {
        Ok(record) => json_response(StatusCode::CREATED, &record),
        Err(OfficeError::Validation(msg)) => {
            // Intake failures carry details so the public form can explain itself
            json_response(
                StatusCode::BAD_REQUEST,
                &ErrorResponse {
                    error: "Application rejected".to_string(),
                    code: Some("VALIDATION_ERROR".to_string()),
                    details: Some(msg),
                },
            )
        }
        Err(e) => {
            let mut resp = service_error_response(&e);
            // Spec'd public shape for intake failures: {error, details}
            *resp.body_mut() = Full::new(Bytes::from(
                serde_json::to_string(&ErrorResponse {
                    error: "Application failed".to_string(),
                    code: Some(e.code().to_string()),
                    details: Some(e.public_message()),
                })
                .unwrap_or_else(|_| "{}".to_string()),
            ));
            resp
        }
    }
}

/// GET /api/verify?certNo=
pub async fn handle_verify(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let cert_no = match query_param(req.uri().query(), "certNo") {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "certNo query parameter is required",
                Some("MISSING_CERT_NO"),
            )
        }
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let verification = match VerificationService::new(&mongo).await {
        Ok(s) => s,
        Err(e) => return service_error_response(&e),
    };

    match verification.verify_by_certificate_number(&cert_no).await {
        Ok(verified) => json_response(StatusCode::OK, &verified),
        Err(e) => service_error_response(&e),
    }
}
