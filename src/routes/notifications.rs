//! Notification routes
//!
//! Public announcements feed; creation is admin-only.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use bson::doc;

use crate::db::schemas::{NotificationDoc, NOTIFICATION_COLLECTION};
use crate::routes::{
    error_response, json_response, read_json, require_admin, require_mongo,
    service_error_response, FullBody,
};
use crate::server::AppState;

/// Handler for /api/notifications
pub async fn handle_notifications_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let notifications = match mongo
        .collection::<NotificationDoc>(NOTIFICATION_COLLECTION)
        .await
    {
        Ok(c) => c,
        Err(e) => return service_error_response(&e),
    };

    match req.method().clone() {
        Method::GET => match notifications.find_many(doc! { "audience": "public" }).await {
            Ok(list) => json_response(StatusCode::OK, &list),
            Err(e) => service_error_response(&e),
        },

        Method::POST => {
            if let Err(resp) = require_admin(&req, &state) {
                return resp;
            }
            let mut notification: NotificationDoc = match read_json(req).await {
                Ok(n) => n,
                Err(resp) => return resp,
            };
            if notification.title.trim().is_empty() {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "title is required",
                    Some("VALIDATION_ERROR"),
                );
            }
            notification._id = None;
            match notifications.insert_one(notification.clone()).await {
                Ok(id) => {
                    notification._id = Some(id);
                    json_response(StatusCode::CREATED, &notification)
                }
                Err(e) => service_error_response(&e),
            }
        }

        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None),
    }
}
