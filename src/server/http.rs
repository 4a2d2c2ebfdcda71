//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling; one spawned task per
//! connection, no shared per-request state beyond `AppState`.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::routes::{error_response, FullBody};
use crate::types::OfficeError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// None only in dev mode when MongoDB is unreachable
    pub mongo: Option<MongoClient>,
}

impl AppState {
    pub fn new(args: Args, mongo: Option<MongoClient>) -> Self {
        Self { args, mongo }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), OfficeError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Union office service listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - admin API key not enforced");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move {
                            Ok::<_, hyper::Error>(handle_request(state, addr, req).await)
                        }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Response<FullBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Readiness probe - pings MongoDB
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(Arc::clone(&state)).await
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Public surface
        (Method::POST, "/api/public/apply/certificate") => {
            routes::handle_apply_certificate(req, state).await
        }
        (Method::GET, "/api/verify") => routes::handle_verify(req, state).await,
        (Method::GET, "/api/analytics") => routes::handle_analytics(req, state).await,

        // Settings: GET public, PUT admin (checked inside)
        (_, "/api/settings") => routes::handle_settings_request(req, state).await,

        // Notifications: GET public, POST admin (checked inside)
        (_, "/api/notifications") => routes::handle_notifications_request(req, state).await,

        // Admin surface (API key checked inside each handler)
        (_, p) if p.starts_with("/api/certificate-types") => {
            routes::handle_certificate_types_request(req, state, &path).await
        }
        (_, p) if p.starts_with("/api/certificates") => {
            routes::handle_certificates_request(req, state, &path).await
        }
        (_, p) if p.starts_with("/api/holding-tax") => {
            routes::handle_holding_tax_request(req, state, &path).await
        }
        (Method::GET, "/api/transactions") => routes::handle_transactions(req, state).await,
        (_, p) if p.starts_with("/api/citizens") => {
            routes::handle_citizens_request(req, state, &path).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", Some("NOT_FOUND")),
    }
}
