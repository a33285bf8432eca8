//! HTTP API around the analysis service
//!
//! Routes:
//! - `POST /api/analyze`: JSON [`AnalyzeRequest`] in, [`AnalyzeResponse`](crate::AnalyzeResponse) out
//! - `GET /api/health`: liveness check
//! - anything else: files from the static directory
//!
//! Failures are answered as `{"error": "..."}`. Every route allows any origin.

use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::error::ServiceError;
use crate::request::AnalyzeRequest;
use crate::service::AnalysisService;

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: SocketAddr,

    /// Directory served for non-API paths
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            static_dir: PathBuf::from("./static"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Full route tree: API, static files, CORS and error recovery
pub fn routes(
    service: Arc<AnalysisService>,
    static_dir: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    api(service)
        .or(warp::fs::dir(static_dir))
        .with(cors)
        .recover(handle_rejection)
}

/// `/api/*` routes only
pub fn api(
    service: Arc<AnalysisService>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&HealthBody { status: "ok" }).into_response());

    let analyze = warp::path!("api" / "analyze")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_service(service))
        .and_then(handle_analyze);

    health.or(analyze).unify()
}

/// Serve until the process receives Ctrl-C
pub async fn serve(service: Arc<AnalysisService>, config: ServerConfig) {
    let routes = routes(service, config.static_dir.clone());
    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown(config.bind_addr, async {
            tokio::signal::ctrl_c().await.ok();
        });

    info!("Listening on http://{} (static files from {:?})", addr, config.static_dir);
    server.await;
    info!("Server stopped");
}

fn with_service(
    service: Arc<AnalysisService>,
) -> impl Filter<Extract = (Arc<AnalysisService>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&service))
}

async fn handle_analyze(
    body: Bytes,
    service: Arc<AnalysisService>,
) -> Result<Response, Infallible> {
    let request: AnalyzeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return Ok(error_reply(
                StatusCode::BAD_REQUEST,
                format!("invalid JSON body: {}", e),
            ))
        }
    };

    match service.analyze(&request).await {
        Ok(response) => Ok(warp::reply::json(&response).into_response()),
        Err(e) => {
            let status = status_for(&e);
            warn!(status = status.as_u16(), "Analyze request failed: {}", e);
            Ok(error_reply(status, e.to_string()))
        }
    }
}

/// Caller mistakes are 400, everything else 500
fn status_for(error: &ServiceError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_reply(status: StatusCode, message: String) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
        .into_response()
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "only POST is supported")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "content-length required")
    } else if rejection.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "cross-origin request not allowed")
    } else {
        warn!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };

    Ok(error_reply(status, message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_optimizer::OptimizerError;

    #[test]
    fn test_status_mapping() {
        let bad = ServiceError::BadRequest("too few tickers".to_string());
        assert_eq!(status_for(&bad), StatusCode::BAD_REQUEST);

        let invalid: ServiceError = OptimizerError::InvalidInput("nan".to_string()).into();
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);

        let timeout = ServiceError::Timeout("SPY".to_string());
        assert_eq!(status_for(&timeout), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.static_dir, PathBuf::from("./static"));
    }
}
